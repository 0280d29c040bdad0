use crate::models::{parse_numeric, IndicatorRecord, RecordCount};
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Load indicator rows from CSV with a header row.
///
/// The first two columns are expected to be `country` and `year`; every other
/// column is treated as a numeric indicator dimension and parsed with
/// [`parse_numeric`] (empty/`NA`/non-numeric become missing). A row whose
/// year field does not parse is dropped entirely.
pub fn load_indicators_csv<P: AsRef<Path>>(path: P) -> Result<Vec<IndicatorRecord>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_indicators(file)
}

/// Same as [`load_indicators_csv`] but from any reader (used by tests).
pub fn read_indicators<R: Read>(rdr: R) -> Result<Vec<IndicatorRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(rdr);
    let headers = reader.headers().context("read csv header")?.clone();

    let country_idx = find_column(&headers, "country")?;
    let year_idx = find_column(&headers, "year")?;

    let mut out = Vec::new();
    for rec in reader.records() {
        let rec = rec.context("read csv row")?;
        let year = match rec.get(year_idx).and_then(|s| s.trim().parse::<i32>().ok()) {
            Some(y) => y,
            // Bad year: drop the whole row, matching the ingest contract.
            None => continue,
        };
        let country = rec.get(country_idx).unwrap_or_default().trim().to_string();
        let mut values = BTreeMap::new();
        for (idx, field) in rec.iter().enumerate() {
            if idx == country_idx || idx == year_idx {
                continue;
            }
            let name = headers.get(idx).unwrap_or_default().trim();
            if name.is_empty() {
                continue;
            }
            values.insert(name.to_string(), parse_numeric(field));
        }
        out.push(IndicatorRecord { country, year, values });
    }
    Ok(out)
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("csv is missing a '{}' column", name))
}

/// Save per-year record counts as CSV with header.
pub fn save_counts_csv<P: AsRef<Path>>(counts: &[RecordCount], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("year", "records"))?;
    for c in counts {
        wtr.serialize((c.year, c.records))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Load per-year record counts saved by [`save_counts_csv`].
pub fn load_counts_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RecordCount>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let mut out = Vec::new();
    for rec in reader.records() {
        let rec = rec.context("read csv row")?;
        let year = match rec.get(0).and_then(|s| s.trim().parse::<i32>().ok()) {
            Some(y) => y,
            None => continue,
        };
        let records = rec
            .get(1)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(0);
        out.push(RecordCount { year, records });
    }
    Ok(out)
}

/// Save any serializable rows as pretty JSON array.
pub fn save_json<T: serde::Serialize, P: AsRef<Path>>(rows: &T, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordCount;
    use tempfile::tempdir;

    #[test]
    fn write_and_read_counts() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("counts.csv");
        let jsonp = dir.path().join("counts.json");
        let counts = vec![
            RecordCount { year: 2000, records: 100 },
            RecordCount { year: 2001, records: 0 },
        ];
        save_counts_csv(&counts, &p).unwrap();
        save_json(&counts, &jsonp).unwrap();
        let back = load_counts_csv(&p).unwrap();
        assert_eq!(back, counts);
        assert!(jsonp.metadata().unwrap().len() > 0);
    }

    #[test]
    fn indicator_rows_with_bad_year_are_dropped() {
        let csv = "country,year,v2x_regime,e_migdppc\n\
                   SWE,2000,3,25000\n\
                   SWE,notayear,3,25000\n\
                   AFG,2000,NA,\n";
        let rows = read_indicators(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].country, "SWE");
        assert_eq!(rows[0].value("v2x_regime"), Some(3.0));
        // NA and empty both parse to missing, not zero
        assert_eq!(rows[1].country, "AFG");
        assert_eq!(rows[1].value("v2x_regime"), None);
        assert_eq!(rows[1].value("e_migdppc"), None);
    }
}
