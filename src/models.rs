use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of indicator data: a country observed in one year, carrying zero
/// or more named numeric indicator values.
///
/// A value of `None` means *missing* (the CSV cell was empty, `NA`, or not a
/// number) and is distinct from `Some(0.0)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorRecord {
    pub country: String,
    pub year: i32,
    pub values: BTreeMap<String, Option<f64>>,
}

impl IndicatorRecord {
    /// Look up one indicator dimension. Absent columns count as missing.
    pub fn value(&self, dim: &str) -> Option<f64> {
        self.values.get(dim).copied().flatten()
    }
}

/// One year's biodiversity record count for a country, as returned by the
/// GBIF year-facet query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RecordCount {
    pub year: i32,
    pub records: u64,
}

/// Inclusive year interval with `start <= end`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Build a range, swapping the endpoints if they arrive reversed.
    pub fn new(a: i32, b: i32) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }

    /// Clamp this range into `bounds`, keeping `start <= end`.
    pub fn clamp_to(&self, bounds: YearRange) -> Self {
        let start = self.start.clamp(bounds.start, bounds.end);
        let end = self.end.clamp(bounds.start, bounds.end);
        YearRange::new(start, end)
    }
}

/// Parse a tabular numeric field.
///
/// Mirrors the loose coercion of the dashboard's CSV ingest: empty cells,
/// `NA`, and anything non-numeric become missing rather than zero. Exponent
/// shorthand like `9616e3` parses as a plain `f64`.
pub fn parse_numeric(field: &str) -> Option<f64> {
    let s = field.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("na") {
        return None;
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_coercion() {
        assert_eq!(parse_numeric("1.5"), Some(1.5));
        assert_eq!(parse_numeric(" 9616e3 "), Some(9_616_000.0));
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("NA"), None);
        assert_eq!(parse_numeric("n/a-ish"), None);
        assert_eq!(parse_numeric("0"), Some(0.0));
    }

    #[test]
    fn year_range_orders_and_clamps() {
        let r = YearRange::new(2010, 1990);
        assert_eq!(r, YearRange { start: 1990, end: 2010 });
        let clamped = r.clamp_to(YearRange::new(1995, 2005));
        assert_eq!(clamped, YearRange { start: 1995, end: 2005 });
        assert!(r.contains(1990) && r.contains(2010) && !r.contains(2011));
    }
}
