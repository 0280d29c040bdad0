//! Grouping and aggregation over indicator records.
//!
//! The bubble chart consumes one [`AggregatedGroup`] per country: each
//! requested dimension is reduced with a statistic over the country's
//! filtered rows, and groups with unusable inputs are excluded rather than
//! rendered misleadingly.

use crate::models::{IndicatorRecord, YearRange};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Reduction applied to one dimension's values within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statistic {
    Median,
    Sum,
    Mean,
}

/// How a missing value in one contributing row affects the group.
///
/// `Poison` (the default) invalidates the whole group: better to drop a
/// country than to chart an aggregate computed from partial inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingPolicy {
    Poison,
    Ignore,
}

/// One requested output dimension.
#[derive(Debug, Clone)]
pub struct DimSpec {
    pub dim: String,
    pub statistic: Statistic,
    pub missing: MissingPolicy,
}

impl DimSpec {
    pub fn new(dim: impl Into<String>, statistic: Statistic) -> Self {
        Self {
            dim: dim.into(),
            statistic,
            missing: MissingPolicy::Poison,
        }
    }

    pub fn ignoring_missing(mut self) -> Self {
        self.missing = MissingPolicy::Ignore;
        self
    }
}

/// Parameters of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct AggregateSpec {
    pub dims: Vec<DimSpec>,
    /// Inclusive year window; `None` keeps all years.
    pub years: Option<YearRange>,
    /// Dimension holding the integer region code, e.g. `e_regiongeo`.
    pub region_dim: Option<String>,
    /// Region code to keep; 0 means no region filter.
    pub region: u32,
    /// Dimension that must come out strictly positive (log-scale magnitude).
    pub positive_magnitude_dim: Option<String>,
}

/// One country's computed statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregatedGroup {
    pub country: String,
    pub stats: BTreeMap<String, f64>,
}

impl AggregatedGroup {
    pub fn stat(&self, dim: &str) -> Option<f64> {
        self.stats.get(dim).copied()
    }
}

/// Group filtered records by country and reduce each requested dimension.
///
/// Output order is unspecified (a map, not a list); sort by key when a
/// deterministic order is needed. A group is excluded when a `Poison`
/// dimension saw a missing input, when a statistic comes out non-finite, or
/// when the designated magnitude dimension is not strictly positive.
pub fn aggregate(
    records: &[IndicatorRecord],
    spec: &AggregateSpec,
) -> HashMap<String, AggregatedGroup> {
    let mut partitions: BTreeMap<&str, Vec<&IndicatorRecord>> = BTreeMap::new();
    for r in records {
        if let Some(years) = spec.years {
            if !years.contains(r.year) {
                continue;
            }
        }
        if spec.region != 0 {
            if let Some(region_dim) = spec.region_dim.as_deref() {
                let code = r.value(region_dim).map(|v| v.round());
                if code != Some(spec.region as f64) {
                    continue;
                }
            }
        }
        partitions.entry(r.country.as_str()).or_default().push(r);
    }

    let mut out = HashMap::new();
    'group: for (country, rows) in partitions {
        let mut stats = BTreeMap::new();
        for d in &spec.dims {
            let mut vals = Vec::with_capacity(rows.len());
            for row in &rows {
                match row.value(&d.dim) {
                    Some(v) => vals.push(v),
                    None => match d.missing {
                        MissingPolicy::Poison => continue 'group,
                        MissingPolicy::Ignore => {}
                    },
                }
            }
            let reduced = match d.statistic {
                Statistic::Median => median(&mut vals),
                Statistic::Sum => Some(vals.iter().sum()),
                Statistic::Mean => mean(&vals),
            };
            match reduced {
                Some(v) if v.is_finite() => {
                    stats.insert(d.dim.clone(), v);
                }
                _ => continue 'group,
            }
        }
        if let Some(mag) = spec.positive_magnitude_dim.as_deref() {
            match stats.get(mag) {
                Some(v) if *v > 0.0 => {}
                _ => continue 'group,
            }
        }
        out.insert(
            country.to_string(),
            AggregatedGroup {
                country: country.to_string(),
                stats,
            },
        );
    }
    out
}

/// Median with linear interpolation between the two middle order statistics.
fn median(vals: &mut [f64]) -> Option<f64> {
    if vals.is_empty() {
        return None;
    }
    vals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = vals.len();
    if n % 2 == 1 {
        Some(vals[n / 2])
    } else {
        Some((vals[n / 2 - 1] + vals[n / 2]) / 2.0)
    }
}

fn mean(vals: &[f64]) -> Option<f64> {
    if vals.is_empty() {
        None
    } else {
        Some(vals.iter().sum::<f64>() / vals.len() as f64)
    }
}

/// Summary statistics for one country over one dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub country: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Per-country summary of one indicator dimension, for the CLI `stats` view.
pub fn grouped_summary(
    records: &[IndicatorRecord],
    dim: &str,
    years: Option<YearRange>,
) -> Vec<Summary> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut missing: BTreeMap<String, usize> = BTreeMap::new();
    for r in records {
        if let Some(win) = years {
            if !win.contains(r.year) {
                continue;
            }
        }
        match r.value(dim) {
            Some(v) => groups.entry(r.country.clone()).or_default().push(v),
            None => *missing.entry(r.country.clone()).or_default() += 1,
        }
    }

    let mut out = Vec::new();
    for (country, mut vals) in groups {
        vals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let count = vals.len();
        let min = vals.first().cloned();
        let max = vals.last().cloned();
        let mean = mean(&vals);
        let med = median(&mut vals);
        let miss = missing.remove(&country).unwrap_or(0);
        out.push(Summary {
            country,
            count,
            missing: miss,
            min,
            max,
            mean,
            median: med,
        });
    }
    // Countries with only missing values still show up in the summary.
    for (country, miss) in missing {
        out.push(Summary {
            country,
            count: 0,
            missing: miss,
            min: None,
            max: None,
            mean: None,
            median: None,
        });
    }
    out.sort_by(|a, b| a.country.cmp(&b.country));
    out
}
