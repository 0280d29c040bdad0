//! One-dimensional scales mapping data domains to pixel ranges.
//!
//! Every numeric scale exposes the forward map and its inverse; the inverse
//! is what the interaction layer uses to turn pointer positions back into
//! domain values. Scales are plain values, built per render call.

use thiserror::Error;

/// Contract violations when constructing a scale.
#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("logarithmic scale requires a strictly positive domain, got [{0}, {1}]")]
    NonPositiveLogDomain(f64, f64),
    #[error("degenerate scale domain [{0}, {1}]")]
    DegenerateDomain(f64, f64),
}

/// Clamp a value to the logarithmic floor of 1 before scale lookup.
///
/// Zero- and negative-valued inputs draw at the chart's log floor instead of
/// failing the scale. This flattening of non-positive values is a documented
/// approximation the dashboards rely on, so keep the floor at exactly 1.
#[inline]
pub fn log_safe(v: f64) -> f64 {
    if v > 0.0 {
        v
    } else {
        1.0
    }
}

/// Affine domain→range mapping. Years are treated as linear integers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            d0: domain.0,
            d1: domain.1,
            r0: range.0,
            r1: range.1,
        }
    }

    #[inline]
    pub fn map(&self, v: f64) -> f64 {
        let span = self.d1 - self.d0;
        if span.abs() < f64::EPSILON {
            return (self.r0 + self.r1) / 2.0;
        }
        self.r0 + (v - self.d0) / span * (self.r1 - self.r0)
    }

    #[inline]
    pub fn invert(&self, px: f64) -> f64 {
        let span = self.r1 - self.r0;
        if span.abs() < f64::EPSILON {
            return self.d0;
        }
        self.d0 + (px - self.r0) / span * (self.d1 - self.d0)
    }

    /// Rounded tick values at a nice step, targeting roughly `count` ticks.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.d0.min(self.d1), self.d0.max(self.d1), count)
    }
}

/// Log10 domain→range mapping over a strictly positive domain.
///
/// Callers that cannot guarantee positivity clamp per value with
/// [`log_safe`]; passing a domain touching zero here is a programming error
/// and fails fast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    l0: f64,
    l1: f64,
    r0: f64,
    r1: f64,
}

impl LogScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self, ScaleError> {
        let (d0, d1) = domain;
        if d0 <= 0.0 || d1 <= 0.0 {
            return Err(ScaleError::NonPositiveLogDomain(d0, d1));
        }
        if d0 >= d1 {
            return Err(ScaleError::DegenerateDomain(d0, d1));
        }
        Ok(Self {
            l0: d0.log10(),
            l1: d1.log10(),
            r0: range.0,
            r1: range.1,
        })
    }

    #[inline]
    pub fn map(&self, v: f64) -> f64 {
        let lv = v.max(f64::MIN_POSITIVE).log10();
        self.r0 + (lv - self.l0) / (self.l1 - self.l0) * (self.r1 - self.r0)
    }

    #[inline]
    pub fn invert(&self, px: f64) -> f64 {
        let span = self.r1 - self.r0;
        if span.abs() < f64::EPSILON {
            return 10f64.powf(self.l0);
        }
        let lv = self.l0 + (px - self.r0) / span * (self.l1 - self.l0);
        10f64.powf(lv)
    }

    /// Powers of ten inside the domain (inclusive at both ends).
    pub fn ticks(&self) -> Vec<f64> {
        let lo = self.l0.ceil() as i32;
        let hi = self.l1.floor() as i32;
        (lo..=hi).map(|e| 10f64.powi(e)).collect()
    }
}

/// Ordinal band scale over consecutive integer years.
///
/// Each year owns a fixed-width band with padding fraction `p` on both sides;
/// the edge years get a full band plus padding, never a clipped one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    first: i32,
    n: usize,
    start: f64,
    step: f64,
    bandwidth: f64,
}

pub const BAND_PADDING: f64 = 0.1;

impl BandScale {
    /// Bands for every year in `first..=last`, padded by `padding` (0..1).
    pub fn new(first: i32, last: i32, range: (f64, f64), padding: f64) -> Self {
        let n = (last.max(first) - first + 1) as usize;
        let (r0, r1) = range;
        let width = r1 - r0;
        let step = width / (n as f64 - padding + padding * 2.0).max(1.0);
        let start = r0 + (width - step * (n as f64 - padding)) * 0.5;
        Self {
            first,
            n,
            start,
            step,
            bandwidth: step * (1.0 - padding),
        }
    }

    /// Left edge of the year's band; `None` outside the domain.
    pub fn position(&self, year: i32) -> Option<f64> {
        let idx = year.checked_sub(self.first)?;
        if idx < 0 || idx as usize >= self.n {
            return None;
        }
        Some(self.start + self.step * idx as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Inverse lookup: the year whose band covers (or is nearest to) `px`.
    pub fn year_at(&self, px: f64) -> i32 {
        let idx = ((px - self.start) / self.step).floor() as i64;
        let idx = idx.clamp(0, self.n as i64 - 1);
        self.first + idx as i32
    }
}

/// Integer year ticks targeting an approximate pixel gap between ticks.
///
/// Values are rounded to whole years and duplicates suppressed, so a dense
/// domain never produces two ticks at the same year.
pub fn year_ticks(min: i32, max: i32, width_px: f64, px_per_tick: f64) -> Vec<i32> {
    if max < min {
        return Vec::new();
    }
    let count = (width_px / px_per_tick.max(1.0)).max(1.0) as usize;
    let mut out: Vec<i32> = nice_ticks(min as f64, max as f64, count)
        .into_iter()
        .map(|t| t.round() as i32)
        .filter(|y| *y >= min && *y <= max)
        .collect();
    out.dedup();
    out
}

/// Tick values at a 1/2/5-decade step covering `[lo, hi]`.
fn nice_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    if !(hi > lo) || count == 0 {
        return vec![lo];
    }
    let step = tick_increment(lo, hi, count);
    let start = (lo / step).ceil();
    let stop = (hi / step).floor();
    let n = (stop - start) as i64 + 1;
    if n <= 0 {
        return Vec::new();
    }
    (0..n).map(|i| (start + i as f64) * step).collect()
}

fn tick_increment(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo) / count.max(1) as f64;
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let error = raw / base;
    // Thresholds from the usual sqrt(2)/sqrt(10)/sqrt(50) tick heuristic.
    if error >= 7.071 {
        base * 10.0
    } else if error >= 3.162 {
        base * 5.0
    } else if error >= 1.414 {
        base * 2.0
    } else {
        base
    }
}
