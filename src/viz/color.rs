//! Color encodings for chart marks.

use plotters::style::RGBColor;

/// Default bar color when the caller supplies no per-record function.
pub const STEELBLUE: RGBColor = RGBColor(70, 130, 180);

/// Neutral gray used for stale content while a fetch is in flight, and as
/// the fallback for unknown categorical codes.
pub const NEUTRAL: RGBColor = RGBColor(170, 170, 170);

/// Categorical palette keyed by integer region code.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
pub const REGION10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Viridis control stops (perceptually uniform, colorblind-safe).
const VIRIDIS: [RGBColor; 10] = [
    RGBColor(0x44, 0x01, 0x54),
    RGBColor(0x48, 0x28, 0x78),
    RGBColor(0x3E, 0x4A, 0x89),
    RGBColor(0x31, 0x68, 0x8E),
    RGBColor(0x26, 0x82, 0x8E),
    RGBColor(0x1F, 0x9E, 0x89),
    RGBColor(0x35, 0xB7, 0x79),
    RGBColor(0x6D, 0xCD, 0x59),
    RGBColor(0xB4, 0xDE, 0x2C),
    RGBColor(0xFD, 0xE7, 0x25),
];

/// Sample the viridis ramp at `t` in 0..=1 (clamped), interpolating
/// linearly between control stops.
pub fn viridis(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let pos = t * (VIRIDIS.len() - 1) as f64;
    let i = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    let f = pos - i as f64;
    let a = VIRIDIS[i];
    let b = VIRIDIS[i + 1];
    RGBColor(
        lerp_u8(a.0, b.0, f),
        lerp_u8(a.1, b.1, f),
        lerp_u8(a.2, b.2, f),
    )
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
}

/// Point color encoding, resolved once per chart configuration.
#[derive(Debug, Clone)]
pub enum ColorMode {
    /// Continuous sequential mapping over a fixed ordinal code range,
    /// e.g. regime type 0–3 on the viridis ramp.
    Sequential { min: f64, max: f64 },
    /// Discrete palette keyed by an integer code, with a neutral default
    /// for out-of-range codes.
    Categorical {
        palette: &'static [RGBColor],
        default: RGBColor,
    },
}

impl ColorMode {
    /// Sequential viridis over regime codes 0–3.
    pub fn regime() -> Self {
        ColorMode::Sequential { min: 0.0, max: 3.0 }
    }

    /// Categorical region palette; code 1 gets the first palette entry.
    pub fn region() -> Self {
        ColorMode::Categorical {
            palette: &REGION10,
            default: NEUTRAL,
        }
    }

    pub fn color_for(&self, code: f64) -> RGBColor {
        match self {
            ColorMode::Sequential { min, max } => {
                let span = max - min;
                if span.abs() < f64::EPSILON || !code.is_finite() {
                    return NEUTRAL;
                }
                viridis((code - min) / span)
            }
            ColorMode::Categorical { palette, default } => {
                if !code.is_finite() || code < 1.0 {
                    return *default;
                }
                let idx = code.round() as usize - 1;
                palette.get(idx).copied().unwrap_or(*default)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viridis_endpoints() {
        assert_eq!(viridis(0.0), RGBColor(0x44, 0x01, 0x54));
        assert_eq!(viridis(1.0), RGBColor(0xFD, 0xE7, 0x25));
        assert_eq!(viridis(-1.0), viridis(0.0));
    }

    #[test]
    fn categorical_defaults_out_of_range() {
        let mode = ColorMode::region();
        assert_eq!(mode.color_for(1.0), REGION10[0]);
        assert_eq!(mode.color_for(10.0), REGION10[9]);
        assert_eq!(mode.color_for(0.0), NEUTRAL);
        assert_eq!(mode.color_for(99.0), NEUTRAL);
        assert_eq!(mode.color_for(f64::NAN), NEUTRAL);
    }
}
