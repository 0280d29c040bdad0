//! Axis drawing shared by the chart renderers.

use crate::scale::{LinearScale, LogScale};
use crate::viz::PlotRect;
use anyhow::Result;
use num_format::{Locale, ToFormattedString};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

const TICK_LEN: i32 = 6;
const TICK_FONT_PX: u32 = 12;
const LABEL_FONT_PX: u32 = 14;
const TITLE_FONT_PX: u32 = 16;

/// A y axis that is either linear or logarithmic, retaining the inverse
/// mapping either way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisScale {
    Linear(LinearScale),
    Log(LogScale),
}

impl AxisScale {
    pub fn map(&self, v: f64) -> f64 {
        match self {
            AxisScale::Linear(s) => s.map(v),
            AxisScale::Log(s) => s.map(v),
        }
    }

    pub fn invert(&self, px: f64) -> f64 {
        match self {
            AxisScale::Linear(s) => s.invert(px),
            AxisScale::Log(s) => s.invert(px),
        }
    }

    /// Tick positions and labels: powers of ten for log, nice steps for
    /// linear.
    pub fn tick_labels(&self, count: usize) -> Vec<(f64, String)> {
        match self {
            AxisScale::Linear(s) => s
                .ticks(count)
                .into_iter()
                .map(|v| (s.map(v), format_value(v)))
                .collect(),
            AxisScale::Log(s) => s
                .ticks()
                .into_iter()
                .map(|v| (s.map(v), format_count(v)))
                .collect(),
        }
    }
}

/// Whole counts with thousands separators, fractional values trimmed.
pub fn format_count(v: f64) -> String {
    if v.abs() >= 1.0 && v.fract().abs() < 1e-9 {
        (v.round() as i64).to_formatted_string(&Locale::en)
    } else {
        format_value(v)
    }
}

/// Precision scaled to magnitude, matching the tick label style of the
/// summary views.
pub fn format_value(v: f64) -> String {
    let a = v.abs();
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format!("{:.*}", prec, v)
}

fn tick_style(h: HPos, v: VPos) -> TextStyle<'static> {
    TextStyle::from((FontFamily::SansSerif, TICK_FONT_PX)).pos(Pos::new(h, v))
}

fn err<E: std::fmt::Debug>(e: E) -> anyhow::Error {
    anyhow::anyhow!("{:?}", e)
}

/// Bottom axis: baseline, tick marks, and centered labels at the given
/// (pixel, label) positions.
pub fn draw_bottom_axis<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &PlotRect,
    ticks: &[(f64, String)],
) -> Result<()> {
    let y = plot.bottom() as i32;
    area.draw(&PathElement::new(
        vec![(plot.left as i32, y), (plot.right() as i32, y)],
        BLACK,
    ))
    .map_err(err)?;
    let style = tick_style(HPos::Center, VPos::Top);
    for (px, label) in ticks {
        let x = *px as i32;
        area.draw(&PathElement::new(vec![(x, y), (x, y + TICK_LEN)], BLACK))
            .map_err(err)?;
        area.draw(&Text::new(label.clone(), (x, y + TICK_LEN + 2), style.clone()))
            .map_err(err)?;
    }
    Ok(())
}

/// Left axis: baseline, tick marks, right-aligned labels.
pub fn draw_left_axis<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &PlotRect,
    ticks: &[(f64, String)],
) -> Result<()> {
    let x = plot.left as i32;
    area.draw(&PathElement::new(
        vec![(x, plot.top as i32), (x, plot.bottom() as i32)],
        BLACK,
    ))
    .map_err(err)?;
    let style = tick_style(HPos::Right, VPos::Center);
    for (py, label) in ticks {
        let y = *py as i32;
        area.draw(&PathElement::new(vec![(x - TICK_LEN, y), (x, y)], BLACK))
            .map_err(err)?;
        area.draw(&Text::new(label.clone(), (x - TICK_LEN - 2, y), style.clone()))
            .map_err(err)?;
    }
    Ok(())
}

/// Right axis: baseline, tick marks, left-aligned labels.
pub fn draw_right_axis<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &PlotRect,
    ticks: &[(f64, String)],
) -> Result<()> {
    let x = plot.right() as i32;
    area.draw(&PathElement::new(
        vec![(x, plot.top as i32), (x, plot.bottom() as i32)],
        BLACK,
    ))
    .map_err(err)?;
    let style = tick_style(HPos::Left, VPos::Center);
    for (py, label) in ticks {
        let y = *py as i32;
        area.draw(&PathElement::new(vec![(x, y), (x + TICK_LEN, y)], BLACK))
            .map_err(err)?;
        area.draw(&Text::new(label.clone(), (x + TICK_LEN + 2, y), style.clone()))
            .map_err(err)?;
    }
    Ok(())
}

/// Chart title, centered above the plot area.
pub fn draw_title<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &PlotRect,
    title: &str,
) -> Result<()> {
    if title.is_empty() {
        return Ok(());
    }
    let style =
        TextStyle::from((FontFamily::SansSerif, TITLE_FONT_PX)).pos(Pos::new(HPos::Center, VPos::Bottom));
    area.draw(&Text::new(
        title.to_string(),
        ((plot.left + plot.width / 2.0) as i32, (plot.top - 16.0) as i32),
        style,
    ))
    .map_err(err)?;
    Ok(())
}

/// X-axis caption below the tick labels.
pub fn draw_x_label<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &PlotRect,
    bottom_margin: f64,
    label: &str,
) -> Result<()> {
    if label.is_empty() {
        return Ok(());
    }
    let style =
        TextStyle::from((FontFamily::SansSerif, LABEL_FONT_PX)).pos(Pos::new(HPos::Center, VPos::Bottom));
    area.draw(&Text::new(
        label.to_string(),
        (
            (plot.left + plot.width / 2.0) as i32,
            (plot.bottom() + bottom_margin - 6.0) as i32,
        ),
        style,
    ))
    .map_err(err)?;
    Ok(())
}

/// Vertical axis caption, rotated 270° along the given x position.
pub fn draw_y_label<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    plot: &PlotRect,
    x_px: f64,
    label: &str,
) -> Result<()> {
    if label.is_empty() {
        return Ok(());
    }
    let style = TextStyle::from(
        (FontFamily::SansSerif, LABEL_FONT_PX)
            .into_font()
            .transform(FontTransform::Rotate270),
    )
    .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        label.to_string(),
        (x_px as i32, (plot.top + plot.height / 2.0) as i32),
        style,
    ))
    .map_err(err)?;
    Ok(())
}
