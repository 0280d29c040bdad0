//! Dual-axis time-series chart: per-year bars on a logarithmic y axis with
//! an overlaid line + markers on an independent linear secondary y axis.

use crate::scale::{log_safe, BandScale, LinearScale, LogScale, year_ticks, BAND_PADDING};
use crate::viz::axis::{self, AxisScale};
use crate::viz::color::NEUTRAL;
use crate::viz::{ensure_fonts_registered, Layout, Margins, Mount, PlotRect, Rendered};
use anyhow::{anyhow, bail, Result};
use plotters::prelude::*;
use plotters_svg::SVGBackend;

/// Accessor reading one numeric dimension off a record.
pub type Accessor<'a, R> = &'a dyn Fn(&R) -> f64;
/// Accessor for a dimension that may be missing on some records.
pub type OptAccessor<'a, R> = &'a dyn Fn(&R) -> Option<f64>;
/// Per-record color function.
pub type ColorFn<'a, R> = &'a dyn Fn(&R) -> RGBColor;

/// Configuration of one dual-chart render, constructed fresh per call.
pub struct DualChartConfig<'a, R> {
    pub data: &'a [R],
    /// Total pixel width; falls back to the mount's measured width.
    pub width: Option<u32>,
    pub height: u32,
    pub margins: Margins,
    /// Approximate pixels between x tick labels.
    pub x_tick_gap: f64,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub y2_min: Option<f64>,
    pub y2_max: Option<f64>,
    pub x: Accessor<'a, R>,
    /// Primary magnitude, drawn as bars on the log axis.
    pub y: Accessor<'a, R>,
    /// Secondary quantity, drawn as a line; `None` breaks the line.
    pub y2: OptAccessor<'a, R>,
    pub color: ColorFn<'a, R>,
    pub x_label: String,
    pub y_label: String,
    pub y2_label: String,
    pub title: String,
    /// Stale-content flag: renders every bar in one neutral color.
    pub fetching: bool,
}

impl<'a, R> DualChartConfig<'a, R> {
    pub fn new(
        data: &'a [R],
        x: Accessor<'a, R>,
        y: Accessor<'a, R>,
        y2: OptAccessor<'a, R>,
        color: ColorFn<'a, R>,
    ) -> Self {
        Self {
            data,
            width: None,
            height: 400,
            margins: Margins::default(),
            x_tick_gap: 80.0,
            x_min: None,
            x_max: None,
            y_min: None,
            y_max: None,
            y2_min: None,
            y2_max: None,
            x,
            y,
            y2,
            color,
            x_label: "Year".into(),
            y_label: "Value".into(),
            y2_label: "Value #2".into(),
            title: String::new(),
            fetching: false,
        }
    }
}

/// Scales retained from the last dual-chart render.
#[derive(Debug, Clone)]
pub struct DualLayout {
    pub x_band: BandScale,
    pub x_linear: LinearScale,
    pub y: LogScale,
    pub y2: LinearScale,
    pub plot: PlotRect,
}

/// Extent of `acc` over `data`, with optional explicit bounds.
pub(crate) fn extent<R>(
    data: &[R],
    acc: &dyn Fn(&R) -> f64,
    min_override: Option<f64>,
    max_override: Option<f64>,
) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for r in data {
        let v = acc(r);
        if v.is_finite() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        lo = 0.0;
        hi = 1.0;
    }
    (min_override.unwrap_or(lo), max_override.unwrap_or(hi))
}

fn extent_opt<R>(
    data: &[R],
    acc: &dyn Fn(&R) -> Option<f64>,
    min_override: Option<f64>,
    max_override: Option<f64>,
) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for r in data {
        if let Some(v) = acc(r) {
            if v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    if !lo.is_finite() || !hi.is_finite() {
        lo = 0.0;
        hi = 1.0;
    }
    (min_override.unwrap_or(lo), max_override.unwrap_or(hi))
}

/// Render the dual chart at `mount`, replacing any previous output there.
pub fn render<R>(mount: &mut Mount, cfg: &DualChartConfig<'_, R>) -> Result<()> {
    if cfg.data.is_empty() {
        bail!("no data to plot");
    }
    ensure_fonts_registered();

    let total_width = cfg.width.unwrap_or_else(|| mount.measured_width());
    let height = cfg.height;
    let plot = PlotRect::from_margins(total_width as f64, height as f64, &cfg.margins);

    // Domains.
    let (x0f, x1f) = extent(cfg.data, cfg.x, cfg.x_min, cfg.x_max);
    let (x0, x1) = (x0f.round() as i32, x1f.round() as i32);
    let (y_lo, y_hi) = extent(cfg.data, cfg.y, cfg.y_min, cfg.y_max);
    let (y2_lo, y2_hi) = extent_opt(cfg.data, cfg.y2, cfg.y2_min, cfg.y2_max);

    // The log domain is clamped to the same floor the per-value accessor
    // uses, so the scale itself never sees a non-positive bound.
    let d0 = log_safe(y_lo);
    let mut d1 = log_safe(y_hi);
    if d1 <= d0 {
        d1 = d0 * 10.0;
    }

    let x_band = BandScale::new(x0, x1, (plot.left, plot.right()), BAND_PADDING);
    let x_linear = LinearScale::new((x0 as f64, x1 as f64), (plot.left, plot.right()));
    let y = LogScale::new((d0, d1), (plot.bottom(), plot.top))?;
    let y2 = LinearScale::new((y2_lo, y2_hi), (plot.bottom(), plot.top));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (total_width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

        // Bars on the log axis, log-safe per value.
        let bw = x_band.bandwidth();
        for r in cfg.data {
            let year = (cfg.x)(r).round() as i32;
            let bx = match x_band.position(year) {
                Some(px) => px,
                None => continue,
            };
            let top = y.map(log_safe((cfg.y)(r)));
            let color = if cfg.fetching { NEUTRAL } else { (cfg.color)(r) };
            root.draw(&Rectangle::new(
                [
                    (bx as i32, top as i32),
                    ((bx + bw) as i32, plot.bottom() as i32),
                ],
                color.filled(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }

        // Secondary line + markers at band centers; missing values break the
        // line into segments.
        let mut segments: Vec<Vec<(i32, i32)>> = Vec::new();
        let mut current: Vec<(i32, i32)> = Vec::new();
        for r in cfg.data {
            let year = (cfg.x)(r).round() as i32;
            let cx = match x_band.position(year) {
                Some(px) => px + bw / 2.0,
                None => continue,
            };
            match (cfg.y2)(r) {
                Some(v) if v.is_finite() => current.push((cx as i32, y2.map(v) as i32)),
                _ => {
                    if current.len() > 1 {
                        segments.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
            }
        }
        if current.len() > 1 {
            segments.push(current.clone());
        }
        for seg in &segments {
            root.draw(&PathElement::new(seg.clone(), RED.stroke_width(2)))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        for r in cfg.data {
            let year = (cfg.x)(r).round() as i32;
            if let (Some(px), Some(v)) = (x_band.position(year), (cfg.y2)(r)) {
                if v.is_finite() {
                    root.draw(&Circle::new(
                        ((px + bw / 2.0) as i32, y2.map(v) as i32),
                        2,
                        RED.filled(),
                    ))
                    .map_err(|e| anyhow!("{:?}", e))?;
                }
            }
        }

        // Axes and captions.
        let x_ticks: Vec<(f64, String)> = year_ticks(x0, x1, total_width as f64, cfg.x_tick_gap)
            .into_iter()
            .filter_map(|yr| x_band.position(yr).map(|px| (px + bw / 2.0, yr.to_string())))
            .collect();
        axis::draw_bottom_axis(&root, &plot, &x_ticks)?;
        axis::draw_left_axis(&root, &plot, &AxisScale::Log(y).tick_labels(0))?;
        axis::draw_right_axis(&root, &plot, &AxisScale::Linear(y2).tick_labels(6))?;
        axis::draw_title(&root, &plot, &cfg.title)?;
        axis::draw_x_label(&root, &plot, cfg.margins.bottom, &cfg.x_label)?;
        axis::draw_y_label(&root, &plot, 16.0, &cfg.y_label)?;
        axis::draw_y_label(&root, &plot, total_width as f64 - 16.0, &cfg.y2_label)?;

        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }

    log::debug!(
        "dual chart rendered: {} rows, {}x{}, years {}..{}",
        cfg.data.len(),
        total_width,
        height,
        x0,
        x1
    );
    mount.replace(Rendered {
        svg,
        width: total_width,
        height,
        layout: Layout::Dual(DualLayout {
            x_band,
            x_linear,
            y,
            y2,
            plot,
        }),
    });
    Ok(())
}
