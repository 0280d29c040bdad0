//! Aggregated bubble chart: one point per country, positioned by two group
//! statistics, sized by a magnitude statistic, and colored by a sequential
//! or categorical encoding.

use crate::scale::{log_safe, LinearScale, LogScale};
use crate::stats::AggregatedGroup;
use crate::viz::axis::{self, format_count, AxisScale};
use crate::viz::color::{ColorMode, NEUTRAL};
use crate::viz::{ensure_fonts_registered, Layout, Margins, Mount, PlotRect, Rendered};
use anyhow::{anyhow, bail, Result};
use plotters::prelude::*;
use plotters_svg::SVGBackend;

/// Accessor reading one statistic off an aggregated group.
///
/// The aggregator has already excluded groups with unusable inputs, so
/// accessors can assume their statistic is present and finite.
pub type GroupAccessor<'a> = &'a dyn Fn(&AggregatedGroup) -> f64;

/// Configuration of one bubble-chart render, constructed fresh per call.
pub struct BubbleChartConfig<'a> {
    pub groups: &'a [AggregatedGroup],
    pub width: Option<u32>,
    pub height: u32,
    pub margins: Margins,
    pub x: GroupAccessor<'a>,
    pub y: GroupAccessor<'a>,
    /// Magnitude statistic encoded as point area.
    pub radius: GroupAccessor<'a>,
    /// Code fed to the color mode (regime value or region code).
    pub code: GroupAccessor<'a>,
    pub x_log: bool,
    pub y_log: bool,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub max_radius: f64,
    pub color_mode: ColorMode,
    /// Key of the point rendered with a distinguishing stroke.
    pub selected: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub title: String,
    pub fetching: bool,
}

impl<'a> BubbleChartConfig<'a> {
    pub fn new(
        groups: &'a [AggregatedGroup],
        x: GroupAccessor<'a>,
        y: GroupAccessor<'a>,
        radius: GroupAccessor<'a>,
        code: GroupAccessor<'a>,
    ) -> Self {
        Self {
            groups,
            width: None,
            height: 400,
            margins: Margins::default(),
            x,
            y,
            radius,
            code,
            x_log: false,
            y_log: false,
            x_min: None,
            x_max: None,
            y_min: None,
            y_max: None,
            max_radius: 30.0,
            color_mode: ColorMode::regime(),
            selected: None,
            x_label: String::new(),
            y_label: String::new(),
            title: String::new(),
            fetching: false,
        }
    }
}

/// One rendered point, retained for hit-testing.
#[derive(Debug, Clone)]
pub struct BubblePoint {
    pub key: String,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

/// Scales and point geometry retained from the last bubble render.
#[derive(Debug, Clone)]
pub struct BubbleLayout {
    pub x: AxisScale,
    pub y: AxisScale,
    pub plot: PlotRect,
    /// Points in draw order (largest first, so later entries are on top).
    pub points: Vec<BubblePoint>,
}

/// The key of the topmost point covering the pixel, if any.
pub fn hit_test(layout: &BubbleLayout, px: f64, py: f64) -> Option<&str> {
    for p in layout.points.iter().rev() {
        let dx = px - p.cx;
        let dy = py - p.cy;
        if (dx * dx + dy * dy).sqrt() <= p.r {
            return Some(&p.key);
        }
    }
    None
}

/// Plain marked-up tooltip text for one group; not part of the exported SVG.
pub fn tooltip(
    group: &AggregatedGroup,
    display_name: Option<&str>,
    region_name: Option<&str>,
    magnitude_dim: &str,
) -> String {
    let mut out = format!("<b>{}</b>", display_name.unwrap_or(&group.country));
    if let Some(region) = region_name {
        out.push_str(&format!("<br/>{}", region));
    }
    if let Some(v) = group.stat(magnitude_dim) {
        out.push_str(&format!("<br/>{}: {}", magnitude_dim, format_count(v)));
    }
    out
}

fn build_axis(
    log: bool,
    (lo, hi): (f64, f64),
    range: (f64, f64),
) -> Result<AxisScale> {
    if log {
        let d0 = log_safe(lo);
        let mut d1 = log_safe(hi);
        if d1 <= d0 {
            d1 = d0 * 10.0;
        }
        Ok(AxisScale::Log(LogScale::new((d0, d1), range)?))
    } else {
        let (mut d0, mut d1) = (lo, hi);
        if d1 <= d0 {
            d0 -= 1.0;
            d1 += 1.0;
        }
        Ok(AxisScale::Linear(LinearScale::new((d0, d1), range)))
    }
}

fn group_extent(
    groups: &[AggregatedGroup],
    acc: GroupAccessor<'_>,
    min_override: Option<f64>,
    max_override: Option<f64>,
) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for g in groups {
        let v = acc(g);
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

/// Render the bubble chart at `mount`, replacing any previous output there.
pub fn render(mount: &mut Mount, cfg: &BubbleChartConfig<'_>) -> Result<()> {
    if cfg.groups.is_empty() {
        bail!("no groups to plot");
    }
    ensure_fonts_registered();

    let total_width = cfg.width.unwrap_or_else(|| mount.measured_width());
    let height = cfg.height;
    let plot = PlotRect::from_margins(total_width as f64, height as f64, &cfg.margins);

    let x_extent = group_extent(cfg.groups, cfg.x, cfg.x_min, cfg.x_max);
    let y_extent = group_extent(cfg.groups, cfg.y, cfg.y_min, cfg.y_max);
    let x = build_axis(cfg.x_log, x_extent, (plot.left, plot.right()))?;
    let y = build_axis(cfg.y_log, y_extent, (plot.bottom(), plot.top))?;

    // Area-true radius encoding against the largest magnitude in view.
    let r_max_val = cfg
        .groups
        .iter()
        .map(|g| (cfg.radius)(g))
        .fold(f64::NEG_INFINITY, f64::max)
        .max(f64::MIN_POSITIVE);

    // Largest bubbles first so small ones stay visible and clickable.
    let mut order: Vec<&AggregatedGroup> = cfg.groups.iter().collect();
    order.sort_by(|&a, &b| {
        (cfg.radius)(b)
            .partial_cmp(&(cfg.radius)(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut points = Vec::with_capacity(order.len());
    for &g in &order {
        let vx = if cfg.x_log { log_safe((cfg.x)(g)) } else { (cfg.x)(g) };
        let vy = if cfg.y_log { log_safe((cfg.y)(g)) } else { (cfg.y)(g) };
        let r = ((cfg.radius)(g) / r_max_val).max(0.0).sqrt() * cfg.max_radius;
        points.push(BubblePoint {
            key: g.country.clone(),
            cx: x.map(vx),
            cy: y.map(vy),
            r,
        });
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (total_width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

        for (&g, p) in order.iter().zip(&points) {
            let fill = if cfg.fetching {
                NEUTRAL
            } else {
                cfg.color_mode.color_for((cfg.code)(g))
            };
            root.draw(&Circle::new(
                (p.cx as i32, p.cy as i32),
                p.r as i32,
                fill.mix(0.8).filled(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
            if cfg.selected.as_deref() == Some(p.key.as_str()) {
                root.draw(&Circle::new(
                    (p.cx as i32, p.cy as i32),
                    p.r as i32,
                    BLACK.stroke_width(2),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
            }
        }

        axis::draw_bottom_axis(&root, &plot, &x.tick_labels(6))?;
        axis::draw_left_axis(&root, &plot, &y.tick_labels(6))?;
        axis::draw_title(&root, &plot, &cfg.title)?;
        axis::draw_x_label(&root, &plot, cfg.margins.bottom, &cfg.x_label)?;
        axis::draw_y_label(&root, &plot, 16.0, &cfg.y_label)?;

        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }

    log::debug!(
        "bubble chart rendered: {} groups, {}x{}",
        cfg.groups.len(),
        total_width,
        height
    );
    mount.replace(Rendered {
        svg,
        width: total_width,
        height,
        layout: Layout::Bubble(BubbleLayout { x, y, plot, points }),
    });
    Ok(())
}
