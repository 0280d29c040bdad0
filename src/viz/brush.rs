//! Brushable year strip: a small per-year bar chart with a draggable
//! interval selector over the time domain.
//!
//! The brush never aggregates; it converts pixel extents back through the
//! scales, snaps to whole years, and reports the range. The state owner
//! re-derives its aggregation and re-renders the dependent charts.

use crate::interact::Throttle;
use crate::models::YearRange;
use crate::scale::{BandScale, LinearScale, year_ticks, BAND_PADDING};
use crate::viz::axis;
use crate::viz::color::STEELBLUE;
use crate::viz::dual::{extent, Accessor};
use crate::viz::{ensure_fonts_registered, Layout, Margins, Mount, PlotRect, Rendered};
use anyhow::{anyhow, bail, Result};
use plotters::prelude::*;
use plotters_svg::SVGBackend;
use std::time::{Duration, Instant};

/// Configuration of one brush-strip render, constructed fresh per call.
pub struct BrushChartConfig<'a, R> {
    pub data: &'a [R],
    pub width: Option<u32>,
    pub height: u32,
    pub margins: Margins,
    pub x_tick_gap: f64,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub x: Accessor<'a, R>,
    /// Total magnitude per year, drawn as the context bars.
    pub y: Accessor<'a, R>,
    /// Current selection, highlighted as a translucent rectangle.
    pub selection: Option<YearRange>,
}

impl<'a, R> BrushChartConfig<'a, R> {
    pub fn new(data: &'a [R], x: Accessor<'a, R>, y: Accessor<'a, R>) -> Self {
        Self {
            data,
            width: None,
            height: 100,
            margins: Margins {
                top: 8.0,
                right: 16.0,
                bottom: 24.0,
                left: 16.0,
            },
            x_tick_gap: 80.0,
            x_min: None,
            x_max: None,
            x,
            y,
            selection: None,
        }
    }
}

/// Scales retained from the last brush render; the interaction layer's
/// window into the chart geometry.
#[derive(Debug, Clone)]
pub struct BrushLayout {
    pub x_band: BandScale,
    pub x_linear: LinearScale,
    pub domain: YearRange,
    pub plot: PlotRect,
}

/// Render the brush strip at `mount`, replacing any previous output there.
pub fn render<R>(mount: &mut Mount, cfg: &BrushChartConfig<'_, R>) -> Result<()> {
    if cfg.data.is_empty() {
        bail!("no data to plot");
    }
    ensure_fonts_registered();

    let total_width = cfg.width.unwrap_or_else(|| mount.measured_width());
    let height = cfg.height;
    let plot = PlotRect::from_margins(total_width as f64, height as f64, &cfg.margins);

    let (x0f, x1f) = extent(cfg.data, cfg.x, cfg.x_min, cfg.x_max);
    let (x0, x1) = (x0f.round() as i32, x1f.round() as i32);
    let (_, y_hi) = extent(cfg.data, cfg.y, None, None);

    let x_band = BandScale::new(x0, x1, (plot.left, plot.right()), BAND_PADDING);
    let x_linear = LinearScale::new((x0 as f64, x1 as f64), (plot.left, plot.right()));
    let y = LinearScale::new((0.0, y_hi.max(1.0)), (plot.bottom(), plot.top));
    let domain = YearRange::new(x0, x1);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (total_width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

        let bw = x_band.bandwidth();
        for r in cfg.data {
            let year = (cfg.x)(r).round() as i32;
            let bx = match x_band.position(year) {
                Some(px) => px,
                None => continue,
            };
            let top = y.map((cfg.y)(r).max(0.0));
            root.draw(&Rectangle::new(
                [
                    (bx as i32, top as i32),
                    ((bx + bw) as i32, plot.bottom() as i32),
                ],
                STEELBLUE.mix(0.6).filled(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }

        if let Some(sel) = cfg.selection {
            let sel = sel.clamp_to(domain);
            let lo = x_band.position(sel.start).unwrap_or(plot.left);
            let hi = x_band
                .position(sel.end)
                .map(|px| px + bw)
                .unwrap_or_else(|| plot.right());
            root.draw(&Rectangle::new(
                [
                    (lo as i32, plot.top as i32),
                    (hi as i32, plot.bottom() as i32),
                ],
                BLACK.mix(0.15).filled(),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
            root.draw(&Rectangle::new(
                [
                    (lo as i32, plot.top as i32),
                    (hi as i32, plot.bottom() as i32),
                ],
                BLACK.mix(0.4).stroke_width(1),
            ))
            .map_err(|e| anyhow!("{:?}", e))?;
        }

        let x_ticks: Vec<(f64, String)> = year_ticks(x0, x1, total_width as f64, cfg.x_tick_gap)
            .into_iter()
            .filter_map(|yr| {
                x_band
                    .position(yr)
                    .map(|px| (px + bw / 2.0, yr.to_string()))
            })
            .collect();
        axis::draw_bottom_axis(&root, &plot, &x_ticks)?;

        root.present().map_err(|e| anyhow!("{:?}", e))?;
    }

    mount.replace(Rendered {
        svg,
        width: total_width,
        height,
        layout: Layout::Brush(BrushLayout {
            x_band,
            x_linear,
            domain,
            plot,
        }),
    });
    Ok(())
}

/// Drag-gesture state machine for the brush.
///
/// Pointer positions come in as pixels; each update converts the dragged
/// extent back to whole years through the layout's inverse scale and offers
/// it to the throttle. The final position is always delivered on release.
#[derive(Debug)]
pub struct BrushInteraction {
    layout: BrushLayout,
    throttle: Throttle<YearRange>,
    anchor_px: Option<f64>,
    selection: YearRange,
    last_emitted: Option<YearRange>,
}

impl BrushInteraction {
    pub fn new(layout: BrushLayout, throttle_interval: Duration) -> Self {
        let selection = layout.domain;
        Self {
            layout,
            throttle: Throttle::new(throttle_interval),
            anchor_px: None,
            selection,
            last_emitted: None,
        }
    }

    pub fn selection(&self) -> YearRange {
        self.selection
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor_px.is_some()
    }

    fn clamp_px(&self, px: f64) -> f64 {
        px.clamp(self.layout.plot.left, self.layout.plot.right())
    }

    /// Snap a pixel extent to whole-year boundaries inside the domain.
    /// The epsilon keeps an exact year boundary from flooring one year low.
    fn range_from_px(&self, a: f64, b: f64) -> YearRange {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let start = (self.layout.x_linear.invert(lo) + 1e-6).floor() as i32;
        let end = (self.layout.x_linear.invert(hi) - 1e-6).ceil() as i32;
        YearRange::new(start, end).clamp_to(self.layout.domain)
    }

    pub fn pointer_down(&mut self, px: f64) {
        let px = self.clamp_px(px);
        self.anchor_px = Some(px);
        self.selection = self.range_from_px(px, px);
    }

    /// Update the dragged extent; returns the selection when the throttle
    /// window permits delivery.
    pub fn pointer_move(&mut self, px: f64, now: Instant) -> Option<YearRange> {
        let anchor = self.anchor_px?;
        self.selection = self.range_from_px(anchor, self.clamp_px(px));
        let emitted = self.throttle.offer(self.selection, now);
        if let Some(sel) = emitted {
            self.last_emitted = Some(sel);
        }
        emitted
    }

    /// End the drag. The final selection is delivered unless it already went
    /// out as the most recent emission.
    pub fn pointer_up(&mut self) -> Option<YearRange> {
        self.anchor_px = None;
        if let Some(pending) = self.throttle.flush() {
            self.last_emitted = Some(pending);
            return Some(pending);
        }
        if self.last_emitted != Some(self.selection) {
            self.last_emitted = Some(self.selection);
            return Some(self.selection);
        }
        None
    }
}
