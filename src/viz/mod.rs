//! Chart rendering: dual-axis time series, aggregated bubble chart, and the
//! brushable year strip, all drawn to **SVG** via plotters.
//!
//! Rendering is stateless and destructive: each render call replaces the
//! whole retained graphic at its [`Mount`], so repeated calls with the same
//! configuration and data produce byte-identical output. Interaction works
//! off the [`Layout`] a render leaves behind (scales plus plot rectangle),
//! never off the SVG text.

pub mod axis;
pub mod brush;
pub mod bubble;
pub mod color;
pub mod dual;
pub mod export;

pub use axis::AxisScale;
pub use color::ColorMode;

use std::sync::Once;

/// One-time registration for a fallback "sans-serif" font when using the
/// `ab_glyph` text path. Required because `ab_glyph` doesn't discover OS
/// fonts.
static INIT_FONTS: Once = Once::new();

pub(crate) fn ensure_fonts_registered() {
    // Safe to call many times; only runs once.
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

/// Pixel margins around the plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 40.0,
            right: 80.0,
            bottom: 60.0,
            left: 80.0,
        }
    }
}

/// The plot rectangle in absolute pixel coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotRect {
    pub fn from_margins(total_width: f64, total_height: f64, m: &Margins) -> Self {
        Self {
            left: m.left,
            top: m.top,
            width: (total_width - m.left - m.right).max(1.0),
            height: (total_height - m.top - m.bottom).max(1.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Scales and geometry retained from the last render at a mount, used by the
/// interaction layer for hit-testing and inverse mapping.
#[derive(Debug, Clone)]
pub enum Layout {
    Dual(dual::DualLayout),
    Bubble(bubble::BubbleLayout),
    Brush(brush::BrushLayout),
}

/// The output a renderer retains at a mount.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub svg: String,
    pub width: u32,
    pub height: u32,
    pub layout: Layout,
}

/// A host surface for one chart.
///
/// The renderer that last drew here owns the retained graphic; every render
/// call discards the previous output and builds a fresh one. The measured
/// width stands in for the host element's bounding width and is used when a
/// configuration carries no explicit width.
#[derive(Debug)]
pub struct Mount {
    measured_width: u32,
    rendered: Option<Rendered>,
}

impl Mount {
    pub fn new(measured_width: u32) -> Self {
        Self {
            measured_width: measured_width.max(1),
            rendered: None,
        }
    }

    pub fn measured_width(&self) -> u32 {
        self.measured_width
    }

    /// The current SVG document, if anything has been rendered here.
    pub fn svg(&self) -> Option<&str> {
        self.rendered.as_ref().map(|r| r.svg.as_str())
    }

    pub fn rendered(&self) -> Option<&Rendered> {
        self.rendered.as_ref()
    }

    /// Drop the retained graphic without rendering a replacement.
    pub fn clear(&mut self) {
        self.rendered = None;
    }

    pub(crate) fn replace(&mut self, rendered: Rendered) {
        self.rendered = Some(rendered);
    }
}
