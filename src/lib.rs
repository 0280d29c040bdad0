//! biodem_rs
//!
//! A lightweight Rust library for exploring biodiversity knowledge against
//! political-regime data: per-country GBIF record counts overlaid on V-Dem
//! style indicators. Pairs with the `biodem` CLI.
//!
//! ### Features
//! - Fetch per-year occurrence record counts for a country from GBIF
//! - Load indicator tables from CSV with explicit missing-value handling
//! - Group records per country and aggregate with median/sum/mean
//! - Render dual-axis time series, aggregated bubble charts, and a
//!   brushable year strip as SVG
//! - Export any rendered chart as a standalone SVG download
//!
//! ### Example
//! ```no_run
//! use biodem_rs::viz::dual::{self, DualChartConfig};
//! use biodem_rs::viz::Mount;
//!
//! struct Row { year: i32, records: u64, indicator: Option<f64> }
//! let rows = vec![Row { year: 2000, records: 120, indicator: Some(0.7) }];
//!
//! let x = |r: &Row| r.year as f64;
//! let y = |r: &Row| r.records as f64;
//! let y2 = |r: &Row| r.indicator;
//! let color = |_: &Row| biodem_rs::viz::color::STEELBLUE;
//!
//! let mut cfg = DualChartConfig::new(&rows, &x, &y, &y2, &color);
//! cfg.title = "Sweden".into();
//! let mut mount = Mount::new(1000);
//! dual::render(&mut mount, &cfg)?;
//! let export = biodem_rs::viz::export::export_svg(&mount, "sweden").unwrap();
//! export.write_to("sweden.svg")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod interact;
pub mod models;
pub mod scale;
pub mod stats;
pub mod storage;
pub mod viz;

pub use api::{Client, ErrorStore, QueryCategory};
pub use models::{IndicatorRecord, RecordCount, YearRange};
