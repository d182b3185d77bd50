// src/plot/mod.rs

//! Aggregate and per-age-group time-series charts.

pub mod model;
pub mod render;

pub use model::{build_charts, Chart, ChartPair, Selection, Series};
pub use render::{render_svg, render_svg_string, DEFAULT_SIZE};
