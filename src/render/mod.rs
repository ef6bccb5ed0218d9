//! Chart rendering: style resolution, draw ordering and SVG output.

pub mod chart;
pub mod sort;
pub mod style;

// Re-export main types and functions
pub use chart::{render_chart, GroupSeries, LegendPos, PlotOptions};
pub use sort::{natural_cmp, SortOrder};
pub use style::{LineKind, StyleOverrides};
