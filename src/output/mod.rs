//! File export: output naming and the pgfplots writer.
//!
//! The SVG chart is written by the renderer itself; this module owns the
//! export naming scheme and the .tex route.

pub mod paths;
pub mod tikz;

// Re-export main functions
pub use paths::{output_path, output_stem};
pub use tikz::write_tikz;
