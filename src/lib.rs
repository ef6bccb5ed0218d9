//! trackplot
//!
//! Grouped envelope plots for experiment-run metrics fetched from a
//! tracking service.
//!
//! Runs are fetched per project, partitioned into named groups, aligned
//! onto a shared step axis, collapsed to a {low, mean, high} envelope,
//! smoothed and rendered as a line-and-band chart.
//!
//! ## Getting Started
//!
//! Most users should install and use the CLI:
//!
//! ```bash
//! cargo install trackplot
//! trackplot --help
//! ```
//!
//! Scripted use goes through [`session::Plotter`], which mirrors the CLI
//! pipeline step by step and additionally accepts predicate filters and
//! custom naming functions.

pub mod api;
pub mod commands;
pub mod frame;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod utils;
