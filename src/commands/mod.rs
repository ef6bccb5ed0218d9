//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the library components to perform user tasks.

pub mod plot;
pub mod runs;

// Re-export main command functions
pub use plot::{execute_plot, validate_args, PlotArgs};
pub use runs::execute_runs;
