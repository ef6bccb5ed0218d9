//! The core data pipeline: group, align, aggregate, smooth.
//!
//! Everything here is a pure in-memory transformation between the
//! tracking-service boundary and the renderer.

pub mod align;
pub mod bounds;
pub mod group;
pub mod smooth;

// Re-export main types and functions
pub use align::align;
pub use bounds::{bounds, bounds_all, has_bounds_columns};
pub use group::{default_name_func, group_runs, merged_attrs, FilterConfig, FilterValue};
pub use smooth::{smooth, smooth_all};
