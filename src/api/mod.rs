//! Tracking-service boundary: run listing and lazy metric-history fetches.
//!
//! The rest of the crate treats this as an opaque data source; everything
//! past it is a pure in-memory transformation pipeline.

pub mod client;
pub mod types;

pub use client::Client;
pub use types::{Run, RunSeries, Sample};
