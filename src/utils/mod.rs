//! Utility modules for configuration and error handling.

pub mod config;
pub mod error;

// Re-export commonly used error types for convenience
pub use error::{AlignError, ApiError, BoundsError, GroupError, OutputError, RenderError};
