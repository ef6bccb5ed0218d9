//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while talking to the tracking service
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Not authorized; check the API key")]
    Unauthorized,
}

/// Errors that can occur while filtering and grouping runs
#[derive(Error, Debug)]
pub enum GroupError {
    /// A filter referenced an attribute the run does not have.
    ///
    /// This is deliberately fatal: treating an undefined attribute as a
    /// non-match would hide config-schema mismatches.
    #[error("run '{run}' has no attribute '{key}' referenced by a filter")]
    MissingAttribute { key: String, run: String },
}

/// Errors that can occur while aligning a group's series
#[derive(Error, Debug)]
pub enum AlignError {
    #[error("no run in the group produced any samples for the requested metric")]
    EmptyGroup,
}

/// Errors that can occur while collapsing a frame to bounds
#[derive(Error, Debug)]
pub enum BoundsError {
    #[error("cannot aggregate a frame with no run columns")]
    NoColumns,
}

/// Errors that can occur during chart rendering
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("nothing to plot: no groups with data")]
    EmptyChart,

    #[error("chart drawing failed: {0}")]
    Draw(String),

    #[error(transparent)]
    Bounds(#[from] BoundsError),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
