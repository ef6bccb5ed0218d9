//! Exponential smoothing of envelope frames.

use crate::frame::Frame;
use indexmap::IndexMap;

/// Smooth every column of a frame independently.
///
/// The half-life is `row_count / 100 * smoothing`, so a fixed smoothing
/// factor produces visually comparable smoothing regardless of how many
/// samples were fetched. A factor of 0 is the identity. Index and column
/// set are preserved exactly.
pub fn smooth(frame: &Frame, smoothing: f64) -> Frame {
    let halflife = frame.rows() as f64 / 100.0 * smoothing;
    frame.ewm_mean(halflife)
}

/// Mapping entry point: smooth every group's frame.
pub fn smooth_all(groups: &IndexMap<String, Frame>, smoothing: f64) -> IndexMap<String, Frame> {
    groups
        .iter()
        .map(|(name, frame)| (name.clone(), smooth(frame, smoothing)))
        .collect()
}
