//! Merge a group's per-run series onto one shared step index.
//!
//! Each run's history becomes one column named after the run; the columns
//! are outer-joined on the step axis and interior gaps are filled by
//! index-proportional interpolation. Nothing is fabricated outside a run's
//! observed span, so sparsely-sampled runs can align with denser ones
//! without inventing trend data.

use crate::api::RunSeries;
use crate::frame::Frame;
use crate::utils::config::strip_marker;
use crate::utils::error::AlignError;
use log::debug;

/// Align a group's raw per-run series into one frame.
///
/// The x key is canonicalized (internal marker stripped) and becomes the
/// frame's index name. Runs with zero samples are silently dropped; a group
/// where every run dropped out is rejected, since aggregating nothing
/// indicates a filter or grouping bug upstream.
pub fn align(series: &[RunSeries], x_key: &str) -> Result<Frame, AlignError> {
    let index_name = strip_marker(x_key);

    let per_run: Vec<Frame> = series
        .iter()
        .filter(|s| {
            if s.samples.is_empty() {
                // Benign: the run simply has not logged this metric yet
                debug!("Dropping run '{}': no samples", s.name);
                false
            } else {
                true
            }
        })
        .map(|s| {
            let points: Vec<(f64, f64)> =
                s.samples.iter().map(|p| (p.step, p.value)).collect();
            Frame::from_samples(index_name, s.name.clone(), &points)
        })
        .collect();

    if per_run.is_empty() {
        return Err(AlignError::EmptyGroup);
    }

    let mut joined = Frame::outer_join(&per_run);
    joined.interpolate_interior();

    debug!(
        "Aligned {} runs onto {} steps",
        joined.cols(),
        joined.rows()
    );
    Ok(joined)
}
