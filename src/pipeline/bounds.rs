//! Collapse an aligned multi-run frame into a {low, mean, high} envelope.

use crate::frame::Frame;
use crate::utils::error::BoundsError;
use indexmap::IndexMap;

pub const LOW: &str = "low";
pub const MEAN: &str = "mean";
pub const HIGH: &str = "high";

/// Whether a frame already carries the three envelope columns
pub fn has_bounds_columns(frame: &Frame) -> bool {
    frame.has_column(LOW) && frame.has_column(MEAN) && frame.has_column(HIGH)
}

/// Collapse a frame's run columns to exactly {low, mean, high}.
///
/// `mean` is the row-wise mean over present cells. With `use_minmax` the
/// envelope is the row-wise min/max; otherwise it is `mean` minus/plus the
/// row-wise sample standard deviation (zero when a row has a single present
/// value). Rows outside a run's observed span simply do not contribute.
///
/// A frame with no run columns is rejected: asking to aggregate nothing
/// indicates a bug upstream.
pub fn bounds(frame: &Frame, use_minmax: bool) -> Result<Frame, BoundsError> {
    if frame.cols() == 0 {
        return Err(BoundsError::NoColumns);
    }

    let rows = frame.rows();
    let mut low = Vec::with_capacity(rows);
    let mut mean = Vec::with_capacity(rows);
    let mut high = Vec::with_capacity(rows);

    for row in 0..rows {
        let values: Vec<f64> = frame.row_values(row).collect();
        if values.is_empty() {
            low.push(None);
            mean.push(None);
            high.push(None);
            continue;
        }

        let n = values.len() as f64;
        let m = values.iter().sum::<f64>() / n;
        mean.push(Some(m));

        if use_minmax {
            low.push(Some(values.iter().copied().fold(f64::INFINITY, f64::min)));
            high.push(Some(values.iter().copied().fold(f64::NEG_INFINITY, f64::max)));
        } else {
            let std = if values.len() > 1 {
                let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0);
                var.sqrt()
            } else {
                0.0
            };
            low.push(Some(m - std));
            high.push(Some(m + std));
        }
    }

    let mut out = Frame::with_index(frame.index_name(), frame.index().to_vec());
    out.push_column(LOW, low);
    out.push_column(MEAN, mean);
    out.push_column(HIGH, high);
    Ok(out)
}

/// Mapping entry point: collapse every group's frame.
pub fn bounds_all(
    groups: &IndexMap<String, Frame>,
    use_minmax: bool,
) -> Result<IndexMap<String, Frame>, BoundsError> {
    groups
        .iter()
        .map(|(name, frame)| Ok((name.clone(), bounds(frame, use_minmax)?)))
        .collect()
}
