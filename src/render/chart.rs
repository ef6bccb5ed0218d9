//! SVG line-and-band chart rendering.
//!
//! Consumes per-group envelope frames and draws the mean of each group as a
//! line with the [low, high] band as a semi-transparent fill in the same
//! colour. A group handed over as a raw aligned frame is collapsed through
//! the aggregator first, so `plot` works standalone without a prior bounds
//! pass.

use crate::frame::Frame;
use crate::pipeline::bounds::{bounds, has_bounds_columns, HIGH, LOW, MEAN};
use crate::render::sort::{sorted_names, SortOrder};
use crate::render::style::{resolve_style, LineKind, StyleCycle, StyleOverrides};
use crate::utils::config::BAND_ALPHA;
use crate::utils::error::RenderError;
use indexmap::IndexMap;
use log::{debug, info};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::Path;

/// Legend placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPos {
    #[default]
    Best,
    UpperLeft,
    UpperRight,
    UpperCenter,
    LowerLeft,
    LowerRight,
    LowerCenter,
}

impl From<LegendPos> for SeriesLabelPosition {
    fn from(pos: LegendPos) -> Self {
        match pos {
            LegendPos::Best | LegendPos::UpperRight => SeriesLabelPosition::UpperRight,
            LegendPos::UpperLeft => SeriesLabelPosition::UpperLeft,
            LegendPos::UpperCenter => SeriesLabelPosition::UpperMiddle,
            LegendPos::LowerLeft => SeriesLabelPosition::LowerLeft,
            LegendPos::LowerRight => SeriesLabelPosition::LowerRight,
            LegendPos::LowerCenter => SeriesLabelPosition::LowerMiddle,
        }
    }
}

/// Display configuration for one rendered chart.
///
/// Carried explicitly through the renderer so that successive renders never
/// share mutable style state.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    /// None disables the legend entirely
    pub legend: Option<LegendPos>,
    pub sort: SortOrder,
    pub overrides: StyleOverrides,
    pub log_y: bool,
    pub y_limits: Option<(f64, f64)>,
    /// Chart size in pixels
    pub size: (u32, u32),
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            title: None,
            xlabel: Some("Step".to_string()),
            ylabel: None,
            legend: Some(LegendPos::Best),
            sort: SortOrder::Insertion,
            overrides: StyleOverrides::default(),
            log_y: false,
            y_limits: None,
            size: (1000, 500),
        }
    }
}

/// A group's series handed to the renderer
#[derive(Debug, Clone)]
pub enum GroupSeries {
    /// Already collapsed to {low, mean, high}
    Bounds(Frame),
    /// Raw aligned frame, one column per run
    Aligned(Frame),
}

impl GroupSeries {
    /// Classify a frame by whether it already carries the envelope columns
    pub fn from_frame(frame: Frame) -> Self {
        if has_bounds_columns(&frame) {
            GroupSeries::Bounds(frame)
        } else {
            GroupSeries::Aligned(frame)
        }
    }

    fn into_bounds(self) -> Result<Frame, RenderError> {
        match self {
            GroupSeries::Bounds(frame) => Ok(frame),
            GroupSeries::Aligned(frame) => Ok(bounds(&frame, false)?),
        }
    }
}

/// Render the per-group envelopes as an SVG chart at `path`.
pub fn render_chart(
    groups: IndexMap<String, GroupSeries>,
    options: &PlotOptions,
    path: &Path,
) -> Result<(), RenderError> {
    // Collapse any raw aligned frames first
    let mut resolved: IndexMap<String, Frame> = IndexMap::new();
    for (name, series) in groups {
        resolved.insert(name, series.into_bounds()?);
    }
    let resolved: IndexMap<String, Frame> = resolved
        .into_iter()
        .filter(|(name, frame)| {
            if frame.is_empty() {
                debug!("Skipping empty group '{}'", name);
                false
            } else {
                true
            }
        })
        .collect();

    if resolved.is_empty() {
        return Err(RenderError::EmptyChart);
    }

    // Draw order
    let entries: Vec<(String, Option<f64>)> = resolved
        .iter()
        .map(|(name, frame)| (name.clone(), frame.last_value(MEAN).map(|(_, v)| v)))
        .collect();
    let ordered: Vec<(String, Frame)> = sorted_names(&entries, &options.sort)
        .into_iter()
        .filter_map(|name| resolved.get(&name).cloned().map(|f| (name, f)))
        .collect();

    // Axis limits: x clamps to the union of all groups' observed step ranges
    let (x_min, x_max) = axis_span(ordered.iter().flat_map(|(_, f)| f.index().iter().copied()));
    let (y_min, y_max) = match options.y_limits {
        Some((lo, hi)) => (lo, hi),
        None => padded_y_span(&ordered),
    };

    info!(
        "Rendering {} groups over steps [{}, {}] to {}",
        ordered.len(),
        x_min,
        x_max,
        path.display()
    );

    let root = SVGBackend::new(path, options.size).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(10).x_label_area_size(40).y_label_area_size(60);
    if let Some(title) = &options.title {
        builder.caption(title.as_str(), ("sans-serif", 22));
    }

    if options.log_y {
        let y_lo = y_min.max(f64::MIN_POSITIVE);
        let y_hi = y_max.max(y_lo * 10.0);
        let mut chart = builder
            .build_cartesian_2d(x_min..x_max, (y_lo..y_hi).log_scale())
            .map_err(draw_err)?;
        draw_groups(&mut chart, &ordered, options)?;
    } else {
        let mut chart = builder
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(draw_err)?;
        draw_groups(&mut chart, &ordered, options)?;
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Draw mesh, band, mean line and legend into a built chart
fn draw_groups<'a, XR, YR>(
    chart: &mut ChartContext<'a, SVGBackend<'a>, Cartesian2d<XR, YR>>,
    ordered: &[(String, Frame)],
    options: &PlotOptions,
) -> Result<(), RenderError>
where
    XR: Ranged<ValueType = f64> + ValueFormatter<f64>,
    YR: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    let mut mesh = chart.configure_mesh();
    if let Some(xlabel) = &options.xlabel {
        mesh.x_desc(xlabel.as_str());
    }
    if let Some(ylabel) = &options.ylabel {
        mesh.y_desc(ylabel.as_str());
    }
    mesh.draw().map_err(draw_err)?;

    let mut cycle = StyleCycle::new();
    for (name, frame) in ordered {
        let (colour, line) = resolve_style(name, &options.overrides, &mut cycle);

        // Band: low forward, high backward, as one filled polygon
        let band = band_polygon(frame);
        if !band.is_empty() {
            chart
                .draw_series(std::iter::once(Polygon::new(band, colour.mix(BAND_ALPHA))))
                .map_err(draw_err)?;
        }

        let mean_points = column_points(frame, MEAN);
        let anno = match line {
            LineKind::Solid => chart
                .draw_series(LineSeries::new(mean_points, colour.stroke_width(2)))
                .map_err(draw_err)?,
            LineKind::Dashed => chart
                .draw_series(DashedLineSeries::new(
                    mean_points.into_iter(),
                    8,
                    5,
                    colour.stroke_width(2),
                ))
                .map_err(draw_err)?,
        };

        if options.legend.is_some() {
            anno.label(name.as_str()).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2))
            });
        }
    }

    if let Some(pos) = options.legend {
        chart
            .configure_series_labels()
            .position(pos.into())
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(draw_err)?;
    }

    Ok(())
}

/// Rows where a column is present, as (step, value) pairs
fn column_points(frame: &Frame, column: &str) -> Vec<(f64, f64)> {
    let Some(col) = frame.column(column) else {
        return Vec::new();
    };
    frame
        .index()
        .iter()
        .zip(&col.values)
        .filter_map(|(&step, &v)| v.map(|value| (step, value)))
        .collect()
}

/// Closed polygon tracing low forward and high backward
fn band_polygon(frame: &Frame) -> Vec<(f64, f64)> {
    let low = column_points(frame, LOW);
    let mut high = column_points(frame, HIGH);
    high.reverse();
    let mut polygon = low;
    polygon.extend(high);
    polygon
}

/// Min/max over an iterator of axis values, padded for degenerate spans
fn axis_span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

/// Data-driven y span over low/high columns, with 5% headroom
fn padded_y_span(ordered: &[(String, Frame)]) -> (f64, f64) {
    let (lo, hi) = axis_span(ordered.iter().flat_map(|(_, frame)| {
        [LOW, HIGH].into_iter().flat_map(|c| {
            frame
                .column(c)
                .map(|col| col.values.iter().flatten().copied().collect::<Vec<_>>())
                .unwrap_or_default()
        })
    }));
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds_frame() -> Frame {
        let mut frame = Frame::with_index("step", vec![0.0, 10.0, 20.0]);
        frame.push_column(LOW, vec![Some(1.0), Some(2.0), Some(3.0)]);
        frame.push_column(MEAN, vec![Some(2.0), Some(3.0), Some(4.0)]);
        frame.push_column(HIGH, vec![Some(3.0), Some(4.0), Some(5.0)]);
        frame
    }

    #[test]
    fn test_group_series_classification() {
        assert!(matches!(
            GroupSeries::from_frame(bounds_frame()),
            GroupSeries::Bounds(_)
        ));
        let aligned = Frame::from_samples("step", "run-a", &[(0.0, 1.0)]);
        assert!(matches!(
            GroupSeries::from_frame(aligned),
            GroupSeries::Aligned(_)
        ));
    }

    #[test]
    fn test_aligned_fallback_collapses() {
        let aligned = Frame::from_samples("step", "run-a", &[(0.0, 1.0), (10.0, 2.0)]);
        let collapsed = GroupSeries::Aligned(aligned).into_bounds().unwrap();
        assert!(has_bounds_columns(&collapsed));
    }

    #[test]
    fn test_band_polygon_traces_low_then_high_reversed() {
        let polygon = band_polygon(&bounds_frame());
        assert_eq!(
            polygon,
            vec![
                (0.0, 1.0),
                (10.0, 2.0),
                (20.0, 3.0),
                (20.0, 5.0),
                (10.0, 4.0),
                (0.0, 3.0),
            ]
        );
    }

    #[test]
    fn test_axis_span_degenerate() {
        assert_eq!(axis_span([5.0].into_iter()), (4.5, 5.5));
        assert_eq!(axis_span(std::iter::empty()), (0.0, 1.0));
    }

    #[test]
    fn test_render_chart_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");

        let mut groups = IndexMap::new();
        groups.insert("g1".to_string(), GroupSeries::Bounds(bounds_frame()));

        render_chart(groups, &PlotOptions::default(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
    }

    #[test]
    fn test_legend_is_drawn_for_both_axis_kinds() {
        let dir = tempfile::tempdir().unwrap();

        for (file, log_y) in [("linear.svg", false), ("log.svg", true)] {
            let path = dir.path().join(file);
            let mut options = PlotOptions::default();
            options.log_y = log_y;

            let mut groups = IndexMap::new();
            groups.insert("run-set-a".to_string(), GroupSeries::Bounds(bounds_frame()));

            render_chart(groups, &options, &path).unwrap();

            let content = std::fs::read_to_string(&path).unwrap();
            assert!(content.contains("run-set-a"), "legend label missing in {}", file);
        }
    }

    #[test]
    fn test_render_chart_rejects_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");

        let err = render_chart(IndexMap::new(), &PlotOptions::default(), &path).unwrap_err();

        assert!(matches!(err, RenderError::EmptyChart));
    }
}
