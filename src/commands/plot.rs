//! Plot command implementation.
//!
//! The plot command:
//! 1. Fetches the project's runs
//! 2. Filters and groups them
//! 3. Fetches and aligns the requested metric
//! 4. Computes envelopes and smooths them
//! 5. Renders the chart and writes the export files

use crate::pipeline::group::{FilterConfig, FilterValue};
use crate::render::chart::LegendPos;
use crate::render::sort::SortOrder;
use crate::render::style::{LineKind, StyleOverrides};
use crate::render::PlotOptions;
use crate::session::{PlotRequest, Plotter};
use crate::utils::config::{DEFAULT_SAMPLES, DEFAULT_X_KEY};
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::PathBuf;

/// Arguments for the plot command
///
/// **Public** - used by main.rs to construct from CLI args
pub struct PlotArgs {
    /// Tracking-service base URL
    pub base_url: String,

    /// Optional API key
    pub api_key: Option<String>,

    /// Project owner
    pub entity: String,

    /// Project to plot
    pub project: String,

    /// Metric key to fetch
    pub metric: String,

    /// History index key
    pub x_key: String,

    /// Maximum history rows per run
    pub samples: usize,

    /// Smoothing factor (0 disables)
    pub smoothing: f64,

    /// Min/max envelope instead of mean±std
    pub minmax: bool,

    /// Literal filter clauses, `key=value`
    pub filters: Vec<String>,

    /// Attribute key to group by (default: experiment group)
    pub group_by: Option<String>,

    /// Chart title
    pub title: Option<String>,

    /// Axis labels
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,

    /// Legend position name, or "off"
    pub legend: String,

    /// Sort policy: natural | value | value-desc | comma-separated names
    pub sort: Option<String>,

    /// Log-scale y axis
    pub log_y: bool,

    /// y-axis limits, `lo,hi`
    pub ylim: Option<String>,

    /// Colour overrides, `substring=#rrggbb`
    pub colours: Vec<String>,

    /// Line-style overrides, `substring=solid|dashed`
    pub lines: Vec<String>,

    /// Output filename suffix
    pub suffix: String,

    /// Also write a pgfplots .tex export
    pub tikz: bool,

    /// Output directory
    pub out_dir: PathBuf,
}

impl Default for PlotArgs {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: None,
            entity: crate::utils::config::DEFAULT_ENTITY.to_string(),
            project: String::new(),
            metric: String::new(),
            x_key: DEFAULT_X_KEY.to_string(),
            samples: DEFAULT_SAMPLES,
            smoothing: 0.0,
            minmax: false,
            filters: Vec::new(),
            group_by: None,
            title: None,
            xlabel: None,
            ylabel: None,
            legend: "best".to_string(),
            sort: None,
            log_y: false,
            ylim: None,
            colours: Vec::new(),
            lines: Vec::new(),
            suffix: String::new(),
            tikz: false,
            out_dir: PathBuf::from("."),
        }
    }
}

/// Validate plot arguments before doing any network work
///
/// **Public** - called from main.rs before execute_plot
pub fn validate_args(args: &PlotArgs) -> Result<()> {
    if args.project.is_empty() {
        bail!("Project must not be empty");
    }
    if args.metric.is_empty() {
        bail!("Metric must not be empty");
    }
    if args.samples == 0 {
        bail!("Samples must be at least 1");
    }
    if !args.smoothing.is_finite() || args.smoothing < 0.0 {
        bail!("Smoothing must be a non-negative number");
    }
    if let Some(ylim) = &args.ylim {
        let (lo, hi) = parse_ylim(ylim)?;
        if lo >= hi {
            bail!("ylim lower bound must be below the upper bound");
        }
    }
    Ok(())
}

/// Execute the plot command
///
/// **Public** - main entry point called from main.rs
pub fn execute_plot(args: PlotArgs) -> Result<()> {
    let request = build_request(&args)?;

    let plotter = Plotter::new(
        &args.base_url,
        args.api_key.clone(),
        &args.entity,
        &args.project,
    )?;

    let written = plotter.plot_full(&request)?;
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Translate CLI arguments into a pipeline request
fn build_request(args: &PlotArgs) -> Result<PlotRequest> {
    let mut overrides = StyleOverrides::default();
    for spec in &args.colours {
        let (key, value) = parse_key_value(spec)?;
        overrides.colours.insert(key, value);
    }
    for spec in &args.lines {
        let (key, value) = parse_key_value(spec)?;
        overrides.lines.insert(key, parse_line_kind(&value)?);
    }

    let options = PlotOptions {
        title: args.title.clone(),
        xlabel: Some(args.xlabel.clone().unwrap_or_else(|| "Step".to_string())),
        ylabel: Some(args.ylabel.clone().unwrap_or_else(|| args.metric.clone())),
        legend: parse_legend(&args.legend)?,
        sort: args.sort.as_deref().map(parse_sort).unwrap_or_default(),
        overrides,
        log_y: args.log_y,
        y_limits: args.ylim.as_deref().map(parse_ylim).transpose()?,
        ..PlotOptions::default()
    };

    let mut filters = FilterConfig::new();
    for spec in &args.filters {
        let (key, value) = parse_key_value(spec)?;
        filters.push((key, FilterValue::Literal(parse_scalar(&value))));
    }

    Ok(PlotRequest {
        metric: args.metric.clone(),
        x_key: args.x_key.clone(),
        samples: args.samples,
        smoothing: args.smoothing,
        minmax: args.minmax,
        filters,
        group_key: args.group_by.clone(),
        options,
        suffix: args.suffix.clone(),
        tikz: args.tikz,
        out_dir: args.out_dir.clone(),
    })
}

/// Split a `key=value` specification
fn parse_key_value(spec: &str) -> Result<(String, String)> {
    spec.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .with_context(|| format!("Expected key=value, got '{}'", spec))
}

/// Parse a filter value as the narrowest JSON scalar it fits
fn parse_scalar(value: &str) -> Value {
    if let Ok(n) = value.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = value.parse::<f64>() {
        return Value::from(f);
    }
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_string()),
    }
}

fn parse_line_kind(value: &str) -> Result<LineKind> {
    match value {
        "solid" => Ok(LineKind::Solid),
        "dashed" => Ok(LineKind::Dashed),
        other => bail!("Unknown line style '{}' (expected solid or dashed)", other),
    }
}

fn parse_legend(value: &str) -> Result<Option<LegendPos>> {
    let pos = match value {
        "off" | "none" => return Ok(None),
        "best" => LegendPos::Best,
        "upper left" => LegendPos::UpperLeft,
        "upper right" => LegendPos::UpperRight,
        "upper center" => LegendPos::UpperCenter,
        "lower left" => LegendPos::LowerLeft,
        "lower right" => LegendPos::LowerRight,
        "lower center" => LegendPos::LowerCenter,
        other => bail!("Unknown legend position '{}'", other),
    };
    Ok(Some(pos))
}

/// Parse a sort policy; unrecognized keywords become an explicit name list
fn parse_sort(value: &str) -> SortOrder {
    match value {
        "natural" => SortOrder::Natural,
        "value" => SortOrder::FinalValue,
        "value-desc" => SortOrder::FinalValueDesc,
        list => SortOrder::Given(list.split(',').map(|s| s.trim().to_string()).collect()),
    }
}

fn parse_ylim(value: &str) -> Result<(f64, f64)> {
    let (lo, hi) = value
        .split_once(',')
        .with_context(|| format!("Expected lo,hi ylim, got '{}'", value))?;
    Ok((
        lo.trim().parse().with_context(|| format!("Bad ylim lower bound '{}'", lo))?,
        hi.trim().parse().with_context(|| format!("Bad ylim upper bound '{}'", hi))?,
    ))
}
