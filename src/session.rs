//! Per-project plotting session.
//!
//! A `Plotter` binds one tracking-service project: it fetches the run list
//! once at construction and then drives the pipeline -- group, fetch+align,
//! bounds, smooth, render -- either step by step or in one `plot_full`
//! call. A session owns its run list exclusively and is meant for
//! single-threaded scripting use.

use crate::api::{Client, Run, RunSeries};
use crate::frame::Frame;
use crate::output::{output_path, output_stem, write_tikz};
use crate::pipeline::group::{attr_label, default_name_func, AttrMap, FilterConfig};
use crate::pipeline::bounds::MEAN;
use crate::pipeline::{align, bounds_all, group_runs, smooth_all};
use crate::render::chart::GroupSeries;
use crate::render::sort::sorted_names;
use crate::render::{render_chart, PlotOptions};
use crate::utils::config::{DEFAULT_SAMPLES, DEFAULT_X_KEY};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info};
use std::path::PathBuf;

/// Everything `plot_full` needs for one chart
pub struct PlotRequest {
    /// Metric key to fetch and plot
    pub metric: String,
    /// History index key (typically `_step`)
    pub x_key: String,
    /// Maximum history rows per run
    pub samples: usize,
    /// Smoothing factor; 0 disables smoothing
    pub smoothing: f64,
    /// Min/max envelope instead of mean±std
    pub minmax: bool,
    /// Filter clauses; all must pass for a run to be plotted
    pub filters: FilterConfig,
    /// Attribute key to group by; None uses the experiment-group attribute
    pub group_key: Option<String>,
    /// Display configuration
    pub options: PlotOptions,
    /// Optional filename suffix
    pub suffix: String,
    /// Also write a pgfplots .tex export
    pub tikz: bool,
    /// Directory for the exported files
    pub out_dir: PathBuf,
}

impl Default for PlotRequest {
    fn default() -> Self {
        Self {
            metric: String::new(),
            x_key: DEFAULT_X_KEY.to_string(),
            samples: DEFAULT_SAMPLES,
            smoothing: 0.0,
            minmax: false,
            filters: FilterConfig::new(),
            group_key: None,
            options: PlotOptions::default(),
            suffix: String::new(),
            tikz: false,
            out_dir: PathBuf::from("."),
        }
    }
}

/// Plotting session bound to one project
pub struct Plotter {
    client: Client,
    entity: String,
    project: String,
    runs: Vec<Run>,
}

impl Plotter {
    /// Connect and fetch the project's run list
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        entity: &str,
        project: &str,
    ) -> Result<Self> {
        let client = Client::new(base_url, api_key).context("Failed to build API client")?;
        let runs = client
            .fetch_runs(entity, project)
            .with_context(|| format!("Failed to fetch runs for {}/{}", entity, project))?;

        Ok(Self {
            client,
            entity: entity.to_string(),
            project: project.to_string(),
            runs,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Rebind the session to another project and refetch its runs
    pub fn update_project(&mut self, project: &str) -> Result<()> {
        self.runs = self
            .client
            .fetch_runs(&self.entity, project)
            .with_context(|| format!("Failed to fetch runs for {}/{}", self.entity, project))?;
        self.project = project.to_string();
        Ok(())
    }

    /// Partition the fetched runs into named groups
    pub fn group_runs<'a>(
        &'a self,
        name_func: &dyn Fn(&AttrMap) -> String,
        filter_config: &FilterConfig,
    ) -> Result<IndexMap<String, Vec<&'a Run>>> {
        Ok(group_runs(&self.runs, name_func, filter_config)?)
    }

    /// Fetch and align one metric for every group
    pub fn fetch_data(
        &self,
        groups: &IndexMap<String, Vec<&Run>>,
        metric: &str,
        x_key: &str,
        samples: usize,
    ) -> Result<IndexMap<String, Frame>> {
        let mut frames = IndexMap::new();
        for (name, members) in groups {
            debug!("Fetching '{}' for group '{}' ({} runs)", metric, name, members.len());
            let series: Vec<RunSeries> = members
                .iter()
                .map(|run| {
                    Ok(RunSeries {
                        name: run.name.clone(),
                        samples: self.client.fetch_history(
                            &self.entity,
                            &self.project,
                            &run.name,
                            metric,
                            x_key,
                            samples,
                        )?,
                    })
                })
                .collect::<Result<_>>()?;

            let frame = align(&series, x_key)
                .with_context(|| format!("Failed to align group '{}'", name))?;
            frames.insert(name.clone(), frame);
        }
        Ok(frames)
    }

    /// Collapse every group's aligned frame to a {low, mean, high} envelope
    pub fn bounds(
        &self,
        groups: &IndexMap<String, Frame>,
        use_minmax: bool,
    ) -> Result<IndexMap<String, Frame>> {
        Ok(bounds_all(groups, use_minmax)?)
    }

    /// Smooth every group's envelope
    pub fn smooth(
        &self,
        groups: &IndexMap<String, Frame>,
        smoothing: f64,
    ) -> IndexMap<String, Frame> {
        smooth_all(groups, smoothing)
    }

    /// Run the whole pipeline and export the chart.
    ///
    /// Returns the paths written, SVG first.
    pub fn plot_full(&self, request: &PlotRequest) -> Result<Vec<PathBuf>> {
        info!(
            "Plotting '{}' for project '{}'",
            request.metric, self.project
        );

        // Step 1: group
        info!("Step 1/5: Grouping {} runs...", self.runs.len());
        let name_func: Box<dyn Fn(&AttrMap) -> String> = match &request.group_key {
            Some(key) => {
                let key = key.clone();
                Box::new(move |attrs: &AttrMap| {
                    attrs.get(&key).map(attr_label).unwrap_or_else(|| "unknown".to_string())
                })
            }
            None => Box::new(default_name_func),
        };
        let groups = self.group_runs(&*name_func, &request.filters)?;

        // Step 2: fetch + align
        info!("Step 2/5: Fetching '{}' for {} groups...", request.metric, groups.len());
        let data = self.fetch_data(&groups, &request.metric, &request.x_key, request.samples)?;

        // Step 3: bounds
        info!("Step 3/5: Computing envelopes...");
        let enveloped = bounds_all(&data, request.minmax)?;

        // Step 4: smooth
        info!("Step 4/5: Smoothing (factor {})...", request.smoothing);
        let smoothed = smooth_all(&enveloped, request.smoothing);

        // Step 5: render + export
        info!("Step 5/5: Rendering...");
        let stem = output_stem(&self.project, &request.metric, &request.suffix);
        let svg_path = output_path(&request.out_dir, &stem, "svg");

        let series: IndexMap<String, GroupSeries> = smoothed
            .iter()
            .map(|(name, frame)| (name.clone(), GroupSeries::Bounds(frame.clone())))
            .collect();
        render_chart(series, &request.options, &svg_path)
            .context("Failed to render chart")?;

        let mut written = vec![svg_path];
        if request.tikz {
            let tex_path = output_path(&request.out_dir, &stem, "tex");
            // Same draw order as the chart, so colours agree across exports
            let entries: Vec<(String, Option<f64>)> = smoothed
                .iter()
                .map(|(name, frame)| {
                    (name.clone(), frame.last_value(MEAN).map(|(_, v)| v))
                })
                .collect();
            let ordered: Vec<(String, Frame)> =
                sorted_names(&entries, &request.options.sort)
                    .into_iter()
                    .filter_map(|name| smoothed.get(&name).cloned().map(|f| (name, f)))
                    .collect();
            write_tikz(&ordered, &request.options, &tex_path)
                .context("Failed to write pgfplots export")?;
            written.push(tex_path);
        }

        info!("Wrote {} file(s)", written.len());
        Ok(written)
    }
}
