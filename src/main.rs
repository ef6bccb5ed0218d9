//! trackplot CLI
//!
//! Fetches grouped experiment-run metrics from a tracking service and
//! renders mean/envelope charts.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use trackplot::commands::{execute_plot, execute_runs, validate_args, PlotArgs};
use trackplot::utils::config::{DEFAULT_ENTITY, DEFAULT_SAMPLES, DEFAULT_X_KEY};

/// trackplot - grouped envelope plots for experiment runs
#[derive(Parser, Debug)]
#[command(name = "trackplot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, aggregate and plot one metric across grouped runs
    Plot {
        /// Tracking-service base URL
        #[arg(long, default_value = "http://localhost:8080", env = "TRACKPLOT_URL")]
        base_url: String,

        /// API key for the tracking service
        #[arg(long, env = "TRACKPLOT_API_KEY")]
        api_key: Option<String>,

        /// Project owner
        #[arg(short, long, default_value = DEFAULT_ENTITY)]
        entity: String,

        /// Project to plot
        #[arg(short, long)]
        project: String,

        /// Metric key to fetch
        #[arg(short, long)]
        metric: String,

        /// History index key
        #[arg(long, default_value = DEFAULT_X_KEY)]
        x_key: String,

        /// Maximum history rows per run
        #[arg(long, default_value_t = DEFAULT_SAMPLES)]
        samples: usize,

        /// Smoothing factor (0 disables smoothing)
        #[arg(long, default_value_t = 0.0)]
        smoothing: f64,

        /// Use min/max envelope instead of mean±std
        #[arg(long)]
        minmax: bool,

        /// Literal filter clause, key=value (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// Attribute key to group by (default: experiment group)
        #[arg(long)]
        group_by: Option<String>,

        /// Chart title
        #[arg(long)]
        title: Option<String>,

        /// x-axis label
        #[arg(long)]
        xlabel: Option<String>,

        /// y-axis label (defaults to the metric name)
        #[arg(long)]
        ylabel: Option<String>,

        /// Legend position (best, upper left, ..., lower center) or "off"
        #[arg(long, default_value = "best")]
        legend: String,

        /// Sort order: natural | value | value-desc | comma-separated names
        #[arg(long)]
        sort: Option<String>,

        /// Log-scale y axis
        #[arg(long)]
        log_y: bool,

        /// y-axis limits, lo,hi
        #[arg(long)]
        ylim: Option<String>,

        /// Colour override, substring=#rrggbb (repeatable)
        #[arg(long = "colour")]
        colours: Vec<String>,

        /// Line-style override, substring=solid|dashed (repeatable)
        #[arg(long = "line")]
        lines: Vec<String>,

        /// Output filename suffix
        #[arg(long, default_value = "")]
        suffix: String,

        /// Also write a pgfplots .tex export
        #[arg(long)]
        tikz: bool,

        /// Output directory
        #[arg(short, long = "out", default_value = ".")]
        out_dir: PathBuf,
    },

    /// List a project's runs (name, group, state)
    Runs {
        /// Tracking-service base URL
        #[arg(long, default_value = "http://localhost:8080", env = "TRACKPLOT_URL")]
        base_url: String,

        /// API key for the tracking service
        #[arg(long, env = "TRACKPLOT_API_KEY")]
        api_key: Option<String>,

        /// Project owner
        #[arg(short, long, default_value = DEFAULT_ENTITY)]
        entity: String,

        /// Project to list
        #[arg(short, long)]
        project: String,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Plot {
            base_url,
            api_key,
            entity,
            project,
            metric,
            x_key,
            samples,
            smoothing,
            minmax,
            filters,
            group_by,
            title,
            xlabel,
            ylabel,
            legend,
            sort,
            log_y,
            ylim,
            colours,
            lines,
            suffix,
            tikz,
            out_dir,
        } => {
            let args = PlotArgs {
                base_url,
                api_key,
                entity,
                project,
                metric,
                x_key,
                samples,
                smoothing,
                minmax,
                filters,
                group_by,
                title,
                xlabel,
                ylabel,
                legend,
                sort,
                log_y,
                ylim,
                colours,
                lines,
                suffix,
                tikz,
                out_dir,
            };

            // Validate args first
            validate_args(&args)?;

            // Execute plot
            execute_plot(args)?;
        }

        Commands::Runs {
            base_url,
            api_key,
            entity,
            project,
        } => {
            execute_runs(&base_url, api_key, &entity, &project)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("trackplot v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Grouped envelope plots for experiment-run metrics.");
}
