pub mod metrics;
pub mod parsing;
pub mod plot;
pub mod report;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use metrics::DEFAULT_BASELINE_ROWS;
use parsing::{feedback, InputMode};
use plot::{ChartOptions, ChartPaths};
use report::{Comparison, Summary};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Compute audition feedback metrics from feedback_dataset.csv", long_about = None)]
struct Args {
    /// Path to feedback_dataset.csv
    #[arg(long, default_value_os_t = default_csv_path())]
    csv: PathBuf,

    /// Output directory for charts
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Skip chart generation
    #[arg(long)]
    no_charts: bool,

    /// Only analyze rows whose configFlags equal this value (e.g. "baseline", "audio")
    #[arg(long, default_value = None)]
    config: Option<String>,

    /// Compare two configs side by side instead of printing the summary
    #[arg(long, num_args = 2, value_names = ["CONFIG1", "CONFIG2"])]
    compare: Option<Vec<String>>,

    /// Which MLP predictions to analyze
    #[arg(long, value_enum, default_value_t = InputMode::Both)]
    input_mode: InputMode,

    /// Window of the rolling prediction error and like rate
    #[arg(long, default_value_t = 10)]
    error_window: usize,

    /// Window of the rolling pairwise agreement
    #[arg(long, default_value_t = 50)]
    pairwise_window: usize,

    /// Rows in each half of the baseline comparison
    #[arg(long, default_value_t = DEFAULT_BASELINE_ROWS)]
    baseline: usize,

    /// Also write the summary as JSON to this path
    #[arg(long, default_value = None)]
    json_path: Option<PathBuf>,

    /// Debug logging
    #[arg(long)]
    debug: bool,
}

/// Where the plugin writes its feedback log
fn default_csv_path() -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    home.join("Library/Application Support/PresetPreferenceGenerator/feedback_dataset.csv")
}

fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };

    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .write_style(env_logger::WriteStyle::Never)
    .target(env_logger::Target::Stderr)
    .init();
}

fn run(args: Args) -> Result<()> {
    if args.error_window == 0 || args.pairwise_window == 0 {
        bail!("--error-window and --pairwise-window must be >= 1");
    }
    if args.baseline == 0 {
        bail!("--baseline must be >= 1");
    }

    log::info!("Loading data from: {}", args.csv.display());
    let dataset = feedback::load_dataset(&args.csv)
        .with_context(|| format!("failed to load {}", args.csv.display()))?;

    let columns = args.input_mode.select(&dataset.prediction_columns());
    if columns.is_empty() {
        log::warn!(
            "no prediction columns match input mode {:?}, reporting ratings only",
            args.input_mode
        );
    }

    if let Some(tags) = &args.compare {
        let comparison = Comparison::compute(&dataset, &tags[0], &tags[1], &columns)
            .ok_or_else(|| anyhow!("configFlags column not found. Cannot compare configs."))?;
        print!("{}", comparison);
        return Ok(());
    }

    let dataset = match args.config.as_deref() {
        Some(tag) => match dataset.filter_config(tag) {
            Some(filtered) => {
                log::info!("Filtered to config: {} ({} samples)", tag, filtered.len());
                filtered
            }
            None => {
                log::warn!("configFlags column not found. Showing all data.");
                dataset
            }
        },
        None => dataset,
    };

    let summary = Summary::compute(&dataset, &columns, args.baseline);
    print!("{}", summary);

    if let Some(json_path) = &args.json_path {
        report::write_summary_json(json_path, &summary)
            .with_context(|| format!("failed to write {}", json_path.display()))?;
        log::info!("Summary written to {}", json_path.display());
    }

    if args.no_charts {
        return Ok(());
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;
    let paths = ChartPaths::new(&args.output, args.config.as_deref());
    let options = ChartOptions {
        error_window: args.error_window,
        pairwise_window: args.pairwise_window,
    };
    let written = plot::render_charts(&dataset, &columns, &paths, options)
        .map_err(|e| anyhow!("failed to render charts: {}", e))?;

    println!("\nCharts saved to:");
    for path in written {
        println!("  {}", path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    run(args)
}
