//! CLI entry point for the tabular-data exploration pipeline.

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::Path;
use tabscope::{
    ChartRequest, ChartSpec, ExploreError, ImputeMethod, RegressionMetrics, Separator, Session,
    SessionConfig,
};
use tracing::{info, warn};

/// CLI-compatible imputation method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliImputeMethod {
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    Median,
    /// Use the most frequent value
    Mode,
}

impl From<CliImputeMethod> for ImputeMethod {
    fn from(cli: CliImputeMethod) -> Self {
        match cli {
            CliImputeMethod::Mean => ImputeMethod::Mean,
            CliImputeMethod::Median => ImputeMethod::Median,
            CliImputeMethod::Mode => ImputeMethod::Mode,
        }
    }
}

/// CLI-compatible chart kind enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliChartKind {
    /// Binned frequency plot of one column
    Histogram,
    /// Distribution summary of one numeric column
    Boxplot,
    /// Two-column scatter with automatic trend-line eligibility
    Scatter,
    /// Correlation heatmap over the numeric columns
    Heatmap,
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Interactive tabular-data exploration pipeline",
    long_about = "Loads a delimited or spreadsheet file, applies optional cleaning,\n\
                  and emits chart specifications and baseline regression metrics.\n\n\
                  EXAMPLES:\n  \
                  # Preview a file and its detected separator\n  \
                  tabscope -i data.csv\n\n  \
                  # Clean, then correlate\n  \
                  tabscope -i data.csv --impute median --remove-outliers --chart heatmap\n\n  \
                  # Fit a baseline model\n  \
                  tabscope -i data.csv --target price\n\n  \
                  # Machine-readable report\n  \
                  tabscope -i data.csv --chart heatmap --target price --json | jq .metrics"
)]
struct Args {
    /// Path to the file to explore (.csv-like text or .xlsx)
    #[arg(short, long)]
    input: String,

    /// Impute missing values before anything else
    #[arg(long, value_enum)]
    impute: Option<CliImputeMethod>,

    /// Drop rows outside the IQR bounds of any numeric column
    #[arg(long)]
    remove_outliers: bool,

    /// Chart to build against the cleaned table
    #[arg(long, value_enum)]
    chart: Option<CliChartKind>,

    /// Column selection for histogram/boxplot charts
    #[arg(short, long)]
    column: Option<String>,

    /// X-axis column for scatter charts
    #[arg(short = 'x', long)]
    x: Option<String>,

    /// Y-axis column for scatter charts
    #[arg(short = 'y', long)]
    y: Option<String>,

    /// Numeric target column for baseline regression
    #[arg(short, long)]
    target: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Output a JSON report to stdout instead of human-readable text
    ///
    /// Disables all logging; only the report is written to stdout.
    /// Useful for piping to other tools: `... --json | jq .separator`
    #[arg(long)]
    json: bool,
}

/// Machine-readable report for `--json` mode.
#[derive(Serialize)]
struct Report {
    rows: usize,
    columns: Vec<String>,
    separator: Option<Separator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chart: Option<ChartSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<RegressionMetrics>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    advisories: Vec<ExploreError>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// stdout only contains the JSON report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let path = Path::new(&args.input);
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&args.input)
        .to_string();

    let config = {
        let mut builder = SessionConfig::builder().remove_outliers(args.remove_outliers);
        if let Some(method) = args.impute {
            builder = builder.impute(method.into());
        }
        builder.build()
    };

    info!("Loading {}", args.input);
    let raw = std::fs::read(path)?;
    let session = Session::from_upload(&raw, &filename, config)?;

    let chart_request = args.chart.map(|kind| chart_request(kind, &args)).transpose()?;

    let cleaned = session.cleaned()?;
    let mut report = Report {
        rows: cleaned.height(),
        columns: cleaned.column_names(),
        separator: session.separator(),
        chart: None,
        metrics: None,
        advisories: Vec::new(),
    };

    if let Some(request) = &chart_request {
        report.chart = Some(session.chart(request)?);
    }

    if let Some(target) = &args.target {
        match session.train(target) {
            Ok(result) => report.metrics = Some(result.metrics),
            Err(e) if e.is_advisory() => {
                warn!("Skipping regression: {}", e);
                report.advisories.push(e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&session, &report)?;
    }
    Ok(())
}

fn chart_request(kind: CliChartKind, args: &Args) -> Result<ChartRequest> {
    match kind {
        CliChartKind::Histogram => {
            let column = args
                .column
                .clone()
                .ok_or_else(|| anyhow!("--chart histogram requires --column"))?;
            Ok(ChartRequest::Histogram { column })
        }
        CliChartKind::Boxplot => {
            let column = args
                .column
                .clone()
                .ok_or_else(|| anyhow!("--chart boxplot requires --column"))?;
            Ok(ChartRequest::Boxplot { column })
        }
        CliChartKind::Scatter => {
            let x = args
                .x
                .clone()
                .ok_or_else(|| anyhow!("--chart scatter requires -x"))?;
            let y = args
                .y
                .clone()
                .ok_or_else(|| anyhow!("--chart scatter requires -y"))?;
            Ok(ChartRequest::Scatter { x, y })
        }
        CliChartKind::Heatmap => Ok(ChartRequest::Heatmap),
    }
}

/// Human-readable output. Uses `println!` intentionally: this is the
/// primary result, visible regardless of log level.
fn print_summary(session: &Session, report: &Report) -> Result<()> {
    match report.separator {
        Some(separator) => println!("Detected separator: {}", separator),
        None => println!("Spreadsheet source (no separator)"),
    }

    let cleaned = session.cleaned()?;
    println!(
        "Cleaned table: {} rows x {} columns",
        cleaned.height(),
        cleaned.width()
    );
    println!("{}", cleaned.dataframe().head(Some(5)));

    if let Some(chart) = &report.chart {
        println!("\nChart spec:");
        println!("{}", serde_json::to_string_pretty(chart)?);
    }

    if let Some(metrics) = &report.metrics {
        println!("\nRegression metrics (held-out 25%):");
        for (name, value) in metrics.to_map() {
            println!("  {:<5} {:.4}", name, value);
        }
    }

    for advisory in &report.advisories {
        println!("\nSkipped: {}", advisory);
    }
    Ok(())
}
