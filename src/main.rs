//! CLI entry point for the lunch overlap analyzer.
//!
//! Provides subcommands for analyzing an agent-state CSV for overlapping
//! Not-Ready periods and for listing the reason codes present in a file.

use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lunch_overlap::analyzers::analyzer::{AnalysisOptions, run_analysis};
use lunch_overlap::{
    config::{AnalysisConfig, DurationPolicy, parse_code_list},
    events::read_rows,
    intervals::IntervalBuilder,
    output::{RunRecord, append_record, format_duration, print_json, print_pretty, write_export_file},
    overlap::{Category, OverlapFilter, Strategy},
    stats::reason_code_counts,
};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "lunch_overlap")]
#[command(about = "Find overlapping Not-Ready periods between contact-center agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct SelectionArgs {
    /// JSON config file with selection codes and options
    #[arg(long)]
    config: Option<String>,

    /// Selection (lunch) reason code; repeat for several. Overrides LUNCH_CODES
    #[arg(short = 'c', long = "code")]
    codes: Vec<String>,

    /// Report overlaps even when neither side is flagged
    #[arg(long, default_value_t = false)]
    unfiltered: bool,

    /// Skip rows with a missing or malformed duration instead of treating it as zero
    #[arg(long, default_value_t = false)]
    strict_durations: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an agent-state CSV for overlapping Not-Ready periods
    Analyze {
        /// Agent-state CSV file
        #[arg(value_name = "FILE")]
        source: String,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Detection strategy
        #[arg(long, value_enum, default_value_t = Strategy::Sweep)]
        strategy: Strategy,

        /// Number of detection workers (more than 1 runs the parallel sweep)
        #[arg(short, long, default_value_t = 1)]
        workers: usize,

        /// CSV file to write the overlap export to
        #[arg(short, long, default_value = "overlaps.csv")]
        output: String,

        /// Optional: CSV file to append a run summary to
        #[arg(long)]
        history: Option<String>,

        /// Also log the aggregate views as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Only keep overlaps involving these agents
        #[arg(long = "agent")]
        agents: Vec<String>,

        /// Only keep overlaps of these categories
        #[arg(long = "category", value_enum)]
        categories: Vec<Category>,

        /// Minimum overlap duration in seconds
        #[arg(long, default_value_t = 0)]
        min_duration: i64,

        /// First date to keep (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last date to keep (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// List reason codes on Not-Ready rows, most frequent first
    ReasonCodes {
        /// Agent-state CSV file
        #[arg(value_name = "FILE")]
        source: String,

        #[command(flatten)]
        selection: SelectionArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/lunch_overlap.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("lunch_overlap.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            selection,
            strategy,
            workers,
            output,
            history,
            json,
            agents,
            categories,
            min_duration,
            from,
            to,
        } => {
            let config = load_config(&selection)?;
            let selection = config.validate()?;
            info!(
                codes = ?selection.codes(),
                mode = ?selection.mode(),
                policy = ?selection.duration_policy(),
                "Configuration loaded"
            );

            let options = AnalysisOptions {
                strategy,
                workers,
                filter: OverlapFilter {
                    agents,
                    categories,
                    min_duration_secs: min_duration,
                    date_from: from,
                    date_to: to,
                },
            };

            let rows = read_rows(File::open(&source)?)?;
            let analysis = run_analysis(&rows, &selection, &options).await?;

            if !analysis.skipped.is_empty() {
                warn!(skipped = analysis.skipped.len(), "Some rows were malformed and skipped");
            }

            let summary = analysis.views.summary();
            if summary.count() == 0 {
                info!("No overlapping periods found");
                for rc in &analysis.reason_codes {
                    info!(reason_code = %rc.reason_code, count = rc.count, "Reason code in data");
                }
            } else {
                info!(
                    overlaps = summary.count(),
                    total = %format_duration(summary.total_duration_secs()),
                    mean = %format_duration(summary.mean_duration_secs().round() as i64),
                    longest = %format_duration(summary.max_duration_secs()),
                    both_flagged = analysis.views.both_flagged().count(),
                    "Overlap summary"
                );
                if let Some(hour) = analysis.views.peak_both_flagged_hour() {
                    warn!("High risk period: {hour:02}:00-{hour:02}:59 has the most simultaneous flagged overlaps");
                }
                for pair in analysis.views.top_pairs() {
                    let (a, b) = pair.agents();
                    info!(agent_a = a, agent_b = b, incidents = pair.incidents(), "Frequent simultaneous pair");
                }
            }

            print_pretty(&analysis.views);
            if json {
                print_json(&analysis.views)?;
            }

            write_export_file(&output, &analysis.records)?;
            info!(output = %output, records = analysis.records.len(), "Overlap export written");

            if let Some(history) = history {
                let record = RunRecord::from_analysis(&source, &selection.codes(), &analysis);
                append_record(&history, &record)?;
            }
        }
        Commands::ReasonCodes { source, selection } => {
            let selection = load_config(&selection)?.validate()?;
            let rows = read_rows(File::open(&source)?)?;
            let set = IntervalBuilder::new(&selection).build(&rows);

            for rc in reason_code_counts(&set.intervals) {
                let flagged = selection.is_flagged(&rc.reason_code);
                info!(reason_code = %rc.reason_code, count = rc.count, flagged, "Reason code");
            }
        }
    }

    Ok(())
}

/// Layers configuration: file (or defaults), then `LUNCH_CODES`, then CLI flags.
fn load_config(args: &SelectionArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };

    if let Ok(codes) = std::env::var("LUNCH_CODES") {
        config = config.with_codes(parse_code_list(&codes));
    }
    config = config.with_codes(args.codes.clone());

    if args.unfiltered {
        config.require_flagged = false;
    }
    if args.strict_durations {
        config.duration_policy = DurationPolicy::Reject;
    }

    Ok(config)
}
