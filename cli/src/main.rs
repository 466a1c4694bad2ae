use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use health_core::Thresholds;
use health_report::{analyze_file, save_report, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "health-analyze",
    version,
    about = "Summarize health sensor readings into a text report."
)]
struct Args {
    /// Delimited file with a header line and eight columns per row.
    #[arg(short, long, default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,

    /// Report destination. The parent directory must already exist.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Print the summary as JSON once the report is saved.
    #[arg(long)]
    json: bool,

    /// Log verbosity; `RUST_LOG` takes precedence when set.
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

fn init_logging(level: LogLevel) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::from(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    let outcome = analyze_file(&args.input, &Thresholds::default())
        .with_context(|| format!("Failed to analyse {}", args.input.display()))?;

    if let Some(span) = outcome.summary.time_span {
        tracing::info!(first = %span.first, last = %span.last, "readings time span");
    }

    println!("{}", outcome.report);

    save_report(&outcome.report, &args.output)
        .with_context(|| format!("Failed to save report to {}", args.output.display()))?;

    println!("Report saved to {}", args.output.display());

    if args.json {
        let json = serde_json::to_string_pretty(&outcome.summary)
            .context("Failed to serialize analysis summary")?;
        println!("{json}");
    }

    Ok(())
}
