use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use loan_recon::{spawn_run, ReconConfig};
use shared_types::{LoanFileInput, RunEvent, RunRequest};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EventFormat {
    /// Human readable lines
    Text,
    /// One JSON event per line
    Json,
}

/// Reconcile loan servicing extracts into the monthly loan and billing reports
#[derive(Parser, Debug)]
#[command(name = "loan-recon", author, version, about, long_about = None)]
struct Args {
    /// Deal to loan mapping workbook
    #[arg(long, value_name = "PATH")]
    mapping: Option<PathBuf>,

    /// Loan extract as "<Sheet Type>=PATH", e.g. "EMI=./emi.xlsx" (repeatable)
    #[arg(long = "loan-file", value_name = "TYPE=PATH", value_parser = parse_loan_file)]
    loan_files: Vec<LoanFileInput>,

    /// Billing extract workbook
    #[arg(long, value_name = "PATH")]
    billing: Option<PathBuf>,

    /// Collection month
    #[arg(long, value_name = "YYYY-MM")]
    month: String,

    /// Day of the following month the payout falls on
    #[arg(long, default_value_t = 1)]
    payout_day: u32,

    /// Output directory (default: settings file, then ./output)
    #[arg(long, value_name = "PATH")]
    output_dir: Option<PathBuf>,

    /// How run events are printed
    #[arg(long, value_enum, default_value_t = EventFormat::Text)]
    events: EventFormat,

    /// Settings file (default: <config dir>/loan-recon/recon.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long)]
    log_file_path: Option<String>,
}

fn parse_loan_file(value: &str) -> Result<LoanFileInput, String> {
    let (sheet_type, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected \"<Sheet Type>=PATH\", got \"{value}\""))?;
    if sheet_type.trim().is_empty() || path.trim().is_empty() {
        return Err(format!("expected \"<Sheet Type>=PATH\", got \"{value}\""));
    }
    Ok(LoanFileInput {
        file_path: PathBuf::from(path.trim()),
        sheet_type: sheet_type.trim().to_string(),
    })
}

fn init_tracing(log_file_path: Option<&str>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout carries run events, so logs go to stderr
    if let Some(log_path) = log_file_path {
        let log_path = std::path::Path::new(log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("loan-recon.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        None
    }
}

fn print_event(event: &RunEvent, format: EventFormat) -> Result<()> {
    match format {
        EventFormat::Json => println!("{}", serde_json::to_string(event)?),
        EventFormat::Text => match event {
            RunEvent::Log { message } => println!("{message}"),
            RunEvent::Progress { value, status } => {
                println!("[{value:>3}%] {}", status.as_deref().unwrap_or(""))
            }
        },
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let _guard = init_tracing(args.log_file_path.as_deref());

    let (config, config_path) = ReconConfig::load(args.config.as_deref())
        .with_context(|| "Failed to load settings")?;
    tracing::debug!("Settings loaded from {:?}", config_path);

    let output_dir = args
        .output_dir
        .or_else(|| config.output_directory().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("output"));

    let request = RunRequest {
        mapping_path: args.mapping,
        loan_files: args.loan_files,
        billing_path: args.billing,
        collection_month: args.month,
        payout_day: args.payout_day,
        output_dir,
    };

    let (mut receiver, handle) = spawn_run(request, config.run_settings());
    while let Some(event) = receiver.recv().await {
        print_event(&event, args.events)?;
    }
    let result = handle.await.context("Run task panicked")?;

    if args.events == EventFormat::Json {
        println!("{}", serde_json::to_string(&result)?);
    }

    if result.success {
        if let Some(archive) = &result.archive {
            tracing::info!("Final report: {}", archive.display());
        }
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "Error: {}",
            result.error.as_deref().unwrap_or("reconciliation failed")
        );
        Ok(ExitCode::FAILURE)
    }
}
