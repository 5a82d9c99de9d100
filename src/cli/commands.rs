//! Command implementation for the LDUSER converter CLI
//!
//! This module contains the run orchestration, progress reporting, and the
//! end-of-run summary.

use crate::app::services::conversion::{ConversionStats, convert_file};
use crate::app::services::record_transformer::RecordTransformer;
use crate::app::services::report_archive::ReportArchive;
use crate::app::services::sftp_transfer::{FileTransfer, SftpTransfer, TransferSummary};
use crate::cli::args::Args;
use crate::config::Config;
use crate::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub conversion: ConversionStats,
    /// Timestamped copy in the archive, if archiving is enabled
    pub archived: Option<PathBuf>,
    /// Upload result, if an upload was requested
    pub transfer: Option<TransferSummary>,
    pub elapsed: Duration,
}

/// Main command runner
///
/// 1. Set up logging
/// 2. Load the configuration file
/// 3. Convert, archive, and optionally upload
/// 4. Print a summary
pub fn run(args: Args) -> Result<RunSummary> {
    setup_logging(&args)?;

    info!("Starting Symphony LDUSER converter");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;
    let config_path = args.config_path()?;
    info!("Using config file: {}", config_path.display());
    let config = Config::load(&config_path)?;
    debug!("Loaded configuration: {:?}", config);

    let transformer = RecordTransformer::for_current_year(&config.data);

    let transfer = if args.sftp {
        Some(SftpTransfer::from_config(&config)?)
    } else {
        None
    };

    let summary = execute(
        &config,
        &transformer,
        transfer.as_ref().map(|t| t as &dyn FileTransfer),
        Local::now(),
        args.show_progress(),
    )?;

    if args.show_progress() {
        print_summary(&summary);
    }

    Ok(summary)
}

/// Convert, archive, and optionally upload with an already loaded configuration
pub fn execute(
    config: &Config,
    transformer: &RecordTransformer<'_>,
    transfer: Option<&dyn FileTransfer>,
    timestamp: DateTime<Local>,
    show_progress: bool,
) -> Result<RunSummary> {
    let start_time = Instant::now();

    info!(
        "Deriving missing graduation years from reference year {}",
        transformer.reference_year()
    );
    let conversion = convert_file(&config.input_path(), &config.output_path(), transformer)?;

    let archived = ReportArchive::from_config(config).store(&conversion.output, &timestamp)?;

    let transfer = match transfer {
        Some(client) => Some(upload_with_progress(client, &conversion, show_progress)?),
        None => None,
    };

    Ok(RunSummary {
        conversion,
        archived,
        transfer,
        elapsed: start_time.elapsed(),
    })
}

fn upload_with_progress(
    client: &dyn FileTransfer,
    conversion: &ConversionStats,
    show_progress: bool,
) -> Result<TransferSummary> {
    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Uploading {}", conversion.output.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = client.upload(&conversion.output);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result
}

/// Initialize tracing to stderr
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("symphony_lduser={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Format a byte count in human-readable form
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

fn print_summary(summary: &RunSummary) {
    let stats = &summary.conversion;

    println!("{}", "LDUSER conversion complete".bright_green().bold());
    println!(
        "  {} {} users",
        "Records:".bright_white(),
        stats.records_written.to_string().bright_yellow()
    );
    println!(
        "  {} {} ({})",
        "Output: ".bright_white(),
        stats.output.display().to_string().bright_cyan(),
        format_size(stats.bytes_written)
    );
    if let Some(archived) = &summary.archived {
        println!(
            "  {} {}",
            "Archive:".bright_white(),
            archived.display().to_string().bright_black()
        );
    }
    if let Some(transfer) = &summary.transfer {
        println!(
            "  {} {} ({})",
            "Upload: ".bright_white(),
            transfer.remote_path.display().to_string().bright_cyan(),
            format_size(transfer.bytes)
        );
    }
    println!(
        "  {} {}",
        "Elapsed:".bright_white(),
        HumanDuration(summary.elapsed)
    );
}
