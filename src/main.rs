//! fs-walker - Parallel Directory Tree Walker
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use fs_walker::config::{CliArgs, WalkConfig};
use fs_walker::fs::LocalFs;
use fs_walker::progress::{print_header, print_report, print_summary, ProgressReporter};
use fs_walker::walker::WalkEngine;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Usage errors exit with 1, help and version with 0
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<()> {
    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = WalkConfig::from_args(args).context("Invalid configuration")?;
    let show_progress = config.show_progress;
    let verbose = config.verbose;

    if show_progress {
        print_header(&config.root.display().to_string(), config.worker_count);
    }

    let engine = WalkEngine::new(config, Arc::new(LocalFs::new()));

    // Setup signal handler for graceful shutdown
    let cancel = engine.cancel_handle();
    ctrlc::set_handler(move || {
        if cancel.cancel() {
            eprintln!("\nInterrupt received, shutting down...");
        }
    })
    .context("Failed to set signal handler")?;

    // Run the walk
    let result = if show_progress {
        let reporter = ProgressReporter::new();
        reporter.set_status("Walking...");

        let updater = reporter.clone();
        let result = engine.run_with_progress(move |progress| updater.update(&progress));

        reporter.finish_and_clear();
        result
    } else {
        engine.run()
    }
    .context("Walk failed")?;

    print_report(&result.stats).context("Failed to write report")?;

    if show_progress || verbose {
        print_summary(&result);
    }

    if !result.completed {
        info!("Walk was interrupted before completion");
    }

    if result.stats.errors > 0 {
        info!(errors = result.stats.errors, "Walk completed with errors");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "fs_walker=debug,warn"
    } else {
        "fs_walker=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
