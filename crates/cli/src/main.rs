// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! labcap - crash-resistant capture buffers and startup recovery

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{capture, inspect, list, recover};
use config::{FileConfig, Overrides, Settings};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser)]
#[command(
    name = "labcap",
    version,
    about = "Crash-resistant session buffers for lab instrument capture"
)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "LABCAP_CONFIG")]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Directory holding session buffers
    #[arg(long, global = true)]
    buffer_dir: Option<PathBuf>,

    /// Directory of the JSON durable store
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Records between forced flushes
    #[arg(long, global = true)]
    flush_threshold: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay orphaned buffers into the store
    Recover(recover::RecoverArgs),
    /// Show what a buffer file contains
    Inspect(inspect::InspectArgs),
    /// List buffer files and their state
    List(list::ListArgs),
    /// Write a synthetic capture session
    Capture(capture::CaptureArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match setup_logging(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let overrides = Overrides {
        buffer_dir: cli.buffer_dir,
        store_dir: cli.store_dir,
        flush_threshold: cli.flush_threshold,
    };

    // inspect works on a single file and needs no directories
    if let Commands::Inspect(args) = cli.command {
        inspect::handle(args)?;
        return Ok(ExitCode::SUCCESS);
    }

    let settings = Settings::resolve(file, overrides, config::state_dir)?;
    tracing::debug!(
        buffer_dir = %settings.buffer.dir.display(),
        store_dir = %settings.store_dir.display(),
        flush_threshold = settings.buffer.flush_threshold,
        "resolved settings"
    );

    match cli.command {
        Commands::Recover(args) => recover::handle(args, &settings).await,
        Commands::List(args) => {
            list::handle(args, &settings)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Capture(args) => {
            capture::handle(args, &settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Inspect(_) => Ok(ExitCode::SUCCESS),
    }
}

/// Stderr logging filtered by `RUST_LOG`, plus an optional log file
///
/// The returned guard flushes the file writer on drop and must outlive the
/// command.
fn setup_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr = fmt::layer().with_writer(std::io::stderr);

    let Some(path) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr)
            .init();
        return Ok(None);
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let name = path
        .file_name()
        .with_context(|| format!("log file has no name: {}", path.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();
    Ok(Some(guard))
}
