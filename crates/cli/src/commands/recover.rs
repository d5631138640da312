// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recover orphaned buffers into the durable store

use crate::config::Settings;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use labcap_adapters::{JsonStore, TracedStore};
use labcap_core::SystemClock;
use labcap_recovery::{RecoveryScanner, RecoverySummary};
use std::process::ExitCode;

#[derive(clap::Args)]
pub struct RecoverArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

pub async fn handle(args: RecoverArgs, settings: &Settings) -> Result<ExitCode> {
    let summary = run(settings).await?;
    output::print(&summary, args.format)?;

    Ok(if summary.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Startup recovery against the configured directories
pub async fn run(settings: &Settings) -> Result<RecoverySummary> {
    let store = JsonStore::open(&settings.store_dir)
        .with_context(|| format!("failed to open store {}", settings.store_dir.display()))?;
    let scanner = RecoveryScanner::new(SystemClock);
    let summary = scanner
        .run_at_startup(&settings.buffer.dir, &TracedStore::new(store))
        .await?;
    Ok(summary)
}
