// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command output rendering
//!
//! Every report is both `Display` (operator text) and `Serialize` (`--format json`).

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render a single report
pub fn render<T: Serialize + Display>(report: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(report).context("encoding report"),
    }
}

/// Render rows, one per line in text mode; `empty` stands in for no rows
pub fn render_rows<T: Serialize + Display>(
    rows: &[T],
    format: OutputFormat,
    empty: &str,
) -> Result<String> {
    match format {
        OutputFormat::Text if rows.is_empty() => Ok(empty.to_string()),
        OutputFormat::Text => Ok(rows
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(rows).context("encoding rows"),
    }
}

pub fn print<T: Serialize + Display>(report: &T, format: OutputFormat) -> Result<()> {
    println!("{}", render(report, format)?);
    Ok(())
}

pub fn print_rows<T: Serialize + Display>(
    rows: &[T],
    format: OutputFormat,
    empty: &str,
) -> Result<()> {
    println!("{}", render_rows(rows, format, empty)?);
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
