// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inspect a single buffer file without touching it

use super::describe;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use labcap_recovery::classify;
use labcap_storage::BufferReader;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct InspectArgs {
    /// Buffer file to inspect
    file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct LineError {
    line: u64,
    error: String,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    path: PathBuf,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    session_id: Option<u64>,
    lines: u64,
    measurements: u64,
    audit_events: u64,
    metadata_updates: u64,
    torn_tail: bool,
    parse_errors: Vec<LineError>,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Buffer: {}", self.path.display())?;
        write!(f, "  Status: {}", self.status)?;
        if let Some(reason) = &self.reason {
            write!(f, " ({})", reason)?;
        }
        writeln!(f)?;
        if let Some(id) = self.session_id {
            writeln!(f, "  Session: {}", id)?;
        }
        writeln!(f, "  Lines: {}", self.lines)?;
        writeln!(f, "  Measurements: {}", self.measurements)?;
        writeln!(f, "  Audit events: {}", self.audit_events)?;
        write!(f, "  Metadata updates: {}", self.metadata_updates)?;
        if self.torn_tail {
            write!(f, "\n  Last line is incomplete")?;
        }
        if !self.parse_errors.is_empty() {
            write!(f, "\n  Parse errors:")?;
            for e in &self.parse_errors {
                write!(f, "\n    line {}: {}", e.line, e.error)?;
            }
        }
        Ok(())
    }
}

pub fn handle(args: InspectArgs) -> Result<()> {
    let classification =
        classify(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let validation = BufferReader::open(&args.file)
        .and_then(|reader| reader.validate())
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    let (status, reason) = describe(&classification);
    let report = InspectReport {
        path: args.file,
        status,
        reason,
        session_id: validation.session_id().map(|id| id.get()),
        lines: validation.lines,
        measurements: validation.measurements,
        audit_events: validation.audit_events,
        metadata_updates: validation.metadata_updates,
        torn_tail: validation.torn_tail,
        parse_errors: validation
            .parse_errors
            .iter()
            .map(|(line, error)| LineError {
                line: *line,
                error: error.to_string(),
            })
            .collect(),
    };

    output::print(&report, args.format)?;
    Ok(())
}
