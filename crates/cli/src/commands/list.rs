// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! List buffer files awaiting recovery

use super::describe;
use crate::config::Settings;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use labcap_recovery::{classify, scan};
use labcap_storage::session_id_of;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(clap::Args)]
pub struct ListArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct BufferEntry {
    session_id: Option<u64>,
    status: &'static str,
    path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl fmt::Display for BufferEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self
            .session_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        write!(f, "{:<12} {:<9} {}", session, self.status, self.path.display())?;
        if let Some(reason) = &self.reason {
            write!(f, "  ({})", reason)?;
        }
        Ok(())
    }
}

pub fn handle(args: ListArgs, settings: &Settings) -> Result<()> {
    let mut entries = Vec::new();
    for path in scan(&settings.buffer.dir)? {
        let (status, reason) = match classify(&path) {
            Ok(classification) => describe(&classification),
            Err(e) => ("unreadable", Some(e.to_string())),
        };
        entries.push(BufferEntry {
            session_id: session_id_of(&path).map(|id| id.get()),
            status,
            path,
            reason,
        });
    }

    output::print_rows(&entries, args.format, "No buffers")?;
    Ok(())
}
