// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replay of an orphaned buffer into the durable store

use crate::error::ReplayError;
use chrono::{DateTime, Utc};
use labcap_adapters::{DurableStore, SessionHandle};
use labcap_core::{AuditEvent, AuditLevel, BufferRecord, SessionStart};
use labcap_storage::BufferReader;
use serde_json::json;
use std::path::Path;

/// Category of the audit event written after a replay
pub const RECOVERY_CATEGORY: &str = "recovery";

/// Counts from one replayed buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub measurements: u64,
    pub audit_events: u64,
    pub metadata_updates: u64,
    pub skipped_lines: u64,
    pub ended_at: Option<DateTime<Utc>>,
}

/// Rebuild the session described by `start` from the lines of `path`
///
/// Records reach the store in file order. Lines that fail to decode are
/// skipped. Any store failure aborts the replay; the caller must then keep
/// the file for the next startup.
pub async fn replay<S: DurableStore>(
    path: &Path,
    start: &SessionStart,
    store: &S,
    scan_time: DateTime<Utc>,
) -> Result<ReplayOutcome, ReplayError> {
    let session_id = start.session_id;
    let mut session = store
        .start_or_get_session(session_id, start.started_at, &start.device_metadata)
        .await?;
    if !start.session_metadata.is_empty() {
        session.merge_metadata(&start.session_metadata).await?;
    }

    let reader = BufferReader::open(path)?;
    let mut lines = reader.lines()?;
    // First line is the SessionStart already handled above
    lines.next().transpose()?;

    let mut outcome = ReplayOutcome::default();
    let mut last_captured_at = None;

    for line in lines {
        let line = line?;
        let record = match line.record {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!(
                    %session_id,
                    path = %path.display(),
                    line = line.number,
                    torn = !line.terminated,
                    %error,
                    "skipping unreadable buffer line"
                );
                outcome.skipped_lines += 1;
                continue;
            }
        };

        let tag = record.tag();
        match record {
            BufferRecord::Measurement(measurement) => {
                session.store_measurement(&measurement).await?;
                last_captured_at = Some(measurement.captured_at);
                outcome.measurements += 1;
            }
            BufferRecord::AuditEvent(event) => {
                session.store_audit_event(&event).await?;
                outcome.audit_events += 1;
            }
            BufferRecord::MetadataUpdate(update) => {
                session.merge_metadata(&update.metadata_patch).await?;
                outcome.metadata_updates += 1;
            }
            BufferRecord::SessionStart(_) | BufferRecord::SessionEnd(_) => {
                tracing::warn!(
                    %session_id,
                    path = %path.display(),
                    line = line.number,
                    tag,
                    "ignoring stray lifecycle record"
                );
            }
        }
    }

    let ended_at = last_captured_at.unwrap_or(scan_time);
    session
        .store_audit_event(&AuditEvent {
            level: AuditLevel::Info,
            category: RECOVERY_CATEGORY.to_string(),
            message: format!("session {session_id} recovered from buffer"),
            payload: json!({
                "measurements": outcome.measurements,
                "audit_events": outcome.audit_events,
                "metadata_updates": outcome.metadata_updates,
                "skipped_lines": outcome.skipped_lines,
                "source_file": path.display().to_string(),
            }),
        })
        .await?;
    session.close(ended_at, outcome.measurements).await?;

    outcome.ended_at = Some(ended_at);
    tracing::info!(
        %session_id,
        measurements = outcome.measurements,
        skipped = outcome.skipped_lines,
        %ended_at,
        "buffer replayed"
    );
    Ok(outcome)
}

#[cfg(test)]
#[path = "replayer_tests.rs"]
mod tests;
