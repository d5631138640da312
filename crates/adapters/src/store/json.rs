// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file-based durable store
//!
//! Layout under the base path:
//!
//! ```text
//! sessions/<id>.json        session row, replaced atomically
//! measurements/<id>.jsonl   one measurement per line
//! audit/<id>.jsonl          one audit event per line
//! ```

use super::{DurableStore, SessionHandle, StoreError, StoredSession};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labcap_core::{merge_patch, AuditEvent, Measurement, Metadata, SessionId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const SESSIONS: &str = "sessions";
const MEASUREMENTS: &str = "measurements";
const AUDIT: &str = "audit";

/// JSON file-based durable store
#[derive(Debug, Clone)]
pub struct JsonStore {
    base_path: PathBuf,
}

impl JsonStore {
    /// Open a store at the given path
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();
        for kind in [SESSIONS, MEASUREMENTS, AUDIT] {
            fs::create_dir_all(base_path.join(kind))?;
        }
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Load a session row
    pub fn load_session(&self, session_id: SessionId) -> Result<StoredSession, StoreError> {
        let path = self.session_path(session_id);
        if !path.exists() {
            return Err(StoreError::NotFound {
                kind: "session",
                id: session_id.to_string(),
            });
        }
        let json = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// List all stored session ids, ascending
    pub fn list_sessions(&self) -> Result<Vec<SessionId>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(self.base_path.join(SESSIONS))? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                if let Some(id) = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| s.parse().ok())
                {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// All measurements stored for a session, in write order
    pub fn load_measurements(&self, session_id: SessionId) -> Result<Vec<Measurement>, StoreError> {
        read_lines(&self.lines_path(MEASUREMENTS, session_id))
    }

    /// All audit events stored for a session, in write order
    pub fn load_audit_events(&self, session_id: SessionId) -> Result<Vec<AuditEvent>, StoreError> {
        read_lines(&self.lines_path(AUDIT, session_id))
    }

    fn session_path(&self, session_id: SessionId) -> PathBuf {
        self.base_path
            .join(SESSIONS)
            .join(format!("{}.json", session_id))
    }

    fn lines_path(&self, kind: &str, session_id: SessionId) -> PathBuf {
        self.base_path
            .join(kind)
            .join(format!("{}.jsonl", session_id))
    }

    /// Replace the session row via temp file + rename
    fn save_session(&self, row: &StoredSession) -> Result<(), StoreError> {
        let path = self.session_path(row.session_id);
        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = File::create(&tmp)?;
        file.write_all(serde_json::to_string_pretty(row)?.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;
        sync_dir(&self.base_path.join(SESSIONS))?;
        Ok(())
    }

    fn open_lines(&self, kind: &str, session_id: SessionId) -> Result<BufWriter<File>, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.lines_path(kind, session_id))?;
        Ok(BufWriter::new(file))
    }
}

fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let reader = BufReader::new(File::open(path)?);
    let mut items = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        items.push(serde_json::from_str(&line)?);
    }
    Ok(items)
}

/// Make a rename inside `dir` durable
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

fn write_line<T: Serialize>(writer: &mut BufWriter<File>, item: &T) -> Result<(), StoreError> {
    let mut line = serde_json::to_string(item)?;
    line.push('\n');
    writer.write_all(line.as_bytes())?;
    Ok(())
}

#[async_trait]
impl DurableStore for JsonStore {
    type Session = JsonSessionHandle;

    async fn start_or_get_session(
        &self,
        session_id: SessionId,
        started_at: DateTime<Utc>,
        device_metadata: &Metadata,
    ) -> Result<Self::Session, StoreError> {
        let row = match self.load_session(session_id) {
            Ok(row) => row,
            Err(StoreError::NotFound { .. }) => {
                let row = StoredSession::new(session_id, started_at, device_metadata.clone());
                self.save_session(&row)?;
                row
            }
            Err(e) => return Err(e),
        };

        Ok(JsonSessionHandle {
            measurements: self.open_lines(MEASUREMENTS, session_id)?,
            audit: self.open_lines(AUDIT, session_id)?,
            store: self.clone(),
            row,
            closed: false,
        })
    }
}

/// Open session in a [`JsonStore`]
pub struct JsonSessionHandle {
    store: JsonStore,
    row: StoredSession,
    measurements: BufWriter<File>,
    audit: BufWriter<File>,
    closed: bool,
}

impl JsonSessionHandle {
    /// Current view of the session row
    pub fn row(&self) -> &StoredSession {
        &self.row
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed {
            return Err(StoreError::SessionClosed(self.row.session_id));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionHandle for JsonSessionHandle {
    fn session_id(&self) -> SessionId {
        self.row.session_id
    }

    async fn store_measurement(&mut self, measurement: &Measurement) -> Result<(), StoreError> {
        self.ensure_open()?;
        write_line(&mut self.measurements, measurement)
    }

    async fn store_audit_event(&mut self, event: &AuditEvent) -> Result<(), StoreError> {
        self.ensure_open()?;
        write_line(&mut self.audit, event)
    }

    async fn merge_metadata(&mut self, patch: &Metadata) -> Result<(), StoreError> {
        self.ensure_open()?;
        merge_patch(&mut self.row.metadata, patch);
        self.store.save_session(&self.row)
    }

    async fn close(
        &mut self,
        ended_at: DateTime<Utc>,
        measurement_count: u64,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        for writer in [&mut self.measurements, &mut self.audit] {
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        self.row.ended_at = Some(ended_at);
        self.row.measurement_count = Some(measurement_count);
        self.store.save_session(&self.row)?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
