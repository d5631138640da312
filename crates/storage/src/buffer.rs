// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session buffer writer
//!
//! One append-only file per active capture session. Records are encoded as
//! whole newline-terminated lines before any write call, so a crash can at
//! worst leave a torn final line.
//!
//! ## Flush discipline
//!
//! Appends go to a userspace buffer. Every `flush_threshold` records the
//! writer pushes everything to the OS and calls `fsync`, so a killed process
//! loses at most `flush_threshold - 1` records. `create` and `close` always
//! end with a flush point.

use crate::config::BufferConfig;
use crate::error::BufferError;
use crate::paths;
use chrono::{DateTime, Utc};
use labcap_core::{
    encode, AuditEvent, AuditLevel, BufferRecord, Measurement, Metadata, MetadataUpdate,
    SessionEnd, SessionId, SessionStart,
};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Directory of session buffers plus the registry of sessions open in this process
#[derive(Clone)]
pub struct BufferDir {
    config: BufferConfig,
    open: Arc<Mutex<HashSet<SessionId>>>,
}

impl BufferDir {
    /// Validate the config and create the directory if needed
    pub fn open(config: BufferConfig) -> Result<Self, BufferError> {
        config.validate()?;
        std::fs::create_dir_all(&config.dir)?;
        Ok(Self {
            config,
            open: Arc::new(Mutex::new(HashSet::new())),
        })
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.dir
    }

    /// Path the buffer for `session_id` is written to
    pub fn path_for(&self, session_id: SessionId) -> PathBuf {
        paths::buffer_path(&self.config.dir, session_id)
    }

    /// Whether a buffer for `session_id` is currently open in this process
    pub fn is_open(&self, session_id: SessionId) -> bool {
        self.open
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&session_id)
    }

    fn claim(&self, session_id: SessionId) -> Result<OpenSlot, BufferError> {
        let mut open = self.open.lock().unwrap_or_else(|e| e.into_inner());
        if !open.insert(session_id) {
            return Err(BufferError::DuplicateSessionId(session_id));
        }
        Ok(OpenSlot {
            session_id,
            open: Arc::clone(&self.open),
        })
    }
}

/// Registry entry for an open buffer; released on drop
struct OpenSlot {
    session_id: SessionId,
    open: Arc<Mutex<HashSet<SessionId>>>,
}

impl Drop for OpenSlot {
    fn drop(&mut self) {
        self.open
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.session_id);
    }
}

/// Append-only buffer for one capture session
///
/// Owned by the capture loop; appends take `&mut self` and never lock.
pub struct SessionBuffer {
    session_id: SessionId,
    path: PathBuf,
    /// `None` once the buffer is closed
    writer: Option<BufWriter<File>>,
    slot: Option<OpenSlot>,
    /// `SessionEnd` is in the writer; a retried `close` only flushes
    end_written: bool,
    flush_threshold: u32,
    unflushed: u32,
    records_written: u64,
    measurements_written: u64,
}

impl SessionBuffer {
    /// Create the buffer file and durably write its `SessionStart` line
    ///
    /// A file already on disk for the same id is truncated; that only happens
    /// when ids are reused, so it is logged.
    pub fn create(
        dir: &BufferDir,
        session_id: SessionId,
        started_at: DateTime<Utc>,
        device_metadata: Metadata,
        session_metadata: Metadata,
    ) -> Result<Self, BufferError> {
        let slot = dir.claim(session_id)?;
        let path = dir.path_for(session_id);

        if path.exists() {
            tracing::warn!(
                %session_id,
                path = %path.display(),
                "buffer file already exists for new session; truncating"
            );
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        sync_parent_dir(&path)?;

        let mut buffer = Self {
            session_id,
            path,
            writer: Some(BufWriter::new(file)),
            slot: Some(slot),
            end_written: false,
            flush_threshold: dir.config().flush_threshold,
            unflushed: 0,
            records_written: 0,
            measurements_written: 0,
        };

        buffer.append(&BufferRecord::SessionStart(SessionStart {
            session_id,
            started_at,
            device_metadata,
            session_metadata,
        }))?;
        buffer.flush()?;

        tracing::debug!(%session_id, path = %buffer.path.display(), "session buffer created");
        Ok(buffer)
    }

    /// Append a captured frame
    ///
    /// Returns the total number of records written to this buffer.
    pub fn append_measurement(
        &mut self,
        captured_at: DateTime<Utc>,
        raw_frame: Vec<u8>,
        decoded_payload: Value,
        derived_metrics: Metadata,
    ) -> Result<u64, BufferError> {
        let written = self.append(&BufferRecord::Measurement(Measurement {
            captured_at,
            raw_frame,
            decoded_payload,
            derived_metrics,
        }))?;
        self.measurements_written += 1;
        Ok(written)
    }

    /// Append an audit event
    pub fn append_audit_event(
        &mut self,
        level: AuditLevel,
        category: impl Into<String>,
        message: impl Into<String>,
        payload: Value,
    ) -> Result<u64, BufferError> {
        self.append(&BufferRecord::AuditEvent(AuditEvent {
            level,
            category: category.into(),
            message: message.into(),
            payload,
        }))
    }

    /// Append a merge patch for the session metadata
    pub fn update_metadata(&mut self, metadata_patch: Metadata) -> Result<u64, BufferError> {
        self.append(&BufferRecord::MetadataUpdate(MetadataUpdate { metadata_patch }))
    }

    /// Write `SessionEnd`, flush, and release the file
    ///
    /// Calling `close` on an already closed buffer does nothing. If the final
    /// flush fails the buffer stays open, and calling `close` again retries
    /// the flush without writing a second `SessionEnd`.
    pub fn close(
        &mut self,
        ended_at: DateTime<Utc>,
        measurement_count: u64,
    ) -> Result<(), BufferError> {
        if self.writer.is_none() {
            return Ok(());
        }

        if !self.end_written {
            self.write_record(&BufferRecord::SessionEnd(SessionEnd {
                ended_at,
                measurement_count,
            }))?;
            self.end_written = true;
        }
        self.flush()?;

        self.writer = None;
        self.slot = None;

        tracing::info!(
            session_id = %self.session_id,
            records = self.records_written,
            measurement_count,
            "session buffer closed"
        );
        Ok(())
    }

    /// Force a flush point: drain the userspace buffer and fsync
    pub fn flush(&mut self) -> Result<(), BufferError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or(BufferError::Closed(self.session_id))?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        self.unflushed = 0;
        Ok(())
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records appended since the last flush point
    pub fn unflushed(&self) -> u32 {
        self.unflushed
    }

    /// Records written so far, including `SessionStart`
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn measurements_written(&self) -> u64 {
        self.measurements_written
    }

    pub fn is_closed(&self) -> bool {
        self.writer.is_none()
    }

    fn append(&mut self, record: &BufferRecord) -> Result<u64, BufferError> {
        if self.end_written {
            return Err(BufferError::Closed(self.session_id));
        }
        self.write_record(record)?;
        if self.unflushed >= self.flush_threshold {
            self.flush()?;
        }
        Ok(self.records_written)
    }

    fn write_record(&mut self, record: &BufferRecord) -> Result<(), BufferError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or(BufferError::Closed(self.session_id))?;

        // Whole line, newline included, in a single write call
        let mut line = encode(record)?;
        line.push('\n');
        writer.write_all(line.as_bytes())?;

        self.records_written += 1;
        self.unflushed += 1;
        Ok(())
    }
}

impl Drop for SessionBuffer {
    fn drop(&mut self) {
        let Some(mut writer) = self.writer.take() else {
            return;
        };
        // Hand buffered lines to the OS; without a SessionEnd the file stays
        // orphaned and is picked up by recovery on the next start.
        if let Err(e) = writer.flush() {
            tracing::error!(
                session_id = %self.session_id,
                error = %e,
                "failed to flush unclosed session buffer"
            );
        }
        tracing::warn!(
            session_id = %self.session_id,
            records = self.records_written,
            "session buffer dropped without close"
        );
    }
}

/// Make the new directory entry itself durable
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => File::open(parent)?.sync_all(),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
