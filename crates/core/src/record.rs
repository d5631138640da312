// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Buffer record types
//!
//! Every line of a session buffer is exactly one [`BufferRecord`]. The first
//! line of a file is always a [`SessionStart`]; a gracefully closed file ends
//! with a [`SessionEnd`].

use crate::id::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Free-form JSON object used for device/session metadata and metric maps
pub type Metadata = serde_json::Map<String, Value>;

/// One line of a session buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BufferRecord {
    SessionStart(SessionStart),
    Measurement(Measurement),
    AuditEvent(AuditEvent),
    MetadataUpdate(MetadataUpdate),
    SessionEnd(SessionEnd),
}

/// Discriminator values written to the `type` field, in declaration order
pub const RECORD_TAGS: [&str; 5] = [
    "session_start",
    "measurement",
    "audit_event",
    "metadata_update",
    "session_end",
];

impl BufferRecord {
    /// The `type` discriminator this record is written with
    pub fn tag(&self) -> &'static str {
        match self {
            BufferRecord::SessionStart(_) => RECORD_TAGS[0],
            BufferRecord::Measurement(_) => RECORD_TAGS[1],
            BufferRecord::AuditEvent(_) => RECORD_TAGS[2],
            BufferRecord::MetadataUpdate(_) => RECORD_TAGS[3],
            BufferRecord::SessionEnd(_) => RECORD_TAGS[4],
        }
    }

    /// Wall-clock time carried by the record, if the variant has one
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            BufferRecord::SessionStart(start) => Some(start.started_at),
            BufferRecord::Measurement(m) => Some(m.captured_at),
            BufferRecord::SessionEnd(end) => Some(end.ended_at),
            BufferRecord::AuditEvent(_) | BufferRecord::MetadataUpdate(_) => None,
        }
    }
}

/// Opens a session buffer; always the first line of the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStart {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
    pub device_metadata: Metadata,
    pub session_metadata: Metadata,
}

/// A single captured instrument frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub captured_at: DateTime<Utc>,
    #[serde(with = "frame_bytes")]
    pub raw_frame: Vec<u8>,
    pub decoded_payload: Value,
    pub derived_metrics: Metadata,
}

/// An operator-facing event recorded alongside the measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub level: AuditLevel,
    pub category: String,
    pub message: String,
    pub payload: Value,
}

/// A JSON merge patch applied to the session metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataUpdate {
    pub metadata_patch: Metadata,
}

/// Written by a graceful close; always the last line of the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEnd {
    pub ended_at: DateTime<Utc>,
    pub measurement_count: u64,
}

/// Severity of an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditLevel::Debug => "debug",
            AuditLevel::Info => "info",
            AuditLevel::Warning => "warning",
            AuditLevel::Error => "error",
            AuditLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Raw frames travel as standard base64 text inside the JSON line
mod frame_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
