// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable store adapters
//!
//! The durable store is the system of record for sessions, measurements and
//! audit events. Recovery only needs the narrow write interface below.

mod json;

pub use json::{JsonSessionHandle, JsonStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSession, FakeSessionHandle, FakeStore, StoreCall};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labcap_core::{AuditEvent, Measurement, Metadata, SessionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from durable store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not found: {kind}/{id}")]
    NotFound { kind: &'static str, id: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("session {0} is already closed in this handle")]
    SessionClosed(SessionId),
}

/// Session row as held by the durable store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub session_id: SessionId,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub device_metadata: Metadata,
    pub metadata: Metadata,
    pub measurement_count: Option<u64>,
}

impl StoredSession {
    pub fn new(session_id: SessionId, started_at: DateTime<Utc>, device_metadata: Metadata) -> Self {
        Self {
            session_id,
            started_at,
            ended_at: None,
            device_metadata,
            metadata: Metadata::new(),
            measurement_count: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// Adapter for the durable store
#[async_trait]
pub trait DurableStore: Clone + Send + Sync + 'static {
    type Session: SessionHandle;

    /// Look up the session row, creating it if this is the first write
    ///
    /// An existing row (from a partial write before a crash) is reused, never
    /// duplicated.
    async fn start_or_get_session(
        &self,
        session_id: SessionId,
        started_at: DateTime<Utc>,
        device_metadata: &Metadata,
    ) -> Result<Self::Session, StoreError>;
}

/// Writes scoped to one session row
#[async_trait]
pub trait SessionHandle: Send {
    fn session_id(&self) -> SessionId;

    async fn store_measurement(&mut self, measurement: &Measurement) -> Result<(), StoreError>;

    async fn store_audit_event(&mut self, event: &AuditEvent) -> Result<(), StoreError>;

    /// Apply a JSON merge patch to the session metadata
    async fn merge_metadata(&mut self, patch: &Metadata) -> Result<(), StoreError>;

    async fn close(
        &mut self,
        ended_at: DateTime<Utc>,
        measurement_count: u64,
    ) -> Result<(), StoreError>;
}
