// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake durable store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DurableStore, SessionHandle, StoreError, StoredSession};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labcap_core::{merge_patch, AuditEvent, Measurement, Metadata, SessionId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Recorded store call
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    StartOrGetSession {
        session_id: SessionId,
        started_at: DateTime<Utc>,
    },
    StoreMeasurement {
        session_id: SessionId,
        captured_at: DateTime<Utc>,
    },
    StoreAuditEvent {
        session_id: SessionId,
        category: String,
        message: String,
    },
    MergeMetadata {
        session_id: SessionId,
        patch: Metadata,
    },
    Close {
        session_id: SessionId,
        ended_at: DateTime<Utc>,
        measurement_count: u64,
    },
}

/// Fake session state
#[derive(Debug, Clone)]
pub struct FakeSession {
    pub row: StoredSession,
    pub measurements: Vec<Measurement>,
    pub audit_events: Vec<AuditEvent>,
}

#[derive(Default)]
struct Failures {
    unavailable: bool,
    /// Fail once the store holds this many measurements in total
    measurement_limit: Option<usize>,
}

/// Fake durable store for testing
#[derive(Clone, Default)]
pub struct FakeStore {
    sessions: Arc<Mutex<BTreeMap<SessionId, FakeSession>>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    failures: Arc<Mutex<Failures>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Get a session by ID
    pub fn session(&self, session_id: SessionId) -> Option<FakeSession> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&session_id)
            .cloned()
    }

    /// Number of session rows
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Seed a session row, as if written before a crash
    pub fn insert_session(&self, row: StoredSession) {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                row.session_id,
                FakeSession {
                    row,
                    measurements: Vec::new(),
                    audit_events: Vec::new(),
                },
            );
    }

    /// Make every call fail with [`StoreError::Unavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .unavailable = unavailable;
    }

    /// Fail measurement writes once `limit` measurements are stored in total
    pub fn fail_after_measurements(&self, limit: usize) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .measurement_limit = Some(limit);
    }

    fn record(&self, call: StoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .unavailable
        {
            return Err(StoreError::Unavailable("fake store offline".to_string()));
        }
        Ok(())
    }

    fn with_session<T>(
        &self,
        session_id: SessionId,
        f: impl FnOnce(&mut FakeSession) -> T,
    ) -> Result<T, StoreError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| StoreError::NotFound {
                kind: "session",
                id: session_id.to_string(),
            })?;
        Ok(f(session))
    }

    fn total_measurements(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(|s| s.measurements.len())
            .sum()
    }
}

#[async_trait]
impl DurableStore for FakeStore {
    type Session = FakeSessionHandle;

    async fn start_or_get_session(
        &self,
        session_id: SessionId,
        started_at: DateTime<Utc>,
        device_metadata: &Metadata,
    ) -> Result<Self::Session, StoreError> {
        self.record(StoreCall::StartOrGetSession {
            session_id,
            started_at,
        });
        self.check_available()?;

        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(session_id)
            .or_insert_with(|| FakeSession {
                row: StoredSession::new(session_id, started_at, device_metadata.clone()),
                measurements: Vec::new(),
                audit_events: Vec::new(),
            });

        Ok(FakeSessionHandle {
            store: self.clone(),
            session_id,
        })
    }
}

/// Handle to a session in a [`FakeStore`]
pub struct FakeSessionHandle {
    store: FakeStore,
    session_id: SessionId,
}

#[async_trait]
impl SessionHandle for FakeSessionHandle {
    fn session_id(&self) -> SessionId {
        self.session_id
    }

    async fn store_measurement(&mut self, measurement: &Measurement) -> Result<(), StoreError> {
        self.store.record(StoreCall::StoreMeasurement {
            session_id: self.session_id,
            captured_at: measurement.captured_at,
        });
        self.store.check_available()?;

        let limit = self
            .store
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .measurement_limit;
        if let Some(limit) = limit {
            if self.store.total_measurements() >= limit {
                return Err(StoreError::Unavailable(format!(
                    "fake store full after {limit} measurements"
                )));
            }
        }

        self.store.with_session(self.session_id, |s| {
            s.measurements.push(measurement.clone())
        })
    }

    async fn store_audit_event(&mut self, event: &AuditEvent) -> Result<(), StoreError> {
        self.store.record(StoreCall::StoreAuditEvent {
            session_id: self.session_id,
            category: event.category.clone(),
            message: event.message.clone(),
        });
        self.store.check_available()?;
        self.store
            .with_session(self.session_id, |s| s.audit_events.push(event.clone()))
    }

    async fn merge_metadata(&mut self, patch: &Metadata) -> Result<(), StoreError> {
        self.store.record(StoreCall::MergeMetadata {
            session_id: self.session_id,
            patch: patch.clone(),
        });
        self.store.check_available()?;
        self.store
            .with_session(self.session_id, |s| merge_patch(&mut s.row.metadata, patch))
    }

    async fn close(
        &mut self,
        ended_at: DateTime<Utc>,
        measurement_count: u64,
    ) -> Result<(), StoreError> {
        self.store.record(StoreCall::Close {
            session_id: self.session_id,
            ended_at,
            measurement_count,
        });
        self.store.check_available()?;
        self.store.with_session(self.session_id, |s| {
            s.row.ended_at = Some(ended_at);
            s.row.measurement_count = Some(measurement_count);
        })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
