// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::store::{DurableStore, SessionHandle, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use labcap_core::{AuditEvent, Measurement, Metadata, SessionId};
use std::time::Instant;
use tracing::Instrument;

/// Wrapper that adds tracing to any DurableStore
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: DurableStore> DurableStore for TracedStore<S> {
    type Session = TracedSession<S::Session>;

    async fn start_or_get_session(
        &self,
        session_id: SessionId,
        started_at: DateTime<Utc>,
        device_metadata: &Metadata,
    ) -> Result<Self::Session, StoreError> {
        let span = tracing::info_span!("store.start", session_id = %session_id);
        async {
            let start = Instant::now();
            let result = self
                .inner
                .start_or_get_session(session_id, started_at, device_metadata)
                .await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(inner) => {
                    tracing::info!(%started_at, elapsed_ms, "session ready");
                    Ok(TracedSession { inner })
                }
                Err(e) => {
                    tracing::error!(elapsed_ms, error = %e, "start failed");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any SessionHandle
pub struct TracedSession<H> {
    inner: H,
}

impl<H> TracedSession<H> {
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[async_trait]
impl<H: SessionHandle> SessionHandle for TracedSession<H> {
    fn session_id(&self) -> SessionId {
        self.inner.session_id()
    }

    async fn store_measurement(&mut self, measurement: &Measurement) -> Result<(), StoreError> {
        let result = self.inner.store_measurement(measurement).await;
        match &result {
            Ok(()) => tracing::trace!(
                session_id = %self.inner.session_id(),
                captured_at = %measurement.captured_at,
                "measurement stored"
            ),
            Err(e) => tracing::error!(
                session_id = %self.inner.session_id(),
                captured_at = %measurement.captured_at,
                error = %e,
                "store measurement failed"
            ),
        }
        result
    }

    async fn store_audit_event(&mut self, event: &AuditEvent) -> Result<(), StoreError> {
        let result = self.inner.store_audit_event(event).await;
        match &result {
            Ok(()) => tracing::debug!(
                session_id = %self.inner.session_id(),
                level = %event.level,
                category = event.category.as_str(),
                "audit event stored"
            ),
            Err(e) => tracing::error!(
                session_id = %self.inner.session_id(),
                category = event.category.as_str(),
                error = %e,
                "store audit event failed"
            ),
        }
        result
    }

    async fn merge_metadata(&mut self, patch: &Metadata) -> Result<(), StoreError> {
        let result = self.inner.merge_metadata(patch).await;
        match &result {
            Ok(()) => tracing::debug!(
                session_id = %self.inner.session_id(),
                keys = patch.len(),
                "metadata merged"
            ),
            Err(e) => tracing::error!(
                session_id = %self.inner.session_id(),
                error = %e,
                "merge metadata failed"
            ),
        }
        result
    }

    async fn close(
        &mut self,
        ended_at: DateTime<Utc>,
        measurement_count: u64,
    ) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.close", session_id = %self.inner.session_id());
        async {
            let start = Instant::now();
            let result = self.inner.close(ended_at, measurement_count).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => {
                    tracing::info!(%ended_at, measurement_count, elapsed_ms, "session closed")
                }
                Err(e) => tracing::error!(elapsed_ms, error = %e, "close failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
