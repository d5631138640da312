// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the session buffer

use labcap_core::SessionId;
use thiserror::Error;

/// Errors that can occur while writing a session buffer
///
/// None of these are retried by the buffer; the capture loop decides
/// whether the session can continue.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("session {0} already has an open buffer")]
    DuplicateSessionId(SessionId),
    #[error("buffer for session {0} is already closed")]
    Closed(SessionId),
    #[error("invalid buffer config: {0}")]
    InvalidConfig(String),
}
