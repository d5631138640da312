// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! labcap-core: record model for the capture session buffer
//!
//! This crate provides:
//! - The closed set of buffer record variants
//! - The line codec that reads and writes them
//! - JSON merge-patch semantics for session metadata
//! - A clock abstraction so recovery timestamps are testable

pub mod clock;
pub mod codec;
pub mod id;
pub mod metadata;
pub mod record;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use codec::{decode, decode_bytes, encode, ParseError};
pub use id::SessionId;
pub use metadata::{merge_all, merge_patch};
pub use record::{
    AuditEvent, AuditLevel, BufferRecord, Measurement, Metadata, MetadataUpdate, SessionEnd,
    SessionStart, RECORD_TAGS,
};
