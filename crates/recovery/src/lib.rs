// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Startup recovery of orphaned session buffers
//!
//! Runs once, before any new session buffer is created:
//!
//! ```text
//! scan(dir) → classify each file ─┬─ corrupt  → keep, report
//!                                 ├─ closed   → delete
//!                                 └─ orphaned → replay into store → delete
//! ```

mod error;
mod replayer;
mod report;
mod scanner;

pub use error::{RecoveryError, ReplayError};
pub use replayer::{replay, ReplayOutcome, RECOVERY_CATEGORY};
pub use report::{FailedFile, RecoverySummary};
pub use scanner::{classify, scan, Classification, RecoveryScanner};
