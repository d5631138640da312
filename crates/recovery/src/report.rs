// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery summary reported once at startup

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A buffer file that could not be recovered and was left on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of one startup recovery run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecoverySummary {
    pub recovered_sessions: u64,
    pub recovered_measurements: u64,
    /// Gracefully closed buffers deleted without replay
    pub closed_buffers_removed: u64,
    /// Lines dropped because they failed to decode
    pub skipped_lines: u64,
    pub failed_files: Vec<FailedFile>,
}

impl RecoverySummary {
    /// No file failed recovery
    pub fn is_clean(&self) -> bool {
        self.failed_files.is_empty()
    }

    pub(crate) fn fail(&mut self, path: PathBuf, reason: impl Into<String>) {
        self.failed_files.push(FailedFile {
            path,
            reason: reason.into(),
        });
    }
}

impl fmt::Display for RecoverySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "recovered {} session(s), {} measurement(s)",
            self.recovered_sessions, self.recovered_measurements
        )?;
        if self.closed_buffers_removed > 0 {
            write!(f, ", removed {} closed buffer(s)", self.closed_buffers_removed)?;
        }
        if self.skipped_lines > 0 {
            write!(f, ", skipped {} unreadable line(s)", self.skipped_lines)?;
        }
        for failed in &self.failed_files {
            write!(f, "\nfailed: {}: {}", failed.path.display(), failed.reason)?;
        }
        Ok(())
    }
}
