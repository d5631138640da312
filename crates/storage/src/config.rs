// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Buffer configuration

use crate::error::BufferError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Records appended between forced flushes unless configured otherwise
pub const DEFAULT_FLUSH_THRESHOLD: u32 = 100;

/// Where buffers live and how often they are forced to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Directory holding one buffer file per session
    pub dir: PathBuf,
    /// Number of appended records that triggers a flush + fsync
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: u32,
}

fn default_flush_threshold() -> u32 {
    DEFAULT_FLUSH_THRESHOLD
}

impl BufferConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }

    pub fn with_flush_threshold(mut self, flush_threshold: u32) -> Self {
        self.flush_threshold = flush_threshold;
        self
    }

    /// Reject settings the writer cannot honour
    pub fn validate(&self) -> Result<(), BufferError> {
        if self.flush_threshold == 0 {
            return Err(BufferError::InvalidConfig(
                "flush_threshold must be at least 1".to_string(),
            ));
        }
        if self.dir.as_os_str().is_empty() {
            return Err(BufferError::InvalidConfig(
                "buffer dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
