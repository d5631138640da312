// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use labcap_adapters::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a whole recovery run
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("cannot read buffer directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort the replay of one buffer file
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
