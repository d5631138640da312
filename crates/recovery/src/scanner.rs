// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup scan of the buffer directory

use crate::error::RecoveryError;
use crate::replayer::replay;
use crate::report::RecoverySummary;
use labcap_adapters::DurableStore;
use labcap_core::{BufferRecord, Clock, SessionId, SessionStart, SystemClock};
use labcap_storage::{parse_buffer_file_name, session_id_of, BufferReader};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What a buffer file found at startup needs
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Unusable; kept on disk for inspection
    Corrupt { reason: String },
    /// Ended with a `SessionEnd`; safe to delete
    Closed { session_id: SessionId },
    /// Never closed; must be replayed
    Orphaned { start: SessionStart },
}

/// List buffer files in `dir`, sorted by path
///
/// A missing directory has nothing to recover and yields no candidates.
pub fn scan(dir: &Path) -> Result<Vec<PathBuf>, RecoveryError> {
    let read_dir_error = |source| RecoveryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(read_dir_error(e)),
    };

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(read_dir_error)?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let matches = entry
            .file_name()
            .to_str()
            .and_then(parse_buffer_file_name)
            .is_some();
        if is_file && matches {
            candidates.push(entry.path());
        }
    }
    candidates.sort();
    Ok(candidates)
}

/// Decide what recovery should do with one buffer file
pub fn classify(path: &Path) -> std::io::Result<Classification> {
    let reader = BufferReader::open(path)?;

    let start = match reader.first_line()? {
        None => {
            return Ok(Classification::Corrupt {
                reason: "buffer file is empty".to_string(),
            })
        }
        Some(line) => match line.record {
            Ok(BufferRecord::SessionStart(start)) => start,
            Ok(other) => {
                return Ok(Classification::Corrupt {
                    reason: format!(
                        "line {} is a {} record, expected session_start",
                        line.number,
                        other.tag()
                    ),
                })
            }
            Err(e) => {
                return Ok(Classification::Corrupt {
                    reason: format!("line {} does not decode: {}", line.number, e),
                })
            }
        },
    };

    if let Some(named) = session_id_of(path) {
        if named != start.session_id {
            tracing::warn!(
                path = %path.display(),
                session_id = %start.session_id,
                "buffer file name does not match its session start"
            );
        }
    }

    let validation = reader.validate()?;
    if validation.is_closed() {
        return Ok(Classification::Closed {
            session_id: start.session_id,
        });
    }
    Ok(Classification::Orphaned { start })
}

/// Runs recovery once at process startup
#[derive(Clone, Default)]
pub struct RecoveryScanner<C: Clock = SystemClock> {
    clock: C,
}

impl<C: Clock> RecoveryScanner<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Recover every buffer left in `dir` into `store`
    ///
    /// Each file is handled on its own: a failure is recorded in the summary
    /// and the file stays on disk, while the remaining files are still
    /// processed. Only an unreadable directory fails the whole run.
    pub async fn run_at_startup<S: DurableStore>(
        &self,
        dir: &Path,
        store: &S,
    ) -> Result<RecoverySummary, RecoveryError> {
        let candidates = scan(dir)?;
        let scan_time = self.clock.now();
        let mut summary = RecoverySummary::default();

        tracing::info!(
            dir = %dir.display(),
            candidates = candidates.len(),
            "starting buffer recovery"
        );

        for path in candidates {
            let classification = match classify(&path) {
                Ok(classification) => classification,
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "cannot read buffer");
                    summary.fail(path, format!("cannot read buffer: {e}"));
                    continue;
                }
            };

            match classification {
                Classification::Corrupt { reason } => {
                    tracing::error!(path = %path.display(), %reason, "corrupt buffer left in place");
                    summary.fail(path, reason);
                }
                Classification::Closed { session_id } => match fs::remove_file(&path) {
                    Ok(()) => {
                        tracing::info!(%session_id, path = %path.display(), "removed closed buffer");
                        summary.closed_buffers_removed += 1;
                    }
                    Err(e) => {
                        tracing::error!(path = %path.display(), error = %e, "cannot remove closed buffer");
                        summary.fail(path, format!("cannot remove closed buffer: {e}"));
                    }
                },
                Classification::Orphaned { start } => {
                    let outcome = match replay(&path, &start, store, scan_time).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            tracing::error!(
                                session_id = %start.session_id,
                                path = %path.display(),
                                error = %e,
                                "replay failed; buffer kept for next startup"
                            );
                            summary.fail(path, format!("replay failed: {e}"));
                            continue;
                        }
                    };

                    summary.recovered_sessions += 1;
                    summary.recovered_measurements += outcome.measurements;
                    summary.skipped_lines += outcome.skipped_lines;

                    if let Err(e) = fs::remove_file(&path) {
                        tracing::error!(
                            session_id = %start.session_id,
                            path = %path.display(),
                            error = %e,
                            "replayed buffer could not be removed"
                        );
                        summary.fail(path, format!("replayed but not removed: {e}"));
                    }
                }
            }
        }

        if summary.is_clean() {
            tracing::info!(%summary, "buffer recovery complete");
        } else {
            tracing::error!(
                failed = summary.failed_files.len(),
                %summary,
                "buffer recovery finished with failures"
            );
        }
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
