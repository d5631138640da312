// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Buffer reader for iterating and validating records
//!
//! Unlike the writer, the reader never stops at a bad line: each line is
//! decoded independently and parse failures are handed to the caller, which
//! decides whether to skip them.

use labcap_core::{decode_bytes, BufferRecord, ParseError, SessionEnd, SessionId, SessionStart};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One physical line of a buffer file
#[derive(Debug, Clone, PartialEq)]
pub struct BufferLine {
    /// 1-based line number
    pub number: u64,
    pub record: Result<BufferRecord, ParseError>,
    /// False for a final line with no trailing newline (a torn write)
    pub terminated: bool,
}

/// Reader over a single buffer file
pub struct BufferReader {
    path: PathBuf,
}

impl BufferReader {
    /// Open a buffer file for reading
    pub fn open(path: &Path) -> std::io::Result<Self> {
        if !path.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("buffer file not found: {}", path.display()),
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Iterate over all non-blank lines in file order
    pub fn lines(&self) -> std::io::Result<BufferLines> {
        Ok(BufferLines {
            reader: BufReader::new(File::open(&self.path)?),
            line_number: 0,
        })
    }

    /// First non-blank line, if any
    pub fn first_line(&self) -> std::io::Result<Option<BufferLine>> {
        self.lines()?.next().transpose()
    }

    /// Walk the whole file and summarise what it contains
    pub fn validate(&self) -> std::io::Result<BufferValidation> {
        let mut validation = BufferValidation::default();

        for line in self.lines()? {
            let line = line?;
            validation.lines += 1;
            let is_first = validation.lines == 1;
            if !line.terminated {
                validation.torn_tail = true;
            }

            let record = match line.record {
                Ok(record) => record,
                Err(error) => {
                    validation.parse_errors.push((line.number, error));
                    continue;
                }
            };

            validation.valid_records += 1;
            if is_first {
                if let BufferRecord::SessionStart(start) = &record {
                    validation.start = Some(start.clone());
                }
            }
            validation.end = None;
            match record {
                BufferRecord::SessionStart(_) => {}
                BufferRecord::Measurement(_) => validation.measurements += 1,
                BufferRecord::AuditEvent(_) => validation.audit_events += 1,
                BufferRecord::MetadataUpdate(_) => validation.metadata_updates += 1,
                BufferRecord::SessionEnd(end) => validation.end = Some(end),
            }
        }

        Ok(validation)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Iterator over the lines of a buffer file
pub struct BufferLines {
    reader: BufReader<File>,
    line_number: u64,
}

impl Iterator for BufferLines {
    type Item = std::io::Result<BufferLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut raw = Vec::new();
            match self.reader.read_until(b'\n', &mut raw) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;

                    let terminated = raw.last() == Some(&b'\n');
                    if raw.iter().all(|b| b.is_ascii_whitespace()) {
                        continue;
                    }

                    return Some(Ok(BufferLine {
                        number: self.line_number,
                        record: decode_bytes(&raw),
                        terminated,
                    }));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Summary of a buffer file's contents
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BufferValidation {
    /// Non-blank lines seen
    pub lines: u64,
    pub valid_records: u64,
    pub measurements: u64,
    pub audit_events: u64,
    pub metadata_updates: u64,
    /// `SessionStart` decoded from the first line, if it was one
    pub start: Option<SessionStart>,
    /// Set only when the last successfully decoded record is a `SessionEnd`
    pub end: Option<SessionEnd>,
    pub parse_errors: Vec<(u64, ParseError)>,
    /// The final line had no trailing newline
    pub torn_tail: bool,
}

impl BufferValidation {
    pub fn session_id(&self) -> Option<SessionId> {
        self.start.as_ref().map(|start| start.session_id)
    }

    /// The file opens with a valid `SessionStart`
    pub fn has_start(&self) -> bool {
        self.start.is_some()
    }

    /// The file was closed gracefully
    pub fn is_closed(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
