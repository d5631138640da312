// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line codec for buffer records
//!
//! A record is written as one compact JSON object terminated by `\n`. JSON
//! string escaping guarantees the encoded text itself never contains a raw
//! newline, so a line is always a complete record or a torn write.
//!
//! Decoding classifies failures instead of bailing out, so a reader can skip
//! one bad line and keep going.

use crate::record::{BufferRecord, RECORD_TAGS};
use serde_json::Value;
use thiserror::Error;

/// Why a line could not be decoded into a [`BufferRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not valid JSON, not an object, truncated, or lacking a `type` tag
    #[error("malformed record: {reason}")]
    Malformed { reason: String },
    /// Valid JSON object with a `type` this build does not know
    #[error("unknown record type: {tag}")]
    UnknownVariant { tag: String },
    /// Known `type`, but required fields are missing or have the wrong shape
    #[error("{tag} record does not match schema: {reason}")]
    SchemaMismatch { tag: String, reason: String },
}

impl ParseError {
    fn malformed(reason: impl Into<String>) -> Self {
        ParseError::Malformed {
            reason: reason.into(),
        }
    }
}

/// Encode a record as a single line of JSON, without the trailing newline
pub fn encode(record: &BufferRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(record)
}

/// Decode one line of text into a record
///
/// A trailing `\n` or `\r\n` is tolerated.
pub fn decode(line: &str) -> Result<BufferRecord, ParseError> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return Err(ParseError::malformed("empty line"));
    }

    let value: Value = serde_json::from_str(line).map_err(|e| ParseError::malformed(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(ParseError::malformed("expected a JSON object"));
    };

    let tag = match fields.get("type") {
        Some(Value::String(tag)) => tag.clone(),
        Some(_) => return Err(ParseError::malformed("`type` must be a string")),
        None => return Err(ParseError::malformed("missing `type` field")),
    };
    if !RECORD_TAGS.contains(&tag.as_str()) {
        return Err(ParseError::UnknownVariant { tag });
    }

    serde_json::from_value(Value::Object(fields)).map_err(|e| ParseError::SchemaMismatch {
        tag,
        reason: e.to_string(),
    })
}

/// Decode raw bytes read from a buffer file
///
/// Invalid UTF-8 (for example a write torn inside a multi-byte character)
/// is reported as [`ParseError::Malformed`].
pub fn decode_bytes(line: &[u8]) -> Result<BufferRecord, ParseError> {
    let text = std::str::from_utf8(line).map_err(|e| ParseError::malformed(e.to_string()))?;
    decode(text)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
