// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Buffer file naming convention: `session_<id>_buffer.log`

use labcap_core::SessionId;
use std::path::{Path, PathBuf};

const PREFIX: &str = "session_";
const SUFFIX: &str = "_buffer.log";

/// File name of the buffer for a session
pub fn buffer_file_name(session_id: SessionId) -> String {
    format!("{PREFIX}{session_id}{SUFFIX}")
}

/// Full path of the buffer for a session inside `dir`
pub fn buffer_path(dir: &Path, session_id: SessionId) -> PathBuf {
    dir.join(buffer_file_name(session_id))
}

/// Extract the session id from a buffer file name
///
/// Returns `None` for anything that does not follow the convention exactly.
pub fn parse_buffer_file_name(name: &str) -> Option<SessionId> {
    let digits = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Session id of a buffer path, if the file name follows the convention
pub fn session_id_of(path: &Path) -> Option<SessionId> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(parse_buffer_file_name)
}
