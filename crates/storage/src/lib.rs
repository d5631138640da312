// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Crash-resistant session buffers
//!
//! ```text
//! capture loop → SessionBuffer::append_* → session_<id>_buffer.log
//!                                               ↓ (after a crash)
//!                                    BufferReader → recovery replay
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod paths;
pub mod reader;

pub use buffer::{BufferDir, SessionBuffer};
pub use config::{BufferConfig, DEFAULT_FLUSH_THRESHOLD};
pub use error::BufferError;
pub use paths::{buffer_file_name, buffer_path, parse_buffer_file_name, session_id_of};
pub use reader::{BufferLine, BufferLines, BufferReader, BufferValidation};
