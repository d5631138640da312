// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file and path resolution
//!
//! Precedence: command-line flags, then the TOML file, then defaults under
//! the XDG state directory.

use anyhow::{Context, Result};
use labcap_storage::{BufferConfig, DEFAULT_FLUSH_THRESHOLD};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of `labcap.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub buffer: BufferSection,
    pub store: StoreSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BufferSection {
    pub dir: Option<PathBuf>,
    pub flush_threshold: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub buffer_dir: Option<PathBuf>,
    pub store_dir: Option<PathBuf>,
    pub flush_threshold: Option<u32>,
}

/// Fully resolved settings for a command
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub buffer: BufferConfig,
    pub store_dir: PathBuf,
}

impl Settings {
    /// Merge flags over the file; `default_root` is consulted only for
    /// paths neither of them sets
    pub fn resolve(
        file: FileConfig,
        overrides: Overrides,
        default_root: impl Fn() -> Result<PathBuf>,
    ) -> Result<Self> {
        let buffer_dir = match overrides.buffer_dir.or(file.buffer.dir) {
            Some(dir) => dir,
            None => default_root()?.join("buffers"),
        };
        let store_dir = match overrides.store_dir.or(file.store.dir) {
            Some(dir) => dir,
            None => default_root()?.join("store"),
        };
        let flush_threshold = overrides
            .flush_threshold
            .or(file.buffer.flush_threshold)
            .unwrap_or(DEFAULT_FLUSH_THRESHOLD);

        let buffer = BufferConfig::new(buffer_dir).with_flush_threshold(flush_threshold);
        buffer.validate()?;
        Ok(Self { buffer, store_dir })
    }
}

/// Default data root: `$XDG_STATE_HOME/labcap` or `~/.local/state/labcap`
pub fn state_dir() -> Result<PathBuf> {
    state_dir_from(
        std::env::var_os("XDG_STATE_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn state_dir_from(xdg_state_home: Option<PathBuf>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = xdg_state_home.filter(|d| d.is_absolute()) {
        return Ok(dir.join("labcap"));
    }
    let home = home.context("cannot determine state directory: neither XDG_STATE_HOME nor HOME is set")?;
    Ok(home.join(".local/state/labcap"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
