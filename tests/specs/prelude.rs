//! Shared fixtures for CLI specs

#![allow(dead_code)]

pub use serde_json::Value;
pub use similar_asserts::assert_eq;

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;

/// A scratch directory with its own buffer, store and state directories
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn buffers(&self) -> PathBuf {
        self.path().join("buffers")
    }

    pub fn store(&self) -> PathBuf {
        self.path().join("store")
    }

    pub fn buffer(&self, session_id: u64) -> PathBuf {
        self.buffers()
            .join(format!("session_{}_buffer.log", session_id))
    }

    /// Write a file relative to the project root
    pub fn file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// labcap pointed at this project's directories
    pub fn labcap(&self) -> CliBuilder {
        let mut builder = self.labcap_bare();
        builder
            .cmd
            .arg("--buffer-dir")
            .arg(self.buffers())
            .arg("--store-dir")
            .arg(self.store());
        builder
    }

    /// labcap with only the state directory isolated
    pub fn labcap_bare(&self) -> CliBuilder {
        let mut cmd = Command::cargo_bin("labcap").unwrap();
        cmd.current_dir(self.path())
            .env("XDG_STATE_HOME", self.path().join("state"))
            .env_remove("LABCAP_CONFIG")
            .env_remove("RUST_LOG");
        CliBuilder { cmd }
    }

    /// Session row written by the JSON store
    pub fn stored_session(&self, session_id: u64) -> Value {
        let path = self.store().join(format!("sessions/{}.json", session_id));
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    /// Number of measurement rows in the JSON store
    pub fn stored_measurements(&self, session_id: u64) -> usize {
        let path = self.store().join(format!("measurements/{}.jsonl", session_id));
        std::fs::read_to_string(path)
            .map(|s| s.lines().filter(|l| !l.trim().is_empty()).count())
            .unwrap_or(0)
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn arg(mut self, arg: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.arg(arg);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    /// Run and require exit code 0
    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            run.output.status.code(),
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and require a non-zero exit code
    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert { output };
        assert!(
            !run.output.status.success(),
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            run.stdout(),
            run.stderr()
        );
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn stdout_has(&self, expected: &str) -> &Self {
        let stdout = self.stdout();
        assert!(
            predicate::str::contains(expected).eval(&stdout),
            "stdout missing {:?}:\n{}",
            expected,
            stdout
        );
        self
    }

    pub fn stdout_lacks(&self, unexpected: &str) -> &Self {
        let stdout = self.stdout();
        assert!(
            !predicate::str::contains(unexpected).eval(&stdout),
            "stdout unexpectedly has {:?}:\n{}",
            unexpected,
            stdout
        );
        self
    }

    pub fn stderr_has(&self, expected: &str) -> &Self {
        let stderr = self.stderr();
        assert!(
            predicate::str::contains(expected).eval(&stderr),
            "stderr missing {:?}:\n{}",
            expected,
            stderr
        );
        self
    }

    pub fn stdout_eq(&self, expected: &str) -> &Self {
        assert_eq!(self.stdout(), expected.to_string());
        self
    }

    /// Parse stdout as JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout()).unwrap()
    }
}

/// Encoded `SessionStart` line for hand-built buffers
pub fn start_line(session_id: u64) -> String {
    format!(
        r#"{{"type":"session_start","session_id":{},"started_at":"2024-03-01T09:00:00Z","device_metadata":{{"model":"XR-200"}},"session_metadata":{{}}}}"#,
        session_id
    )
}

/// Encoded `Measurement` line for hand-built buffers
pub fn measurement_line(second: u32) -> String {
    format!(
        r#"{{"type":"measurement","captured_at":"2024-03-01T09:00:{:02}Z","raw_frame":"AAE=","decoded_payload":{{"v":{}}},"derived_metrics":{{}}}}"#,
        second, second
    )
}
