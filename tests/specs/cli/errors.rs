//! CLI error specs

use crate::prelude::*;

#[test]
fn unknown_command_fails() {
    let temp = Project::empty();
    temp.labcap_bare().args(&["replay-all"]).fails();
}

#[test]
fn inspect_missing_file_fails() {
    let temp = Project::empty();
    temp.labcap_bare()
        .args(&["inspect", "nope/session_1_buffer.log"])
        .fails()
        .stderr_has("cannot read");
}

#[test]
fn zero_flush_threshold_is_rejected() {
    let temp = Project::empty();
    temp.labcap()
        .args(&["--flush-threshold", "0", "capture", "--session", "1"])
        .fails()
        .stderr_has("flush");
    assert!(!temp.buffer(1).exists());
}

#[test]
fn missing_config_file_fails() {
    let temp = Project::empty();
    temp.labcap()
        .args(&["--config", "absent.toml", "list"])
        .fails()
        .stderr_has("absent.toml");
}
