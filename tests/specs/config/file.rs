//! Configuration specs
//!
//! Verify the TOML file, its environment variable and log file output.

use crate::prelude::*;

fn config_for(temp: &Project, buffers: &str, store: &str) -> std::path::PathBuf {
    temp.file(
        "labcap.toml",
        &format!(
            "[buffer]\ndir = {:?}\nflush_threshold = 10\n\n[store]\ndir = {:?}\n",
            temp.path().join(buffers).display().to_string(),
            temp.path().join(store).display().to_string(),
        ),
    )
}

#[test]
fn config_file_sets_directories() {
    let temp = Project::empty();
    let config = config_for(&temp, "cfg-buffers", "cfg-store");

    temp.labcap_bare()
        .arg("--config")
        .arg(&config)
        .args(&["capture", "--session", "4", "--count", "1", "--no-close"])
        .passes();
    assert!(temp.path().join("cfg-buffers/session_4_buffer.log").exists());

    temp.labcap_bare()
        .arg("--config")
        .arg(&config)
        .args(&["recover"])
        .passes();
    assert!(temp.path().join("cfg-store/sessions/4.json").exists());
}

#[test]
fn config_from_environment() {
    let temp = Project::empty();
    let config = config_for(&temp, "env-buffers", "env-store");

    temp.labcap_bare()
        .env("LABCAP_CONFIG", &config)
        .args(&["capture", "--session", "2", "--count", "1"])
        .passes();
    assert!(temp.path().join("env-buffers/session_2_buffer.log").exists());
}

#[test]
fn flags_override_config_file() {
    let temp = Project::empty();
    let config = config_for(&temp, "cfg-buffers", "cfg-store");

    temp.labcap()
        .arg("--config")
        .arg(&config)
        .args(&["capture", "--session", "9", "--count", "1"])
        .passes();
    assert!(temp.buffer(9).exists());
    assert!(!temp.path().join("cfg-buffers").exists());
}

#[test]
fn defaults_live_under_state_home() {
    let temp = Project::empty();
    temp.labcap_bare()
        .args(&["capture", "--session", "1", "--count", "1"])
        .passes();
    assert!(temp
        .path()
        .join("state/labcap/buffers/session_1_buffer.log")
        .exists());
}

#[test]
fn log_file_receives_recovery_logs() {
    let temp = Project::empty();
    temp.file(
        "buffers/session_5_buffer.log",
        &format!("{}\n", start_line(5)),
    );

    temp.labcap()
        .args(&["--log-file", "logs/labcap.log", "recover"])
        .env("RUST_LOG", "info")
        .passes();

    let log = std::fs::read_to_string(temp.path().join("logs/labcap.log")).unwrap();
    assert!(log.contains("buffer replayed"), "log:\n{}", log);
}
