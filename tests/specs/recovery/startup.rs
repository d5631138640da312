//! Startup recovery specs
//!
//! Verify that abandoned buffers are replayed into the store and removed.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn crashed_session_is_recovered_into_store() {
    let temp = Project::empty();
    temp.labcap()
        .args(&[
            "--flush-threshold",
            "100",
            "capture",
            "--session",
            "42",
            "--count",
            "150",
            "--no-close",
        ])
        .passes();

    temp.labcap()
        .args(&["recover"])
        .passes()
        .stdout_has("recovered 1 session(s), 150 measurement(s)");

    assert!(!temp.buffer(42).exists());
    let row = temp.stored_session(42);
    assert_eq!(row["measurement_count"], 150);
    assert!(row["ended_at"].is_string());
    assert_eq!(row["device_metadata"]["model"], "synthetic");
    assert_eq!(temp.stored_measurements(42), 150);
}

#[test]
fn start_only_buffer_is_recovered_with_zero_measurements() {
    let temp = Project::empty();
    temp.file(
        "buffers/session_5_buffer.log",
        &format!("{}\n", start_line(5)),
    );

    let summary = temp
        .labcap()
        .args(&["recover", "--format", "json"])
        .passes()
        .json();

    assert_eq!(summary["recovered_sessions"], 1);
    assert_eq!(summary["recovered_measurements"], 0);
    assert_eq!(temp.stored_session(5)["measurement_count"], 0);
    assert!(!temp.buffer(5).exists());
}

#[test]
fn closed_buffer_is_removed_without_replay() {
    let temp = Project::empty();
    temp.labcap()
        .args(&["capture", "--session", "3", "--count", "2"])
        .passes();

    let summary = temp
        .labcap()
        .args(&["recover", "--format", "json"])
        .passes()
        .json();

    assert_eq!(summary["closed_buffers_removed"], 1);
    assert_eq!(summary["recovered_sessions"], 0);
    assert!(!temp.buffer(3).exists());
    assert!(!temp.store().join("sessions/3.json").exists());
}

#[test]
fn recover_with_nothing_to_do() {
    let temp = Project::empty();
    temp.labcap()
        .args(&["recover"])
        .passes()
        .stdout_eq("recovered 0 session(s), 0 measurement(s)\n");
}

#[test]
fn torn_last_line_is_skipped() {
    let temp = Project::empty();
    let content = format!(
        "{}\n{}\n{}\n{}",
        start_line(11),
        measurement_line(1),
        measurement_line(2),
        r#"{"type":"measurement","captured_at":"2024-03-01T09:0"#
    );
    temp.file("buffers/session_11_buffer.log", &content);

    temp.labcap()
        .args(&["recover"])
        .passes()
        .stdout_has("2 measurement(s)")
        .stdout_has("skipped 1 unreadable line(s)");

    assert_eq!(temp.stored_measurements(11), 2);
    assert_eq!(
        temp.stored_session(11)["ended_at"],
        "2024-03-01T09:00:02Z"
    );
}
