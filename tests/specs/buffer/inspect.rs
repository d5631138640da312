//! Inspect specs
//!
//! Verify inspect reports buffer contents without modifying the file.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn inspect_orphaned_buffer() {
    let temp = Project::empty();
    temp.labcap()
        .args(&["capture", "--session", "42", "--count", "5", "--no-close"])
        .passes();

    temp.labcap_bare()
        .arg("inspect")
        .arg(temp.buffer(42))
        .passes()
        .stdout_has("Status: orphaned")
        .stdout_has("Session: 42")
        .stdout_has("Measurements: 5")
        .stdout_has("Audit events: 1");

    assert!(temp.buffer(42).exists());
}

#[test]
fn inspect_reports_torn_tail_as_json() {
    let temp = Project::empty();
    let content = format!(
        "{}\n{}\n{}",
        start_line(3),
        measurement_line(1),
        r#"{"type":"measurement","captured_at":"2024-"#
    );
    let path = temp.file("buffers/session_3_buffer.log", &content);

    let report = temp
        .labcap_bare()
        .arg("inspect")
        .arg(&path)
        .args(&["--format", "json"])
        .passes()
        .json();

    assert_eq!(report["status"], "orphaned");
    assert_eq!(report["measurements"], 1);
    assert_eq!(report["torn_tail"], true);
    assert_eq!(report["parse_errors"][0]["line"], 3);
}

#[test]
fn inspect_corrupt_buffer() {
    let temp = Project::empty();
    let path = temp.file("buffers/session_9_buffer.log", "garbage\n");

    temp.labcap_bare()
        .arg("inspect")
        .arg(&path)
        .passes()
        .stdout_has("Status: corrupt")
        .stdout_has("line 1");
}
