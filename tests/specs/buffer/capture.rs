//! Capture specs
//!
//! Verify synthetic capture writes through a session buffer.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn closed_capture_leaves_closed_buffer() {
    let temp = Project::empty();
    temp.labcap()
        .args(&["capture", "--session", "7", "--count", "3"])
        .passes()
        .stdout_has("Captured 3 measurement(s) for session 7");

    let content = std::fs::read_to_string(temp.buffer(7)).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    // start + 3 measurements + audit event + end
    assert_eq!(lines.len(), 6);
    assert!(lines[0].contains(r#""type":"session_start""#));
    assert!(lines[5].contains(r#""type":"session_end""#));
    assert!(lines[5].contains(r#""measurement_count":3"#));
}

#[test]
fn no_close_leaves_orphaned_buffer() {
    let temp = Project::empty();
    temp.labcap()
        .args(&["capture", "--session", "8", "--count", "4", "--no-close"])
        .passes()
        .stdout_has("(left open)");

    temp.labcap()
        .args(&["list"])
        .passes()
        .stdout_has("orphaned")
        .stdout_has("session_8_buffer.log");
}

#[test]
fn capture_recovers_leftovers_first() {
    let temp = Project::empty();
    temp.labcap()
        .args(&["capture", "--session", "1", "--count", "2", "--no-close"])
        .passes();

    temp.labcap()
        .args(&["capture", "--session", "2", "--count", "1", "--no-close"])
        .passes();

    assert!(!temp.buffer(1).exists());
    assert!(temp.buffer(2).exists());
    assert_eq!(temp.stored_measurements(1), 2);
}

#[test]
fn list_empty_directory() {
    let temp = Project::empty();
    temp.labcap().args(&["list"]).passes().stdout_has("No buffers");
}

#[test]
fn capture_keeps_buffer_that_failed_recovery() {
    let temp = Project::empty();
    let evidence = "{{{{ garbage first line\nforensic evidence\n";
    let corrupt = temp.file("buffers/session_5_buffer.log", evidence);

    temp.labcap()
        .args(&["capture", "--session", "5", "--count", "2"])
        .fails()
        .stderr_has("kept by recovery");

    assert_eq!(std::fs::read_to_string(&corrupt).unwrap(), evidence);
}

#[test]
fn capture_other_session_leaves_failed_buffer_alone() {
    let temp = Project::empty();
    let corrupt = temp.file("buffers/session_5_buffer.log", "garbage\n");

    temp.labcap()
        .args(&["capture", "--session", "6", "--count", "1"])
        .passes();

    assert_eq!(std::fs::read_to_string(&corrupt).unwrap(), "garbage\n");
    assert!(temp.buffer(6).exists());
}
