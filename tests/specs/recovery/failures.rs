//! Recovery failure specs
//!
//! Files that cannot be recovered are kept and reported, and the exit code
//! says so.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[test]
fn corrupt_buffer_is_kept_and_reported() {
    let temp = Project::empty();
    let corrupt = temp.file("buffers/session_13_buffer.log", "#!$ not json\n");
    temp.file(
        "buffers/session_14_buffer.log",
        &format!("{}\n{}\n", start_line(14), measurement_line(1)),
    );

    let run = temp.labcap().args(&["recover", "--format", "json"]).fails();
    assert_eq!(run.code(), Some(1));

    let summary = run.json();
    assert_eq!(summary["recovered_sessions"], 1);
    assert_eq!(
        summary["failed_files"][0]["path"],
        corrupt.display().to_string()
    );
    assert!(corrupt.exists());
    assert!(!temp.buffer(14).exists());
}

#[test]
fn failed_files_are_listed_in_text_output() {
    let temp = Project::empty();
    temp.file("buffers/session_2_buffer.log", "");

    temp.labcap()
        .args(&["recover"])
        .fails()
        .stdout_has("failed:")
        .stdout_has("session_2_buffer.log")
        .stdout_has("empty");
}

#[test]
fn unrelated_files_are_ignored() {
    let temp = Project::empty();
    temp.file("buffers/notes.txt", "hello");
    temp.file("buffers/session_1_buffer.log.bak", "junk");

    temp.labcap()
        .args(&["recover"])
        .passes()
        .stdout_has("recovered 0 session(s)");
    assert!(temp.buffers().join("notes.txt").exists());
}

#[test]
fn corrupt_buffer_survives_repeated_startups() {
    let temp = Project::empty();
    let corrupt = temp.file("buffers/session_6_buffer.log", "{\"type\":\"measurement\"}\n");

    temp.labcap().args(&["recover"]).fails();
    temp.labcap().args(&["recover"]).fails();

    assert!(corrupt.exists());
    temp.labcap()
        .args(&["list"])
        .passes()
        .stdout_has("corrupt");
}
