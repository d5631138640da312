//! Help and version specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();
    temp.labcap_bare()
        .args(&["--help"])
        .passes()
        .stdout_has("recover")
        .stdout_has("inspect")
        .stdout_has("list")
        .stdout_has("capture");
}

#[test]
fn version_prints_package_version() {
    let temp = Project::empty();
    temp.labcap_bare()
        .args(&["--version"])
        .passes()
        .stdout_has("labcap ");
}

#[test]
fn recover_help_mentions_format() {
    let temp = Project::empty();
    temp.labcap_bare()
        .args(&["recover", "--help"])
        .passes()
        .stdout_has("--format");
}
