//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_every_command() {
    let project = Project::empty();
    let run = project.kiln().args(["--help"]).passes();
    for command in [
        "seed",
        "availability",
        "calendar",
        "book",
        "show",
        "reconcile",
    ] {
        assert!(run.stdout().contains(command), "missing {command}");
    }
}

#[test]
fn book_help_names_the_form_fields() {
    Project::empty()
        .kiln()
        .args(["book", "--help"])
        .passes()
        .stdout_has("--date")
        .stdout_has("--experience")
        .stdout_has("--actor");
}

#[test]
fn version_is_printed() {
    Project::empty()
        .kiln()
        .args(["--version"])
        .passes()
        .stdout_has("kiln ");
}
