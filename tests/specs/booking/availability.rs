//! Availability specs

use crate::prelude::*;

#[test]
fn first_read_seeds_the_week() {
    let project = Project::daily(6);

    let run = project.kiln().args(["availability", "--json"]).passes();
    let rows = run.json();
    let rows = rows.as_array().unwrap();

    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0]["dateKey"], today());
    assert_eq!(rows[7]["dateKey"], days_from_today(7));
    assert!(rows.iter().all(|r| r["offline"] == false));
}

#[test]
fn seed_extends_then_reports_nothing_to_do() {
    let project = Project::daily(6);

    project
        .kiln()
        .args(["seed"])
        .passes()
        .stdout_eq("Seeded 8 new class dates\n");
    project
        .kiln()
        .args(["seed"])
        .passes()
        .stdout_eq("Schedule already covers the booking horizon\n");
}

#[test]
fn text_rows_show_booked_over_capacity() {
    let project = Project::daily(6);

    project
        .kiln()
        .args(["availability"])
        .passes()
        .stdout_has(&today())
        .stdout_has("6:00 PM")
        .stdout_has("0/6 booked  6 left");
}

#[test]
fn document_backend_behaves_the_same() {
    let project = Project::empty();
    project.file(
        "kiln.toml",
        &format!("{}\n[store]\nbackend = \"document\"\n", daily_config(2)),
    );

    project
        .kiln()
        .args(["book", "--date", &today(), "--time", "18:00"])
        .args(attendee())
        .passes();

    project
        .kiln()
        .args(["availability"])
        .passes()
        .stdout_has("1/2 booked  1 left");
}
