//! Calendar specs

use crate::prelude::*;

#[test]
fn grid_has_a_header_and_legend() {
    Project::daily(6)
        .kiln()
        .args(["calendar"])
        .passes()
        .stdout_has(" Su  Mo  Tu  We  Th  Fr  Sa")
        .stdout_has("+ open   x full   ~ offline");
}

#[test]
fn explicit_month_is_titled() {
    Project::daily(6)
        .kiln()
        .args(["calendar", "--month", "2031-02"])
        .passes()
        .stdout_has("February 2031");
}

#[test]
fn selected_day_lists_its_times() {
    let project = Project::daily(1);
    project
        .kiln()
        .args(["book", "--date", &today(), "--time", "18:00"])
        .args(attendee())
        .passes();

    project
        .kiln()
        .args(["calendar", "--select", &today()])
        .passes()
        .stdout_has("6:00 PM  full");
}

#[test]
fn json_grid_has_six_weeks() {
    let run = Project::daily(6)
        .kiln()
        .args(["calendar", "--json"])
        .passes();

    let view = run.json();
    assert_eq!(view["cells"].as_array().unwrap().len(), 42);
    assert_eq!(view["today"], today());
}
