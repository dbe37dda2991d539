//! Booking submission specs

use crate::prelude::*;

fn book(project: &Project, date: &str) -> RunAssert {
    project
        .kiln()
        .args(["book", "--json", "--date", date, "--time", "18:00"])
        .args(attendee())
        .passes()
}

#[test]
fn confirmed_booking_is_persisted() {
    let project = Project::daily(6);

    let booking = book(&project, &today()).json();
    let id = booking["id"].as_str().unwrap();

    assert!(id.starts_with("SPEC-"));
    assert_eq!(booking["status"], "confirmed");
    assert_eq!(booking["attendee"]["full_name"], "Jane Potter");

    project
        .kiln()
        .args(["show", id])
        .passes()
        .stdout_has(&format!("Booking: {id}"))
        .stdout_has("Experience: beginner");
}

#[test]
fn actor_is_recorded() {
    let project = Project::daily(6);

    let booking = project
        .kiln()
        .args(["book", "--json", "--date", &today(), "--time", "18:00"])
        .args(attendee())
        .env("KILN_ACTOR", "front-desk")
        .passes()
        .json();

    assert_eq!(booking["actor"], "front-desk");
}

#[test]
fn capacity_is_never_exceeded() {
    let project = Project::daily(2);

    book(&project, &today());
    book(&project, &today());
    project
        .kiln()
        .args(["book", "--date", &today(), "--time", "18:00"])
        .args(attendee())
        .fails()
        .stderr_has("That class just filled up");

    // Other days are unaffected
    book(&project, &days_from_today(1));

    project
        .kiln()
        .args(["reconcile"])
        .passes()
        .stdout_has("seat counters consistent");
}

#[test]
fn every_invalid_field_is_reported_at_once() {
    Project::daily(6)
        .kiln()
        .args(["book", "--date", &today(), "--time", "18:00"])
        .args(["--name", "J", "--email", "jane@", "--phone", "12"])
        .fails()
        .stderr_has("error: Please correct: fullName, email, phone, experience");
}

#[test]
fn date_outside_the_schedule_is_not_offered() {
    Project::daily(6)
        .kiln()
        .args(["book", "--date", &days_from_today(60), "--time", "18:00"])
        .args(attendee())
        .fails()
        .stderr_has("No class is offered at that date and time");
}

#[test]
fn confirmation_is_spooled() {
    let project = Project::daily(6);
    book(&project, &today());

    let spool = project.read("outbox.jsonl");
    let lines: Vec<&str> = spool.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("jane@example.com"));
}
