//! Socket protocol specs
//!
//! Frames are a 4-byte big-endian length and a JSON body.

use crate::prelude::*;
use serde_json::json;

#[test]
fn ping_answers_pong() {
    let project = Project::daily(6);
    let daemon = project.kilnd();

    let response = daemon.request(json!({"action": "ping"}));

    assert_eq!(response["success"], true);
    assert_eq!(response["message"], "pong");
    daemon.shutdown();
}

#[test]
fn availability_is_keyed_by_date() {
    let project = Project::daily(6);
    let daemon = project.kilnd();

    let response = daemon.request(json!({"action": "getAvailability"}));

    let slots = response["slots"].as_object().unwrap();
    assert_eq!(slots.len(), 8);
    let first = &slots[&today()];
    assert_eq!(first["times"], json!(["18:00"]));
    assert_eq!(first["maxCapacity"], 6);
    assert_eq!(first["available"], 6);
    assert_eq!(response["offline"], false);
    daemon.shutdown();
}

#[test]
fn submit_booking_returns_a_reference() {
    let project = Project::daily(1);
    let daemon = project.kilnd();
    let request = json!({
        "action": "submitBooking",
        "data": {
            "dateKey": today(),
            "time": "18:00",
            "classType": "regular",
            "fullName": "Jane Potter",
            "email": "jane@example.com",
            "phone": "0412345678",
            "experience": "beginner"
        }
    });

    let first = daemon.request(request.clone());
    let second = daemon.request(request);

    assert_eq!(first["success"], true);
    assert!(first["bookingId"].as_str().unwrap().starts_with("SPEC-"));
    assert_eq!(second["success"], false);
    assert_eq!(second["outcome"], "conflict");
    daemon.shutdown();

    project
        .kiln()
        .args(["show", first["bookingId"].as_str().unwrap()])
        .passes()
        .stdout_has("Name: Jane Potter");
}

#[test]
fn validation_errors_are_listed() {
    let project = Project::daily(6);
    let daemon = project.kilnd();

    let response = daemon.request(json!({
        "action": "submitBooking",
        "data": {"dateKey": today(), "time": "18:00", "classType": "regular"}
    }));

    assert_eq!(response["success"], false);
    assert_eq!(response["outcome"], "rejected");
    let fields: Vec<&str> = response["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["fullName", "email", "phone", "experience"]);
    daemon.shutdown();
}

#[test]
fn unknown_action_is_answered() {
    let project = Project::daily(6);
    let daemon = project.kilnd();

    let response = daemon.request(json!({"action": "updateAvailability"}));

    assert_eq!(response["success"], false);
    assert_eq!(response["message"], "Invalid action");
    daemon.shutdown();
}
