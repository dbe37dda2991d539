//! Daemon lifecycle specs
//!
//! Verify kilnd start, exclusive ownership of the data directory and
//! shutdown.

use crate::prelude::*;

#[test]
fn daemon_creates_socket_and_log() {
    let project = Project::daily(6);
    let daemon = project.kilnd();

    assert!(daemon.socket.exists());
    assert!(project.read("kilnd.log").contains("--- kilnd: starting (pid: "));

    daemon.shutdown();
}

#[test]
fn daemon_removes_socket_on_shutdown() {
    let project = Project::daily(6);
    let daemon = project.kilnd();
    let socket = daemon.socket.clone();

    let status = daemon.shutdown();

    assert!(status.success());
    assert!(!socket.exists());
}

#[test]
fn cli_is_locked_out_while_daemon_runs() {
    let project = Project::daily(6);
    let daemon = project.kilnd();

    project
        .kiln()
        .args(["availability"])
        .fails()
        .stderr_has("is in use");

    daemon.shutdown();
    project.kiln().args(["availability"]).passes();
}

#[test]
fn daemon_seeds_the_horizon_at_startup() {
    let project = Project::daily(6);
    project.kilnd().shutdown();

    project
        .kiln()
        .args(["seed"])
        .passes()
        .stdout_has("already covers");
}

#[test]
fn invalid_config_stops_startup() {
    let project = Project::empty();
    project.file("kiln.toml", "[store]\nbackend = \"paper\"\n");

    let status = std::process::Command::new(assert_cmd::cargo::cargo_bin("kilnd"))
        .arg(project.path())
        .stdout(std::process::Stdio::null())
        .status()
        .unwrap();

    assert!(!status.success());
    assert!(project.read("kilnd.log").contains("ERROR Failed to start daemon"));
    assert!(!project.path().join("kilnd.sock").exists());
}
