//! Test helpers for behavioral specifications.
//!
//! `Project` owns a temporary data directory; `kiln()` runs the CLI against
//! it and `kilnd()` starts a daemon on it.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::time::Duration;
use tempfile::TempDir;

/// Every weekday offers an 18:00 class with `capacity` seats for a week
pub fn daily_config(capacity: u32) -> String {
    let mut toml = String::from("[studio]\nhorizon_days = 7\nbooking_prefix = \"SPEC\"\n");
    for day in [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ] {
        toml.push_str(&format!(
            "\n[[schedule]]\nday = \"{day}\"\ntimes = [\"18:00\"]\nmax_capacity = {capacity}\n"
        ));
    }
    toml
}

/// Today's date key in the host timezone
pub fn today() -> String {
    days_from_today(0)
}

pub fn days_from_today(days: u64) -> String {
    let date = chrono::Local::now().date_naive() + chrono::Days::new(days);
    date.format("%Y-%m-%d").to_string()
}

/// Booking flags for a valid attendee
pub fn attendee() -> [&'static str; 8] {
    [
        "--name",
        "Jane Potter",
        "--email",
        "jane@example.com",
        "--phone",
        "0412345678",
        "--experience",
        "beginner",
    ]
}

pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Data directory without a config file
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Data directory with a daily schedule of `capacity` seats
    pub fn daily(capacity: u32) -> Self {
        let project = Self::empty();
        project.file("kiln.toml", &daily_config(capacity));
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str, content: &str) {
        std::fs::write(self.path().join(name), content).unwrap();
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path().join(name)).unwrap_or_default()
    }

    pub fn kiln(&self) -> CliBuilder {
        CliBuilder::new(self.path())
    }

    /// Start kilnd and wait for it to report READY
    pub fn kilnd(&self) -> Daemon {
        let mut child = Command::new(assert_cmd::cargo::cargo_bin("kilnd"))
            .arg(self.path())
            .env("RUST_LOG", "info")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();

        let mut line = String::new();
        if let Some(stdout) = child.stdout.take() {
            BufReader::new(stdout).read_line(&mut line).unwrap();
        }
        assert_eq!(line.trim(), "READY");

        Daemon {
            child,
            socket: self.path().join("kilnd.sock"),
        }
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    fn new(data_dir: &Path) -> Self {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("kiln"));
        cmd.env_remove("KILN_DATA_DIR")
            .env_remove("KILN_ACTOR")
            .env("KILN_LOG", "off")
            .arg("--data-dir")
            .arg(data_dir);
        Self { cmd }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.cmd.env(key, value);
        self
    }

    fn run(mut self) -> RunAssert {
        RunAssert {
            output: self.cmd.output().unwrap(),
        }
    }

    /// Run and require exit code 0
    pub fn passes(self) -> RunAssert {
        let run = self.run();
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstderr:\n{}",
            run.output.status,
            run.stderr()
        );
        run
    }

    /// Run and require a non-zero exit code
    pub fn fails(self) -> RunAssert {
        let run = self.run();
        assert!(
            !run.output.status.success(),
            "expected failure\nstdout:\n{}",
            run.stdout()
        );
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain {expected:?}:\n{stdout}"
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain {expected:?}:\n{stderr}"
        );
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn code(self, expected: i32) -> Self {
        assert_eq!(self.output.status.code(), Some(expected));
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.output.stdout).unwrap()
    }
}

pub struct Daemon {
    child: Child,
    pub socket: PathBuf,
}

impl Daemon {
    /// Send one request frame and read the response frame
    pub fn request(&self, request: serde_json::Value) -> serde_json::Value {
        let mut stream = UnixStream::connect(&self.socket).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();

        let body = serde_json::to_vec(&request).unwrap();
        stream.write_all(&(body.len() as u32).to_be_bytes()).unwrap();
        stream.write_all(&body).unwrap();

        let mut len = [0u8; 4];
        stream.read_exact(&mut len).unwrap();
        let mut reply = vec![0u8; u32::from_be_bytes(len) as usize];
        stream.read_exact(&mut reply).unwrap();
        serde_json::from_slice(&reply).unwrap()
    }

    /// Ask the daemon to stop and wait for it to exit
    pub fn shutdown(mut self) -> ExitStatus {
        let response = self.request(serde_json::json!({"action": "shutdown"}));
        assert_eq!(response["success"], serde_json::Value::Bool(true));
        self.child.wait().unwrap()
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        // No-op when the daemon already exited
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
