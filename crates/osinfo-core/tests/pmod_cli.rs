//! End-to-end tests for the `pmod` binary.
//!
//! `nice(2)` is irreversible for a process, so demotion only ever runs in a
//! child process.

use assert_cmd::Command;
use predicates::prelude::*;
use std::time::{Duration, Instant};

fn pmod() -> Command {
    let mut cmd = Command::cargo_bin("pmod").expect("pmod binary should exist");
    cmd.timeout(Duration::from_secs(30))
        .env_remove("RUST_LOG")
        .env_remove("OSINFO_LOG");
    cmd
}

#[test]
fn demotes_then_pauses() {
    let start = Instant::now();
    pmod()
        .assert()
        .success()
        .stdout("Priority successfully reduced by 10.\nGoodbye! Process exiting.\n")
        .stderr(predicate::str::is_empty());
    assert!(start.elapsed() >= Duration::from_millis(1_800));
}

#[test]
fn json_report() {
    let output = pmod().args(["--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["delta"], 10);
    assert_eq!(report["pause_ms"], 1837);
    assert!(report["nice"].is_i64());
}

#[test]
fn arguments_are_rejected() {
    let start = Instant::now();
    pmod().arg("5").assert().code(1);
    assert!(start.elapsed() < Duration::from_millis(1_800));
}
