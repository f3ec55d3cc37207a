//! End-to-end tests for the `finfo` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tempfile::TempDir;

fn finfo() -> Command {
    Command::cargo_bin("finfo").expect("finfo binary should exist")
}

fn file_with_mode(dir: &TempDir, name: &str, contents: &[u8], mode: u32) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    fs::set_permissions(&path, fs::Permissions::from_mode(mode)).expect("chmod fixture");
    path
}

#[test]
fn regular_file_report() {
    let dir = TempDir::new().unwrap();
    let path = file_with_mode(&dir, "notes.txt", b"hello world", 0o644);

    finfo()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("File: {}", path.display())))
        .stdout(predicate::str::contains("Size: 11 bytes"))
        .stdout(predicate::str::contains("Permissions: -rw-r--r--"))
        .stdout(predicate::str::contains("Owner: "))
        .stdout(predicate::str::contains("Group: "))
        .stdout(predicate::str::is_match(r"Last modified: \d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\n").unwrap());
}

#[test]
fn executable_mode_bits() {
    let dir = TempDir::new().unwrap();
    let path = file_with_mode(&dir, "run.sh", b"#!/bin/sh\n", 0o750);

    finfo()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Permissions: -rwxr-x---"));
}

#[test]
fn directory_gets_d_glyph() {
    let dir = TempDir::new().unwrap();

    finfo()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Permissions: d"));
}

#[test]
fn symlink_is_followed_by_default() {
    let dir = TempDir::new().unwrap();
    let target = file_with_mode(&dir, "target", b"abc", 0o600);
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    finfo()
        .arg(&link)
        .assert()
        .success()
        .stdout(predicate::str::contains("Permissions: -rw-------"))
        .stdout(predicate::str::contains("Size: 3 bytes"));
}

#[test]
fn no_follow_describes_the_link() {
    let dir = TempDir::new().unwrap();
    let target = file_with_mode(&dir, "target", b"abc", 0o600);
    let link = dir.path().join("link");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    finfo()
        .args(["--no-follow"])
        .arg(&link)
        .assert()
        .success()
        .stdout(predicate::str::contains("Permissions: l"));
}

#[test]
fn missing_file_fails_with_stat_error() {
    let dir = TempDir::new().unwrap();

    finfo()
        .arg(dir.path().join("does-not-exist"))
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("stat: No such file or directory"));
}

#[test]
fn missing_argument_is_usage_error() {
    finfo().assert().code(1).stderr(predicate::str::contains("Usage"));
}

#[test]
fn extra_argument_is_usage_error() {
    finfo().args(["a", "b"]).assert().code(1);
}

#[test]
fn json_format() {
    let dir = TempDir::new().unwrap();
    let path = file_with_mode(&dir, "data.bin", &[0u8; 42], 0o640);

    let output = finfo()
        .args(["--format", "json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["size"], 42);
    assert_eq!(report["permissions"], "-rw-r-----");
    assert!(report["owner"].is_string());
}

#[test]
fn json_error_is_structured() {
    let dir = TempDir::new().unwrap();

    finfo()
        .args(["--format", "json"])
        .arg(dir.path().join("nope"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\"code\": \"ERR_QUERY\""))
        .stderr(predicate::str::contains("\"operation\": \"stat\""));
}

#[test]
fn help_exits_zero() {
    finfo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-follow"));
}
