//! Integration tests for the ocfl-audit binary.
//!
//! These tests exercise the full CLI against on-disk fixtures and check
//! exit status, stdout and stderr.

mod common;

use assert_cmd::Command;
use common::{ro_crate, StorageRoot, CATALOG};
use predicates::prelude::*;
use tempfile::TempDir;

/// A command for the binary, isolated from the user's configuration.
fn ocfl_audit(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ocfl-audit").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("OCFL_AUDIT_CONFIG")
        .env_remove("OCFL_AUDIT_LOG");
    cmd
}

fn clean_repo() -> StorageRoot {
    let root = StorageRoot::new();
    let catalog = ro_crate(Some("obj-1"), &["a.txt"]);
    root.object("obj1")
        .version(&[(CATALOG, &catalog), ("a.txt", b"a")])
        .write();
    root
}

fn drifted_repo() -> StorageRoot {
    let root = StorageRoot::new();
    let catalog = ro_crate(Some("obj-1"), &["a.txt"]);
    root.object("obj1")
        .version(&[(CATALOG, &catalog), ("a.txt", b"a")])
        .version(&[(CATALOG, &catalog)])
        .write();
    root
}

#[test]
fn version_flag_works() {
    let home = TempDir::new().unwrap();
    ocfl_audit(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ocfl-audit"));
}

#[test]
fn help_describes_exit_status() {
    let home = TempDir::new().unwrap();
    ocfl_audit(&home)
        .args(["check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EXIT STATUS"));
}

#[test]
fn clean_repository_exits_zero() {
    let home = TempDir::new().unwrap();
    let root = clean_repo();

    ocfl_audit(&home)
        .arg("check")
        .arg("--repo")
        .arg(root.path())
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Result: clean"));
}

#[test]
fn drift_exits_two_with_greppable_code() {
    let home = TempDir::new().unwrap();
    let root = drifted_repo();

    ocfl_audit(&home)
        .arg("check")
        .arg("--repo")
        .arg(root.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("[file-drift-detected] obj1 a.txt"))
        .stderr(predicate::str::contains("file-drift-detected"));
}

#[test]
fn quiet_prints_nothing_but_keeps_status() {
    let home = TempDir::new().unwrap();
    let root = drifted_repo();

    ocfl_audit(&home)
        .arg("-q")
        .arg("check")
        .arg("--repo")
        .arg(root.path())
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn json_report_is_machine_readable() {
    let home = TempDir::new().unwrap();
    let root = drifted_repo();

    let output = ocfl_audit(&home)
        .arg("--json")
        .arg("check")
        .arg("--repo")
        .arg(root.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["drifted"], 1);
    assert_eq!(report["objects"][0]["path"], "obj1");
    assert_eq!(
        report["objects"][0]["files"][0]["resolution"]["outcome"],
        "resolved_in_earlier_version"
    );
    assert_eq!(
        report["objects"][0]["files"][0]["resolution"]["versions"]["v1"],
        "v1/content/a.txt"
    );
}

#[test]
fn missing_repository_is_fatal() {
    let home = TempDir::new().unwrap();
    ocfl_audit(&home)
        .args(["check", "--repo", "/nonexistent/ocfl-audit-repo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot open repository"));
}

#[test]
fn directory_without_declaration_is_fatal() {
    let home = TempDir::new().unwrap();
    let not_a_root = TempDir::new().unwrap();
    ocfl_audit(&home)
        .arg("check")
        .arg("--repo")
        .arg(not_a_root.path())
        .assert()
        .code(1);
}

#[test]
fn bad_arguments_exit_one() {
    let home = TempDir::new().unwrap();
    ocfl_audit(&home).arg("check").assert().code(1);
    ocfl_audit(&home)
        .args(["check", "--repo", "x", "--fetch-filter", "(["])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("fetch_filter"));
}

#[test]
fn invalid_config_file_is_fatal() {
    let home = TempDir::new().unwrap();
    let root = clean_repo();
    let config = home.path().join("audit.toml");
    std::fs::write(&config, "unknown_key = 1\n").unwrap();

    ocfl_audit(&home)
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg("--repo")
        .arg(root.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn config_file_namespace_is_used() {
    let home = TempDir::new().unwrap();
    let root = clean_repo();
    let config = home.path().join("audit.toml");
    std::fs::write(&config, "namespace = \"other\"\n").unwrap();

    let output = ocfl_audit(&home)
        .arg("--config")
        .arg(&config)
        .arg("--json")
        .arg("check")
        .arg("--repo")
        .arg(root.path())
        .output()
        .unwrap();

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["objects"][0]["identifier"]["source"], "fallback");
    assert_eq!(report["summary"]["identifier_fallbacks"], 1);
}

#[test]
fn resolve_reports_outcome() {
    let home = TempDir::new().unwrap();
    let root = drifted_repo();

    ocfl_audit(&home)
        .arg("resolve")
        .arg("--repo")
        .arg(root.path())
        .args(["obj1", "a.txt"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("found in earlier versions"))
        .stdout(predicate::str::contains("v1: v1/content/a.txt"));

    ocfl_audit(&home)
        .arg("resolve")
        .arg("--repo")
        .arg(root.path())
        .args(["obj1", CATALOG])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("resolved at head (v2)"));
}

#[test]
fn resolve_unknown_object_is_fatal() {
    let home = TempDir::new().unwrap();
    let root = clean_repo();

    ocfl_audit(&home)
        .arg("resolve")
        .arg("--repo")
        .arg(root.path())
        .args(["nope", "a.txt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no OCFL object"));
}

#[test]
fn completion_generates_script() {
    let home = TempDir::new().unwrap();
    ocfl_audit(&home)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ocfl-audit"));
}
