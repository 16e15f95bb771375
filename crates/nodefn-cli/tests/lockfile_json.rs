//! Integration tests for `nodefn lockfile`.

use serial_test::serial;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "nodefn-cli", "--bin", "nodefn", "--"]);
    cmd
}

#[test]
#[serial]
fn test_lockfile_detects_pnpm() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("pnpm-lock.yaml"), "lockfileVersion: '9.0'").unwrap();
    let nested = dir.path().join("services").join("api");
    fs::create_dir_all(&nested).unwrap();

    let output = cargo_bin()
        .args(["--json", "lockfile", "--cwd"])
        .arg(&nested)
        .output()
        .expect("Failed to run command");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["ok"], true);
    assert_eq!(json["package_manager"].as_str(), Some("pnpm"));
    assert!(json["lock_file"]
        .as_str()
        .unwrap()
        .ends_with("pnpm-lock.yaml"));
}

#[test]
#[serial]
fn test_lockfile_explicit_missing() {
    let dir = tempdir().unwrap();

    let output = cargo_bin()
        .args(["--json", "lockfile", "--path", "missing/yarn.lock", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run command");

    assert_eq!(output.status.code(), Some(2));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["error"]["code"].as_str(), Some("LOCKFILE_NOT_FOUND"));
}

#[test]
#[serial]
fn test_lockfile_multiple() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("yarn.lock"), "").unwrap();
    fs::write(dir.path().join("package-lock.json"), "{}").unwrap();

    let output = cargo_bin()
        .args(["--json", "lockfile", "--cwd"])
        .arg(dir.path())
        .output()
        .expect("Failed to run command");

    assert_eq!(output.status.code(), Some(2));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["error"]["code"].as_str(), Some("LOCKFILE_MULTIPLE"));
}
