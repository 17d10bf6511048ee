//! # CLI Binary Tests
//!
//! Runs the `ldv` binary for the paths that need no network: pointer
//! resolution, configuration errors and unreadable inputs.

use std::process::Command;

const COMPOSED: &str =
    "https://raw.githubusercontent.com/beckn/schemas/refs/heads/main/schema/composed/ev-charging/v2/context.jsonld";

fn ldv() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ldv"));
    cmd.env_remove("RUST_LOG")
        .env_remove("LDV_CORE_NAMESPACE")
        .env_remove("LDV_BRANCH_FALLBACKS");
    cmd
}

#[test]
fn resolve_prints_routing() {
    let output = ldv().args(["resolve", COMPOSED]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("composed"), "{stdout}");
    assert!(stdout.contains("/refs/heads/main/schema/core/v2/context.jsonld"), "{stdout}");
    assert!(stdout.contains("constraints.yaml"), "{stdout}");
}

#[test]
fn resolve_unroutable_exits_one() {
    let output = ldv()
        .args(["resolve", "https://example.com/context.jsonld"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn bad_config_is_operational_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("ldv.yaml");
    std::fs::write(&config, "no_such_setting: 1\n").unwrap();
    let output = ldv()
        .arg("--config")
        .arg(&config)
        .args(["resolve", COMPOSED])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to load configuration"), "{stderr}");
}

#[test]
fn invalid_fallback_branch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("p.json");
    std::fs::write(&payload, "{}").unwrap();
    let output = ldv()
        .args(["validate", "--fallback-branch", "feature/x"])
        .arg(&payload)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unreadable_input_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let output = ldv().arg("validate").arg(&missing).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("failed to read"), "{stdout}");
}

#[test]
fn untyped_payload_is_valid_without_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("plain.json");
    std::fs::write(&payload, r#"{"context": {"action": "search"}, "message": {}}"#).unwrap();
    let output = ldv().arg("validate").arg(&payload).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Payloads: 1/1 valid"), "{stdout}");
}
