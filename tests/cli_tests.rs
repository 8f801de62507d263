//! Integration tests for the Flowgate CLI
//!
//! These tests run the actual CLI binary and verify output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the binary to test
fn flowgate_cmd() -> Command {
    let mut cmd = Command::cargo_bin("flowgate").unwrap();
    cmd.env_remove("FLOWGATE_RULES")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const VALID_FLOW: &str = r#"{
    "nodes": [
        {"id": "s", "type": "start"},
        {"id": "mail", "type": "email", "data": {"subject": "Welcome!"}},
        {"id": "e", "type": "end"}
    ],
    "edges": [
        {"source": "s", "target": "mail"},
        {"source": "mail", "target": "e"}
    ]
}"#;

const FIXTURES: &str = r#"
users:
  - id: u1
  - id: vip
    plan: premium
workflow_counts:
  vip: 10
"#;

#[test]
fn test_help_flag() {
    flowgate_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("transition"));
}

#[test]
fn test_validate_help() {
    flowgate_cmd()
        .args(["validate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--verbose"));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_valid_json() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "welcome.json", VALID_FLOW);

    flowgate_cmd()
        .args(["validate", file.to_str().unwrap(), "--verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("welcome.json"))
        .stdout(predicate::str::contains("Nodes: 3 | Edges: 2 | Complexity: 8"));
}

#[test]
fn test_validate_valid_yaml() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "wait.yaml",
        r#"
nodes:
  - id: s
    type: start
  - id: wait
    type: delay
    data:
      duration: "3600"
edges:
  - source: s
    target: wait
"#,
    );

    flowgate_cmd()
        .args(["validate", file.to_str().unwrap()])
        .assert()
        .success();
}

#[test]
fn test_validate_missing_start_fails() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "nostart.json",
        r#"{"nodes": [{"id": "a", "type": "action"}], "edges": []}"#,
    );

    flowgate_cmd()
        .args(["validate", file.to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("FLOW-008"))
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_validate_json_output() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "orphan.json",
        r#"{"nodes": [{"id": "s", "type": "start"}, {"id": "x", "type": "action"}]}"#,
    );

    let output = flowgate_cmd()
        .args(["validate", file.to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["error"]["code"], "FLOW-013");
    assert_eq!(reports[0]["node_count"], 2);
}

#[test]
fn test_validate_directory() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.json", VALID_FLOW);
    write(&dir, "b.yml", "nodes:\n  - id: s\n    type: start\n");
    write(&dir, "readme.md", "# not a workflow");

    flowgate_cmd()
        .args(["validate", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 file(s), 2 valid, 0 invalid"));
}

#[test]
fn test_validate_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "flow.toml", "nodes = []");

    flowgate_cmd()
        .args(["validate", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FLOW-094"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_validate_missing_file() {
    flowgate_cmd()
        .args(["validate", "/nonexistent/flow.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read workflow file"));
}

// ============================================================================
// create
// ============================================================================

fn workflow_request(dir: &TempDir, user_id: &str) -> PathBuf {
    let request = format!(
        r#"{{"name": "  Welcome series ", "user_id": "{user_id}", "structure": {VALID_FLOW}}}"#
    );
    write(dir, "request.json", &request)
}

#[test]
fn test_create_accepts_valid_request() {
    let dir = TempDir::new().unwrap();
    let request = workflow_request(&dir, "u1");
    let fixtures = write(&dir, "fixtures.yaml", FIXTURES);

    flowgate_cmd()
        .args(["create", request.to_str().unwrap()])
        .args(["--fixtures", fixtures.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workflow 'Welcome series' accepted"))
        .stdout(predicate::str::contains("Complexity: 8"));
}

#[test]
fn test_create_json_output() {
    let dir = TempDir::new().unwrap();
    let request = workflow_request(&dir, "vip");
    let fixtures = write(&dir, "fixtures.yaml", FIXTURES);

    let output = flowgate_cmd()
        .args(["create", request.to_str().unwrap(), "--format", "json"])
        .args(["--fixtures", fixtures.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let created: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(created["status"], "draft");
    assert_eq!(created["user_id"], "vip");
    assert_eq!(created["is_complex"], false);
}

#[test]
fn test_create_unknown_user() {
    let dir = TempDir::new().unwrap();
    let request = workflow_request(&dir, "ghost");

    flowgate_cmd()
        .args(["create", request.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("User not found"));
}

#[test]
fn test_create_quota_from_rules_file() {
    let dir = TempDir::new().unwrap();
    let request = workflow_request(&dir, "vip");
    let fixtures = write(&dir, "fixtures.yaml", FIXTURES);
    let rules = write(
        &dir,
        "rules.yaml",
        "workflow:\n  max_workflows:\n    regular: 1\n    premium: 10\n",
    );

    flowgate_cmd()
        .args(["create", request.to_str().unwrap()])
        .args(["--fixtures", fixtures.to_str().unwrap()])
        .env("FLOWGATE_RULES", rules.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Limit of 10 workflows reached"))
        .stderr(predicate::str::contains("Fix:"));
}

// ============================================================================
// report
// ============================================================================

#[test]
fn test_report_approved() {
    let dir = TempDir::new().unwrap();
    let fixtures = write(&dir, "fixtures.yaml", FIXTURES);
    let request = write(
        &dir,
        "report.yaml",
        "report_type: dashboard\nstart_date: 2026-06-01\nend_date: 2026-06-30\nuser_id: u1\n",
    );

    flowgate_cmd()
        .args(["report", request.to_str().unwrap(), "--today", "2026-06-30"])
        .args(["--fixtures", fixtures.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("29 days"))
        .stdout(predicate::str::contains("Reports today: 1"));
}

#[test]
fn test_report_dashboard_window() {
    let dir = TempDir::new().unwrap();
    let fixtures = write(&dir, "fixtures.yaml", FIXTURES);
    let request = write(
        &dir,
        "report.yaml",
        "report_type: dashboard\nstart_date: 2026-01-01\nend_date: 2026-06-30\nuser_id: u1\n",
    );

    flowgate_cmd()
        .args(["report", request.to_str().unwrap(), "--today", "2026-06-30"])
        .args(["--fixtures", fixtures.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Maximum allowed range: 30 days"));
}

// ============================================================================
// transition / rules
// ============================================================================

#[test]
fn test_transition_allowed() {
    flowgate_cmd()
        .args(["transition", "campaign", "paused", "resume"])
        .assert()
        .success()
        .stdout(predicate::str::contains("active"));
}

#[test]
fn test_transition_rejected() {
    flowgate_cmd()
        .args(["transition", "chat", "closed", "assign"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot assign a chat that is closed"));
}

#[test]
fn test_transition_unknown_state() {
    flowgate_cmd()
        .args(["transition", "campaign", "archived", "end"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown campaign state 'archived'"));
}

#[test]
fn test_rules_prints_defaults() {
    flowgate_cmd()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("complex_threshold: 50"))
        .stdout(predicate::str::contains("dashboard: 30"));
}

#[test]
fn test_rules_rejects_invalid_file() {
    let dir = TempDir::new().unwrap();
    let rules = write(&dir, "rules.yaml", "workflow:\n  name:\n    min: 9\n    max: 2\n");

    flowgate_cmd()
        .args(["rules", "--rules", rules.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FLOW-093"));
}
