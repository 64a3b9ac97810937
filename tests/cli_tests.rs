//! CLI integration tests
//!
//! These tests verify the CLI commands work correctly by running the binary.

#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::Command;

fn wsdl2_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_wsdl2"))
}

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).to_str().unwrap().to_string()
}

// ============================================================================
// Read Command Tests
// ============================================================================

#[test]
fn test_cli_read_basic() {
    let output = Command::new(wsdl2_bin())
        .args(["read", &fixture("greath.wsdl")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "read should succeed");
    assert!(stdout.contains("http://greath.example.com/2004/wsdl/resSvc"), "should show namespace");
    assert!(stdout.contains("Interfaces (1):"), "should count interfaces");
    assert!(stdout.contains("opCheckAvailability"), "should list operations");
    assert!(stdout.contains("reservationEndpoint"), "should list endpoints");
}

#[test]
fn test_cli_read_json_output() {
    let output = Command::new(wsdl2_bin())
        .args(["read", "--json", &fixture("greath.wsdl")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "read --json should succeed");

    let json: serde_json::Value = serde_json::from_str(&stdout)
        .expect("Output should be valid JSON");

    assert_eq!(json["targetNamespace"], "http://greath.example.com/2004/wsdl/resSvc");
    assert_eq!(json["interfaces"].as_array().unwrap().len(), 1);
    assert_eq!(json["services"][0]["endpoints"][0]["name"], "reservationEndpoint");
    assert!(json["reports"].is_array());
}

#[test]
fn test_cli_read_fails_fast() {
    let output = Command::new(wsdl2_bin())
        .args(["read", &fixture("interface_cycle.wsdl")])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "read should fail on the first error");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("INVALID_WSDL"), "should print the fault code");
}

#[test]
fn test_cli_read_continue_on_error() {
    let output = Command::new(wsdl2_bin())
        .args(["read", "--continue-on-error", &fixture("interface_cycle.wsdl")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "read should complete");
    assert!(stdout.contains("Interface-1009"), "should list the cycle reports");
}

#[test]
fn test_cli_read_without_validation() {
    let output = Command::new(wsdl2_bin())
        .args(["read", "--no-validation", &fixture("interface_cycle.wsdl")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "read should succeed without validation");
    assert!(!stdout.contains("Interface-1009"));
}

#[test]
fn test_cli_read_missing_file() {
    let output = Command::new(wsdl2_bin())
        .args(["read", &fixture("missing.wsdl")])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "should fail for a missing file");
}

// ============================================================================
// Validate Command Tests
// ============================================================================

#[test]
fn test_cli_validate_valid_description() {
    let output = Command::new(wsdl2_bin())
        .args(["validate", &fixture("greath.wsdl")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "validation should succeed");
    assert!(stdout.contains("Description is valid"));
}

#[test]
fn test_cli_validate_invalid_description() {
    let output = Command::new(wsdl2_bin())
        .args(["validate", &fixture("broken_references.wsdl")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success(), "validation should fail");
    assert!(stdout.contains("BindingOperation-1051"));
    assert!(stdout.contains("Endpoint-1062"));
    assert!(stdout.contains("Description is invalid"));
}

#[test]
fn test_cli_validate_json_reports() {
    let output = Command::new(wsdl2_bin())
        .args(["validate", "--json", &fixture("duplicate_interfaces.wsdl")])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout)
        .expect("Output should be valid JSON");

    let duplicates = json["reports"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["id"] == "Interface-1010")
        .count();
    assert_eq!(duplicates, 2);
    assert!(!output.status.success());
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let output = Command::new(wsdl2_bin())
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("read"));
    assert!(stdout.contains("validate"));
}

#[test]
fn test_cli_version() {
    let output = Command::new(wsdl2_bin())
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("wsdl2"));
}
