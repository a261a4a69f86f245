//! Smoke tests for the storeprobe CLI
//!
//! These tests verify basic CLI functionality works without a browser or
//! network access.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the storeprobe binary
fn storeprobe() -> Command {
    Command::cargo_bin("storeprobe").expect("storeprobe binary should exist")
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    storeprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    storeprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze-file"))
        .stdout(predicate::str::contains("codegen"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_no_args_shows_help() {
    storeprobe()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_run_subcommand_help() {
    storeprobe()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--suite"))
        .stdout(predicate::str::contains("--headed"));
}

#[test]
fn test_collect_subcommand_help() {
    storeprobe()
        .args(["collect", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SESSION"));
}

// ============================================================================
// List
// ============================================================================

#[test]
fn test_list_all_journeys() {
    storeprobe()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("search-nav (5)"))
        .stdout(predicate::str::contains("Guest Purchase"))
        .stdout(predicate::str::contains("Compare Current vs Codegen Locators"));
}

#[test]
fn test_list_one_suite_as_json() {
    storeprobe()
        .args(["list", "--suite", "checkout", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"guest-purchase\""))
        .stdout(predicate::str::contains("Search with No Results").not());
}

#[test]
fn test_list_unknown_suite_fails() {
    storeprobe()
        .args(["list", "--suite", "payments"])
        .assert()
        .failure();
}

// ============================================================================
// Analysis
// ============================================================================

#[test]
fn test_analyze_empty_directory() {
    let temp = TempDir::new().unwrap();
    let reports = temp.path().join("reports");
    storeprobe()
        .args(["analyze", "--color", "never", "--input"])
        .arg(temp.path())
        .arg("--output")
        .arg(&reports)
        .assert()
        .success()
        .stderr(predicate::str::contains("No analysis files found"));
    assert!(!reports.exists());
}

#[test]
fn test_analyze_file_missing_args() {
    storeprobe()
        .args(["analyze-file", "recording.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SESSION"));
}

#[test]
fn test_analyze_file_missing_file() {
    let temp = TempDir::new().unwrap();
    storeprobe()
        .arg("analyze-file")
        .arg(temp.path().join("missing.js"))
        .arg("checkout")
        .arg("--output")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_analyze_file_rejects_session_path() {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("checkout.js");
    fs::write(&script, "await page.locator('#cart').click();\n").unwrap();
    let out = temp.path().join("out");
    storeprobe()
        .arg("analyze-file")
        .arg(&script)
        .arg("../escape")
        .arg("--output")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid session name"));
    assert!(!temp.path().join("escape-analysis.json").exists());
}

#[test]
fn test_analyze_file_then_consolidate() {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("checkout.js");
    fs::write(
        &script,
        "await page.locator('#search_query_top').fill('dress');\n\
         await page.locator('#search_query_top').press('Enter');\n\
         await page.locator('.product-name').click();\n",
    )
    .unwrap();
    let locators = temp.path().join("locators");
    let reports = temp.path().join("reports");

    storeprobe()
        .args(["analyze-file", "--color", "never"])
        .arg(&script)
        .arg("checkout")
        .arg("--output")
        .arg(&locators)
        .assert()
        .success()
        .stderr(predicate::str::contains("Locators: 3"));
    assert!(locators.join("checkout-analysis.json").is_file());
    assert!(locators.join("checkout-page-object-suggestions.js").is_file());

    storeprobe()
        .args(["-q", "analyze", "--input"])
        .arg(&locators)
        .arg("--output")
        .arg(&reports)
        .assert()
        .success();
    let consolidated = fs::read_to_string(reports.join("consolidated-report.json")).unwrap();
    assert!(consolidated.contains("#search_query_top"));
    assert!(reports.join("enhanced-page-objects.ts").is_file());
}

#[test]
fn test_scan_prints_getters() {
    let temp = TempDir::new().unwrap();
    let code = temp.path().join("generated.js");
    fs::write(&code, "await page.locator('#search_query_top').click();").unwrap();
    storeprobe()
        .args(["scan", "--name", "HomePage"])
        .arg(&code)
        .assert()
        .success()
        .stdout(predicate::str::contains("searchQueryTopElement"))
        .stdout(predicate::str::contains("HomePage"));
}

#[test]
fn test_bad_config_file_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("storeprobe.yaml");
    fs::write(&config, "headless: [not, a, bool]").unwrap();
    storeprobe()
        .arg("--config")
        .arg(&config)
        .arg("analyze")
        .assert()
        .failure()
        .stderr(predicate::str::contains("YAML"));
}
