//! CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command against `data_dir` and return (stdout, stderr, code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_deepfocus-cli"))
        .args(args)
        .env("DEEPFOCUS_DATA_DIR", data_dir)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command, expect success and parse stdout as JSON.
fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_timer_start_status_stop() {
    let dir = tempfile::tempdir().unwrap();

    let started = run_json(dir.path(), &["timer", "start", "--work", "25", "--break", "5"]);
    assert_eq!(started["isBreak"], false);
    assert_eq!(started["duration"], 1_500_000);

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["state"], "working");
    assert_eq!(status["pomodoroActive"], true);
    assert!(status["timeRemaining"].as_i64().unwrap() <= 1_500_000);

    let stopped = run_json(dir.path(), &["timer", "stop"]);
    assert_eq!(stopped["timeRemaining"], stopped["duration"]);

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["state"], "idle");
    assert_eq!(status["session"], Value::Null);
}

#[test]
fn test_timer_rejects_zero_work() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "start", "--work", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_timer_tick_while_idle_prints_status() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_json(dir.path(), &["timer", "tick"]);
    assert_eq!(out["state"], "idle");
}

#[test]
fn test_tab_switch_debounce() {
    let dir = tempfile::tempdir().unwrap();
    let first = run_json(dir.path(), &["stats", "tab-switch", "--at", "1000000"]);
    assert_eq!(first["counted"], true);
    let second = run_json(dir.path(), &["stats", "tab-switch", "--at", "1000500"]);
    assert_eq!(second["counted"], false);
    let third = run_json(dir.path(), &["stats", "tab-switch", "--at", "1002500"]);
    assert_eq!(third["counted"], true);

    let stats = run_json(dir.path(), &["stats", "show"]);
    assert_eq!(stats["dailyStats"]["tabSwitches"], 2);
    assert_eq!(stats["dailyStats"]["distractions"], 2);
    assert_eq!(stats["focusScore"], 86);
}

#[test]
fn test_stats_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["stats", "tab-switch"]);
    let reset = run_json(dir.path(), &["stats", "reset"]);
    assert_eq!(reset["dailyStats"]["tabSwitches"], 0);
    assert_eq!(reset["focusScore"], 100);

    let summary = run_json(dir.path(), &["stats", "summary"]);
    assert_eq!(summary["totalPomodoros"], 0);
}

#[test]
fn test_block_check_and_rules() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["block", "add", "Example.com"]);
    run_json(dir.path(), &["block", "add", "reddit.com"]);

    let sites = run_json(dir.path(), &["block", "list"]);
    assert_eq!(sites, serde_json::json!(["example.com", "reddit.com"]));

    let rules = run_json(dir.path(), &["block", "rules"]);
    assert_eq!(rules[0]["id"], 1);
    assert_eq!(rules[1]["condition"]["urlFilter"], "||reddit.com");

    let (stdout, _, code) = run_cli(dir.path(), &["block", "check", "https://sub.example.com/path"]);
    assert_eq!(code, 2);
    let verdict: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(verdict["action"], "redirect");

    let (_, _, code) = run_cli(dir.path(), &["block", "check", "https://example.org"]);
    assert_eq!(code, 0);

    let stats = run_json(dir.path(), &["stats", "show"]);
    assert_eq!(stats["dailyStats"]["distractions"], 1);
}

#[test]
fn test_block_remove_unknown_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["block", "remove", "nothing.com"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not blocked"));
}

#[test]
fn test_focus_preferences() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["focus", "mode", "on"]);
    run_json(dir.path(), &["focus", "filter", "light"]);
    let out = run_json(dir.path(), &["focus", "dim", "200"]);
    assert_eq!(out["preferences"]["dimmingLevel"], 100);
    assert_eq!(out["preferences"]["focusMode"], true);
    assert_eq!(out["filteredCategories"], serde_json::json!(["ads", "comments"]));
    assert_eq!(out["pageStyle"]["overlayColor"], "rgba(0, 0, 0, 0.7)");
    assert_eq!(out["pageStyle"]["filteredStyle"], "grayscale(100%) opacity(0.5)");

    let out = run_json(dir.path(), &["focus", "custom", "div.feed"]);
    let selectors = out["pageStyle"]["filteredSelectors"].as_array().unwrap();
    assert_eq!(selectors.len(), 3);
    assert!(selectors[0].as_str().unwrap().contains("advertisement"));
    assert_eq!(selectors[2], "div.feed");

    let (_, _, code) = run_cli(dir.path(), &["focus", "filter", "maximum"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.work_duration"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.work_duration", "40"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "timer.work_duration"]);
    assert_eq!(stdout.trim(), "40");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "nope.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("deepfocus-cli"));
}
