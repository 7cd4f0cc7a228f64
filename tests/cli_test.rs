// tests/cli_test.rs
mod common;

use common::setup_flow_repo;
use std::process::{Command, Output};
use tempfile::TempDir;

fn flowkit(cwd: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_git-flowkit"))
        .args(args)
        .current_dir(cwd)
        .env("CI", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute git-flowkit")
}

#[test]
fn test_help() {
    let temp_dir = TempDir::new().unwrap();
    let output = flowkit(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("git-flowkit"));
    assert!(stdout.contains("release"));
    assert!(stdout.contains("hotfix"));
}

#[test]
fn test_version_flag() {
    let temp_dir = TempDir::new().unwrap();
    let output = flowkit(temp_dir.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_usage_error_exits_one() {
    let temp_dir = TempDir::new().unwrap();
    let output = flowkit(temp_dir.path(), &["start", "bugfix", "x"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_config_get_outside_repository() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("custom.toml");
    std::fs::write(&config, "remote = \"upstream\"\n").unwrap();

    let output = flowkit(
        temp_dir.path(),
        &["config", "--get", "remote", "--config", config.to_str().unwrap()],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), "upstream");
}

#[test]
fn test_config_set_then_list() {
    let temp_dir = TempDir::new().unwrap();
    let output = flowkit(temp_dir.path(), &["config", "--set", "tag_prefix", "rel-"]);
    assert!(output.status.success());
    assert!(temp_dir.path().join("gitflowkit.toml").exists());

    let output = flowkit(temp_dir.path(), &["config", "--list"]);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("tag_prefix = rel-"));
    assert!(stdout.contains("branches.develop = develop"));
}

#[test]
fn test_list_and_status_in_repository() {
    let (temp_dir, raw) = setup_flow_repo();
    let head = raw.head().unwrap().peel_to_commit().unwrap();
    raw.branch("feature/search", &head, false).unwrap();

    let output = flowkit(temp_dir.path(), &["list", "feature"]);
    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("feature/search"));

    let output = flowkit(temp_dir.path(), &["status"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("1.9.0"));
    assert!(stdout.contains("v1.9.0"));
}

#[test]
fn test_failure_prints_error_and_exits_one() {
    let (temp_dir, _raw) = setup_flow_repo();
    let output = flowkit(
        temp_dir.path(),
        &["release", "finish", "--tag", "v1.9.0", "--offline"],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("ERROR:"));
}

#[test]
fn test_dry_run_json_release_start() {
    let (temp_dir, _raw) = setup_flow_repo();
    let output = flowkit(
        temp_dir.path(),
        &["release", "start", "--dry-run", "--offline", "--json", "--yes"],
    );

    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout holds only the JSON summary");
    assert_eq!(value["result"]["branch"], "release/v1.10.0");
    assert_eq!(value["operations"][0]["status"], "dry_run");

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("[dry-run]"), "{}", stderr);
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("version.txt")).unwrap(),
        "1.9.0\n"
    );
}
