// tests/workflow_test.rs
mod common;

use chrono::NaiveDate;
use common::setup_flow_repo;
use git_flowkit::cli::orchestration::{ReleaseOrchestrator, RunSummary};
use git_flowkit::config::Config;
use git_flowkit::domain::{BranchType, WorkflowOptions};
use git_flowkit::git::{Git2Repository, GitAdapter, RecordingRunner, Repository};
use git_flowkit::lifecycle::BranchLifecycle;
use git_flowkit::ui::ScriptedPrompt;
use git_flowkit::FlowError;
use std::fs;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

#[test]
fn test_release_start_on_real_repository() {
    let (temp_dir, _raw) = setup_flow_repo();
    let repo = Git2Repository::open(temp_dir.path()).unwrap();
    let config = Config::default();
    let runner = RecordingRunner::new();
    let mut adapter = GitAdapter::new(Box::new(runner.clone()), repo.workdir());
    let mut prompt = ScriptedPrompt::default();
    let opts = WorkflowOptions {
        bump: Some("minor".to_string()),
        yes: true,
        ..Default::default()
    };

    let result = ReleaseOrchestrator::new(&repo, &mut adapter, &config, &mut prompt)
        .with_today(date())
        .init(BranchType::Release, &opts)
        .unwrap();

    assert_eq!(result.branch, "release/v1.10.0");
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("version.txt")).unwrap(),
        "1.10.0\n"
    );
    let changelog = fs::read_to_string(temp_dir.path().join("CHANGELOG.md")).unwrap();
    assert!(
        changelog.starts_with("## v1.10.0 - 2024-05-17\n- feat: add readme\n"),
        "unexpected changelog: {}",
        changelog
    );
    assert_eq!(
        runner.command_lines(),
        vec![
            "-c gitflow.branch.master=main -c gitflow.branch.develop=develop \
             -c gitflow.prefix.release=release/ flow release start v1.10.0 develop"
                .to_string(),
            "add version.txt CHANGELOG.md".to_string(),
            "commit -m chore: bump version to 1.10.0 for release".to_string(),
        ]
    );
}

#[test]
fn test_release_finish_existing_tag_fails_before_merge() {
    let (temp_dir, raw) = setup_flow_repo();
    let head = raw.head().unwrap().peel_to_commit().unwrap();
    raw.branch("release/v1.9.0", &head, false).unwrap();
    let repo = Git2Repository::open(temp_dir.path()).unwrap();
    let config = Config::default();
    let runner = RecordingRunner::new();
    let mut adapter = GitAdapter::new(Box::new(runner.clone()), repo.workdir());
    let mut prompt = ScriptedPrompt::default();
    let opts = WorkflowOptions {
        tag: Some("v1.9.0".to_string()),
        ..Default::default()
    };

    let err = ReleaseOrchestrator::new(&repo, &mut adapter, &config, &mut prompt)
        .finalize(BranchType::Release, &opts)
        .unwrap_err();

    assert!(matches!(err, FlowError::DuplicateTag(ref tag) if tag == "v1.9.0"));
    assert!(err.is_precondition());
    assert!(runner.calls().is_empty());
}

#[test]
fn test_finish_without_tag_makes_no_changes() {
    let (temp_dir, raw) = setup_flow_repo();
    let head = raw.head().unwrap().peel_to_commit().unwrap();
    raw.branch("release/v1.10.0", &head, false).unwrap();
    let repo = Git2Repository::open(temp_dir.path()).unwrap();
    let config = Config::default();
    let runner = RecordingRunner::new();
    let mut adapter = GitAdapter::new(Box::new(runner.clone()), repo.workdir());

    let err = BranchLifecycle::new(&repo, &mut adapter, &config)
        .finish(BranchType::Release, "v1.10.0", &WorkflowOptions::default())
        .unwrap_err();

    assert!(matches!(err, FlowError::MissingRequiredOption { .. }));
    assert!(adapter.log().is_empty());
    assert!(repo.branch_exists("release/v1.10.0").unwrap());
}

#[test]
fn test_dry_run_start_creates_nothing() {
    let (temp_dir, _raw) = setup_flow_repo();
    let repo = Git2Repository::open(temp_dir.path()).unwrap();
    let config = Config::default();
    let runner = RecordingRunner::new();
    let mut adapter =
        GitAdapter::new(Box::new(runner.clone()), repo.workdir()).with_dry_run(true);

    let full = BranchLifecycle::new(&repo, &mut adapter, &config)
        .start(BranchType::Feature, "login", &WorkflowOptions::default())
        .unwrap();

    assert_eq!(full, "feature/login");
    assert!(runner.calls().is_empty());
    assert!(!repo.branch_exists("feature/login").unwrap());
}

#[test]
fn test_invalid_name_reported_before_base_lookup() {
    let (temp_dir, _raw) = setup_flow_repo();
    let repo = Git2Repository::open(temp_dir.path()).unwrap();
    let mut config = Config::default();
    config.branches.develop = "does-not-exist".to_string();
    let runner = RecordingRunner::new();
    let mut adapter = GitAdapter::new(Box::new(runner.clone()), repo.workdir());

    let err = BranchLifecycle::new(&repo, &mut adapter, &config)
        .start(BranchType::Feature, "bad name", &WorkflowOptions::default())
        .unwrap_err();

    assert!(matches!(err, FlowError::InvalidBranchName(_)));
}

#[test]
fn test_dry_run_json_summary() {
    let (temp_dir, _raw) = setup_flow_repo();
    let repo = Git2Repository::open(temp_dir.path()).unwrap();
    let config = Config::default();
    let runner = RecordingRunner::new();
    let mut adapter =
        GitAdapter::new(Box::new(runner.clone()), repo.workdir()).with_dry_run(true);
    let mut prompt = ScriptedPrompt::default();
    let opts = WorkflowOptions {
        bump: Some("major".to_string()),
        json: true,
        ..Default::default()
    };

    let result = ReleaseOrchestrator::new(&repo, &mut adapter, &config, &mut prompt)
        .with_today(date())
        .init(BranchType::Release, &opts)
        .unwrap();
    let operations = adapter.take_log();
    let json = RunSummary::success(&result, &operations).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["result"]["branch"], "release/v2.0.0");
    assert_eq!(value["result"]["action"], "start");
    let ops = value["operations"].as_array().unwrap();
    assert!(!ops.is_empty());
    assert!(ops.iter().all(|op| op["status"] == "dry_run"));
    assert_eq!(ops[0]["command"][0], "git");
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("version.txt")).unwrap(),
        "1.9.0\n"
    );
}

#[test]
fn test_list_reads_real_branches() {
    let (temp_dir, raw) = setup_flow_repo();
    let head = raw.head().unwrap().peel_to_commit().unwrap();
    raw.branch("feature/search", &head, false).unwrap();
    raw.branch("hotfix/v1.9.1", &head, false).unwrap();
    let repo = Git2Repository::open(temp_dir.path()).unwrap();
    let config = Config::default();
    let runner = RecordingRunner::new();
    let mut adapter = GitAdapter::new(Box::new(runner), repo.workdir());

    let engine = BranchLifecycle::new(&repo, &mut adapter, &config);
    assert_eq!(
        engine.list(Some(BranchType::Feature)).unwrap(),
        vec!["feature/search".to_string()]
    );
    assert_eq!(
        engine.list(None).unwrap(),
        vec!["feature/search".to_string(), "hotfix/v1.9.1".to_string()]
    );
}
