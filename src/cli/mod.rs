//! Command-line surface: argument parsing and dispatch.
//!
//! Parsing is pure clap; [run] opens the repository, loads configuration and
//! hands each command to the lifecycle engine or the release orchestrator.

pub mod orchestration;

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::env;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use crate::config::{load_config, set_value, Config, CONFIG_FILE_NAME};
use crate::domain::options::CI_ENV_VAR;
use crate::domain::{BranchType, Tag, WorkflowOptions};
use crate::error::FlowError;
use crate::git::{
    Git2Repository, GitAdapter, OperationRecord, OperationStatus, Repository, SystemRunner,
};
use crate::lifecycle::BranchLifecycle;
use crate::ui::{self, TerminalPrompt};
use crate::version_file::read_version_file;
use orchestration::{ReleaseOrchestrator, RunSummary, WorkflowResult};

/// git-flow branch workflows with version and changelog automation
#[derive(Parser, Debug)]
#[command(name = "git-flowkit", version, about, long_about = None)]
pub struct Cli {
    /// Custom configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a workflow branch
    Start {
        #[arg(value_parser = parse_branch_type)]
        branch_type: BranchType,
        name: String,
        /// Base branch instead of the type's default
        #[arg(long)]
        base: Option<String>,
        /// Replace an existing branch of the same name
        #[arg(long)]
        force: bool,
        /// Fast-forward the base branch from the remote first
        #[arg(long)]
        fetch: bool,
        #[command(flatten)]
        run: RunArgs,
    },

    /// Merge a workflow branch back and close it
    Finish {
        #[arg(value_parser = parse_branch_type)]
        branch_type: BranchType,
        name: String,
        #[arg(long)]
        tag: Option<String>,
        #[arg(short, long)]
        message: Option<String>,
        #[arg(long)]
        push: bool,
        #[arg(long)]
        squash: bool,
        #[arg(long)]
        keep_branch: bool,
        #[command(flatten)]
        run: RunArgs,
    },

    /// Release workflow: version bump, changelog, merge and tag
    Release {
        #[command(subcommand)]
        action: ReleaseAction,
    },

    /// Hotfix workflow: patch bump from the main line
    Hotfix {
        #[command(subcommand)]
        action: ReleaseAction,
    },

    /// Push a workflow branch to the remote
    Publish {
        #[arg(value_parser = parse_branch_type)]
        branch_type: BranchType,
        name: String,
        #[command(flatten)]
        run: RunArgs,
    },

    /// Check out a remote workflow branch locally
    Track {
        #[arg(value_parser = parse_branch_type)]
        branch_type: BranchType,
        name: String,
        #[command(flatten)]
        run: RunArgs,
    },

    /// Delete a local workflow branch
    Delete {
        #[arg(value_parser = parse_branch_type)]
        branch_type: BranchType,
        name: String,
        /// Delete even when not merged
        #[arg(long)]
        force: bool,
        #[command(flatten)]
        run: RunArgs,
    },

    /// List local workflow branches
    List {
        #[arg(value_parser = parse_branch_type)]
        branch_type: Option<BranchType>,
    },

    /// Read or change configuration
    Config(ConfigArgs),

    /// Show version, last tag and open workflow branches
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ReleaseAction {
    /// Create the branch and commit the version bump
    #[command(alias = "init")]
    Start(InitArgs),

    /// Merge, tag and delete the branch
    #[command(alias = "finalize")]
    Finish(FinalizeArgs),
}

/// Switches shared by every mutating command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Print mutating commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Skip every push, pull and fetch
    #[arg(long)]
    pub offline: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    /// Version component to increase
    #[arg(long, value_parser = ["patch", "minor", "major"])]
    pub bump: Option<String>,

    /// Explicit version (X.Y.Z)
    #[arg(long = "version", value_name = "X.Y.Z")]
    pub set_version: Option<String>,

    /// Branch name instead of v<version>
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub push: bool,

    #[arg(long)]
    pub no_changelog: bool,

    /// Never prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print a JSON summary of the run
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FinalizeArgs {
    /// Branch to finish (short or full name)
    #[arg(long)]
    pub branch: Option<String>,

    #[arg(long)]
    pub tag: Option<String>,

    #[arg(short, long)]
    pub message: Option<String>,

    #[arg(long)]
    pub push: bool,

    #[arg(long)]
    pub squash: bool,

    #[arg(long)]
    pub keep_branch: bool,

    #[arg(long)]
    pub no_changelog: bool,

    /// Never prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print a JSON summary of the run
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("mode").required(true).args(["get", "set", "list"])))]
pub struct ConfigArgs {
    #[arg(long, value_name = "KEY")]
    pub get: Option<String>,

    #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"])]
    pub set: Option<Vec<String>>,

    #[arg(long)]
    pub list: bool,
}

fn parse_branch_type(s: &str) -> Result<BranchType, String> {
    s.parse::<BranchType>().map_err(|e| e.to_string())
}

impl RunArgs {
    fn apply(&self, opts: &mut WorkflowOptions) {
        opts.dry_run = self.dry_run;
        opts.offline = self.offline;
    }
}

impl InitArgs {
    pub fn to_options(&self) -> WorkflowOptions {
        let mut opts = WorkflowOptions {
            bump: self.bump.clone(),
            version: self.set_version.clone(),
            name: self.name.clone(),
            push: self.push,
            no_changelog: self.no_changelog,
            yes: self.yes,
            json: self.json,
            ..Default::default()
        };
        self.run.apply(&mut opts);
        opts
    }
}

impl FinalizeArgs {
    pub fn to_options(&self) -> WorkflowOptions {
        let mut opts = WorkflowOptions {
            branch: self.branch.clone(),
            tag: self.tag.clone(),
            message: self.message.clone(),
            push: self.push,
            squash: self.squash,
            keep_branch: self.keep_branch,
            no_changelog: self.no_changelog,
            yes: self.yes,
            json: self.json,
            ..Default::default()
        };
        self.run.apply(&mut opts);
        opts
    }
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    if let Command::Config(args) = &cli.command {
        let path = PathBuf::from(cli.config.as_deref().unwrap_or(CONFIG_FILE_NAME));
        return run_config(&config, args, &path);
    }

    let repo = Git2Repository::open(".")?;
    match cli.command {
        Command::Start {
            branch_type,
            name,
            base,
            force,
            fetch,
            run,
        } => {
            let mut opts = WorkflowOptions {
                base,
                force,
                fetch,
                ..Default::default()
            };
            run.apply(&mut opts);
            run_lifecycle(&repo, &config, &opts, |engine| {
                engine.start(branch_type, &name, &opts).map(|_| ())
            })
        }
        Command::Finish {
            branch_type,
            name,
            tag,
            message,
            push,
            squash,
            keep_branch,
            run,
        } => {
            let mut opts = WorkflowOptions {
                tag,
                message,
                push,
                squash,
                keep_branch,
                ..Default::default()
            };
            run.apply(&mut opts);
            run_lifecycle(&repo, &config, &opts, |engine| {
                engine.finish(branch_type, &name, &opts).map(|_| ())
            })
        }
        Command::Release { action } => run_release(&repo, &config, BranchType::Release, &action),
        Command::Hotfix { action } => run_release(&repo, &config, BranchType::Hotfix, &action),
        Command::Publish {
            branch_type,
            name,
            run,
        } => {
            let mut opts = WorkflowOptions::default();
            run.apply(&mut opts);
            run_lifecycle(&repo, &config, &opts, |engine| {
                engine.publish(branch_type, &name, &opts).map(|_| ())
            })
        }
        Command::Track {
            branch_type,
            name,
            run,
        } => {
            let mut opts = WorkflowOptions::default();
            run.apply(&mut opts);
            run_lifecycle(&repo, &config, &opts, |engine| {
                engine.track(branch_type, &name, &opts).map(|_| ())
            })
        }
        Command::Delete {
            branch_type,
            name,
            force,
            run,
        } => {
            let mut opts = WorkflowOptions {
                force,
                ..Default::default()
            };
            run.apply(&mut opts);
            run_lifecycle(&repo, &config, &opts, |engine| {
                engine.delete(branch_type, &name, &opts).map(|_| ())
            })
        }
        Command::List { branch_type } => {
            let mut adapter = adapter_for(&repo, &WorkflowOptions::default());
            let engine = BranchLifecycle::new(&repo, &mut adapter, &config);
            let title = match branch_type {
                Some(t) => format!("{} branches", t),
                None => "Workflow branches".to_string(),
            };
            ui::display_branches(&title, &engine.list(branch_type)?);
            Ok(())
        }
        Command::Status => run_status(&repo, &config),
        Command::Config(_) => Ok(()),
    }
}

fn adapter_for(repo: &dyn Repository, opts: &WorkflowOptions) -> GitAdapter {
    GitAdapter::new(Box::new(SystemRunner), repo.workdir())
        .with_dry_run(opts.dry_run)
        .with_offline(opts.offline)
}

fn is_interactive(opts: &WorkflowOptions) -> bool {
    opts.interactive(env::var_os(CI_ENV_VAR).is_some(), io::stdin().is_terminal())
}

/// Tell the operator how far a failed run got; nothing is undone.
fn report_partial(error: &FlowError, operations: &[OperationRecord]) {
    if error.is_precondition() {
        return;
    }
    let done = operations
        .iter()
        .filter(|op| op.status == OperationStatus::Executed)
        .count();
    if done > 0 {
        ui::display_status(&format!(
            "{} command(s) completed before the failure; the repository was left as it is",
            done
        ));
    }
}

fn run_lifecycle<F>(
    repo: &dyn Repository,
    config: &Config,
    opts: &WorkflowOptions,
    operation: F,
) -> anyhow::Result<()>
where
    F: FnOnce(&mut BranchLifecycle<'_>) -> crate::error::Result<()>,
{
    let mut adapter = adapter_for(repo, opts);
    let outcome = {
        let mut engine = BranchLifecycle::new(repo, &mut adapter, config);
        operation(&mut engine)
    };
    if let Err(e) = &outcome {
        report_partial(e, adapter.log());
    }
    Ok(outcome?)
}

fn run_release(
    repo: &dyn Repository,
    config: &Config,
    branch_type: BranchType,
    action: &ReleaseAction,
) -> anyhow::Result<()> {
    let opts = match action {
        ReleaseAction::Start(args) => args.to_options(),
        ReleaseAction::Finish(args) => args.to_options(),
    };
    ui::set_machine_output(opts.json);
    let mut adapter = adapter_for(repo, &opts);
    let mut prompt = TerminalPrompt;

    let outcome = {
        let mut orchestrator = ReleaseOrchestrator::new(repo, &mut adapter, config, &mut prompt)
            .with_interactive(is_interactive(&opts));
        match action {
            ReleaseAction::Start(_) => orchestrator.init(branch_type, &opts),
            ReleaseAction::Finish(_) => orchestrator.finalize(branch_type, &opts),
        }
    };
    let operations = adapter.take_log();

    if opts.json {
        let summary = match &outcome {
            Ok(result) => RunSummary::success(result, &operations),
            Err(e) => RunSummary::failure(e, &operations),
        };
        println!("{}", summary.to_json()?);
    }

    match outcome {
        Ok(result) => {
            if !opts.json {
                print_result(&result);
            }
            Ok(())
        }
        Err(e) => {
            report_partial(&e, &operations);
            Err(e.into())
        }
    }
}

fn print_result(result: &WorkflowResult) {
    ui::display_field("Branch", &result.branch);
    ui::display_field("Version", &result.version);
    if let Some(tag) = &result.tag {
        ui::display_field("Tag", tag);
    }
    if result.action == "start" {
        ui::display_field("Version file", yes_no(result.version_changed));
    }
    ui::display_field("Changelog", yes_no(result.changelog_updated));
    if result.action == "finish" {
        ui::display_field("Branch deleted", yes_no(result.branch_deleted));
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "updated"
    } else {
        "unchanged"
    }
}

fn run_status(repo: &dyn Repository, config: &Config) -> anyhow::Result<()> {
    let version = match read_version_file(&repo.workdir().join(&config.files.version)) {
        Ok(v) => v.to_string(),
        Err(FlowError::MissingVersionFile(_)) => "(no version file)".to_string(),
        Err(e) => return Err(e.into()),
    };
    let last_tag = match repo.last_tag()? {
        Some(name) => {
            let tag = Tag::new(name);
            match tag.version(&config.tag_prefix) {
                Some(released) if released.to_string() != version => {
                    format!("{} (differs from version file)", tag.name)
                }
                _ => tag.name,
            }
        }
        None => "(none)".to_string(),
    };
    let current = repo
        .current_branch()?
        .unwrap_or_else(|| "(detached)".to_string());

    ui::display_field("Version", &version);
    ui::display_field("Last tag", &last_tag);
    ui::display_field("Branch", &current);
    ui::display_field("Clean", if repo.is_clean()? { "yes" } else { "no" });

    let mut adapter = adapter_for(repo, &WorkflowOptions::default());
    let engine = BranchLifecycle::new(repo, &mut adapter, config);
    for branch_type in BranchType::ALL {
        let branches = engine.list(Some(branch_type))?;
        if !branches.is_empty() {
            ui::display_branches(&format!("{} branches", branch_type), &branches);
        }
    }
    Ok(())
}

fn run_config(config: &Config, args: &ConfigArgs, path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(key) = &args.get {
        match config.get(key)? {
            Some(value) => println!("{}", value),
            None => return Err(FlowError::config(format!("unknown configuration key '{}'", key)).into()),
        }
    } else if let Some(pair) = &args.set {
        if let [key, value] = pair.as_slice() {
            set_value(path, key, value)?;
            ui::display_success(&format!("{} = {} ({})", key, value, path.display()));
        }
    } else if args.list {
        for (key, value) in config.entries()? {
            println!("{} = {}", key, value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("git-flowkit").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_start() {
        let cli = parse(&["start", "feature", "login", "--base", "main", "--dry-run"]);
        match cli.command {
            Command::Start {
                branch_type,
                name,
                base,
                run,
                ..
            } => {
                assert_eq!(branch_type, BranchType::Feature);
                assert_eq!(name, "login");
                assert_eq!(base.as_deref(), Some("main"));
                assert!(run.dry_run);
                assert!(!run.offline);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_release_start_options() {
        let cli = parse(&["release", "start", "--bump", "minor", "--yes", "--offline", "--json"]);
        match cli.command {
            Command::Release {
                action: ReleaseAction::Start(args),
            } => {
                let opts = args.to_options();
                assert_eq!(opts.bump.as_deref(), Some("minor"));
                assert!(opts.yes);
                assert!(opts.offline);
                assert!(opts.json);
                assert!(opts.version.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_aliases() {
        let cli = parse(&["hotfix", "finalize", "--tag", "v1.0.1", "--keep-branch"]);
        match cli.command {
            Command::Hotfix {
                action: ReleaseAction::Finish(args),
            } => {
                let opts = args.to_options();
                assert_eq!(opts.tag.as_deref(), Some("v1.0.1"));
                assert!(opts.keep_branch);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = parse(&["release", "init", "--version", "2.0.0"]);
        assert!(matches!(
            cli.command,
            Command::Release {
                action: ReleaseAction::Start(InitArgs { ref set_version, .. })
            } if set_version.as_deref() == Some("2.0.0")
        ));
    }

    #[test]
    fn test_rejects_unknown_bump_and_type() {
        assert!(Cli::try_parse_from(["git-flowkit", "release", "start", "--bump", "huge"]).is_err());
        assert!(Cli::try_parse_from(["git-flowkit", "start", "bugfix", "x"]).is_err());
    }

    #[test]
    fn test_parse_config_modes() {
        let cli = parse(&["config", "--set", "remote", "upstream"]);
        match cli.command {
            Command::Config(args) => {
                assert_eq!(
                    args.set,
                    Some(vec!["remote".to_string(), "upstream".to_string()])
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["git-flowkit", "config"]).is_err());
        assert!(Cli::try_parse_from(["git-flowkit", "config", "--list", "--get", "remote"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = parse(&["list", "feature", "-v", "--config", "custom.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        assert!(matches!(
            cli.command,
            Command::List {
                branch_type: Some(BranchType::Feature)
            }
        ));
    }
}
