//! Release and hotfix workflow orchestration
//!
//! Composes the version file, the changelog and the branch lifecycle into
//! the two release-style workflows:
//!
//! - `init` (`release start` / `hotfix start`): compute the next version,
//!   create the branch, write the version and changelog, commit
//! - `finalize` (`release finish` / `hotfix finish`): pick the branch, make
//!   sure the changelog has its section, merge and tag
//!
//! Preconditions are checked before the first mutation. Once a mutation has
//! run, a later failure leaves the repository as it is; the operation log
//! shows how far the run got.

use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

use crate::changelog::ChangelogGenerator;
use crate::config::Config;
use crate::domain::tag::version_from_branch;
use crate::domain::version::compare;
use crate::domain::{BranchRef, BranchType, Tag, Version, WorkflowOptions};
use crate::error::{FlowError, Result};
use crate::git::{GitAdapter, OperationRecord, Repository};
use crate::lifecycle::BranchLifecycle;
use crate::ui::{self, Prompt};
use crate::version_file::{read_version_file, write_version_file};
use crate::warning::FlowWarning;

/// Result of a successful release-style workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowResult {
    /// `release` or `hotfix`
    pub kind: String,
    /// `start` or `finish`
    pub action: String,
    /// Full branch name
    pub branch: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub version_changed: bool,
    pub changelog_updated: bool,
    pub branch_deleted: bool,
    /// Non-fatal conditions reported during the run
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// JSON document printed for `--json`
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a WorkflowResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub operations: &'a [OperationRecord],
}

impl<'a> RunSummary<'a> {
    pub fn success(result: &'a WorkflowResult, operations: &'a [OperationRecord]) -> Self {
        RunSummary {
            result: Some(result),
            error: None,
            operations,
        }
    }

    pub fn failure(error: &FlowError, operations: &'a [OperationRecord]) -> Self {
        RunSummary {
            result: None,
            error: Some(error.to_string()),
            operations,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Runs the release/hotfix workflows against one repository.
pub struct ReleaseOrchestrator<'a> {
    repo: &'a dyn Repository,
    adapter: &'a mut GitAdapter,
    config: &'a Config,
    prompt: &'a mut dyn Prompt,
    interactive: bool,
    today: NaiveDate,
    warnings: Vec<FlowWarning>,
}

impl<'a> ReleaseOrchestrator<'a> {
    /// Non-interactive orchestrator dated today (local time)
    pub fn new(
        repo: &'a dyn Repository,
        adapter: &'a mut GitAdapter,
        config: &'a Config,
        prompt: &'a mut dyn Prompt,
    ) -> Self {
        ReleaseOrchestrator {
            repo,
            adapter,
            config,
            prompt,
            interactive: false,
            today: chrono::Local::now().date_naive(),
            warnings: Vec::new(),
        }
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Date written into changelog headings
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn lifecycle(&mut self) -> BranchLifecycle<'_> {
        BranchLifecycle::new(self.repo, &mut *self.adapter, self.config)
    }

    fn warn(&mut self, warning: FlowWarning) {
        ui::display_warning(&warning);
        self.warnings.push(warning);
    }

    fn take_warnings(&mut self) -> Vec<String> {
        self.warnings.drain(..).map(|w| w.to_string()).collect()
    }

    fn changelog(&self) -> ChangelogGenerator<'a> {
        ChangelogGenerator::new(
            self.repo,
            self.repo.workdir().join(&self.config.files.changelog),
        )
    }

    fn require_release_type(branch_type: BranchType) -> Result<()> {
        if branch_type.is_tagged() {
            Ok(())
        } else {
            Err(FlowError::unsupported(format!(
                "{} branches have no release workflow; use start/finish",
                branch_type
            )))
        }
    }

    /// Start a release or hotfix branch with its version bump committed.
    ///
    /// # Returns
    /// * `Ok(WorkflowResult)` - Branch created, files updated and committed
    /// * `Err` - A precondition failed (nothing changed) or a command failed
    pub fn init(&mut self, branch_type: BranchType, opts: &WorkflowOptions) -> Result<WorkflowResult> {
        Self::require_release_type(branch_type)?;
        {
            let lifecycle = self.lifecycle();
            lifecycle.require_clean()?;
            lifecycle.require_integration_branches()?;
        }

        let version_path = self.repo.workdir().join(&self.config.files.version);
        let current = read_version_file(&version_path)?;

        let mut target = match &opts.version {
            Some(explicit) => Version::validate(explicit)?,
            None => {
                let kind = opts
                    .bump
                    .clone()
                    .unwrap_or_else(|| branch_type.default_bump().as_str().to_string());
                current.bump_named(&kind)?
            }
        };

        let question = format!("Start {} {} (current {})?", branch_type, target, current);
        if !self.prompt.confirm(&question, true, self.interactive)? {
            let answer = self
                .prompt
                .input("Version to use", &target.to_string(), self.interactive)?;
            target = Version::validate(&answer)?;
        }

        if compare(&target, &current) == Ordering::Less {
            return Err(FlowError::VersionRegression {
                current: current.to_string(),
                new: target.to_string(),
            });
        }

        let branch = match &opts.name {
            Some(name) => BranchRef::new(branch_type, name.as_str())?,
            None => BranchRef::for_version(branch_type, &target),
        };
        let full = branch.full_name(self.config.prefix_for(branch_type));
        self.lifecycle().require_missing(&full)?;

        tracing::info!(branch = %full, from = %current, to = %target, "initializing workflow");
        let start_opts = WorkflowOptions {
            fetch: !self.adapter.is_offline(),
            force: false,
            base: None,
            ..opts.clone()
        };
        self.lifecycle().start(branch_type, &branch.name, &start_opts)?;

        let dry_run = self.adapter.is_dry_run();
        let version_changed = if dry_run {
            let changed = target != current;
            if changed {
                ui::display_dry_run(&format!(
                    "write {} to {}",
                    target,
                    self.config.files.version
                ));
            }
            changed
        } else {
            write_version_file(&version_path, &target)?
        };

        let changelog_updated = if opts.no_changelog {
            false
        } else {
            let outcome = self.changelog().generate(&target, self.today, dry_run)?;
            outcome.applied || (dry_run && !outcome.already_present)
        };

        let mut changed_files: Vec<String> = Vec::new();
        if version_changed {
            changed_files.push(self.config.files.version.clone());
        }
        if changelog_updated {
            changed_files.push(self.config.files.changelog.clone());
        }

        if changed_files.is_empty() {
            self.warn(FlowWarning::NothingChanged {
                version: target.to_string(),
            });
        } else {
            let mut add = vec!["add".to_string()];
            add.extend(changed_files);
            self.adapter.run(&add[..])?;
            let message = format!("chore: bump version to {} for {}", target, branch_type);
            self.adapter.run(&["commit", "-m", message.as_str()])?;
        }

        if opts.push {
            if self.adapter.is_offline() {
                self.warn(FlowWarning::PushSkippedOffline {
                    branch: full.clone(),
                });
            }
            let remote = self.config.remote.clone();
            self.adapter
                .run_remote(&["push", "-u", remote.as_str(), full.as_str()], true)?;
        }

        ui::display_success(&format!("{} {} started on {}", branch_type, target, full));
        Ok(WorkflowResult {
            kind: branch_type.to_string(),
            action: "start".to_string(),
            branch: full,
            version: target.to_string(),
            tag: None,
            version_changed,
            changelog_updated,
            branch_deleted: false,
            warnings: self.take_warnings(),
        })
    }

    /// Pick the branch to finish.
    ///
    /// `--branch` accepts the short or the full name. Without it the local
    /// `<type>/*` branches are candidates. A single candidate is taken as is.
    /// Several are offered as a numbered list when interactive and refused
    /// otherwise.
    pub fn resolve_branch(&mut self, branch_type: BranchType, opts: &WorkflowOptions) -> Result<String> {
        let prefix = self.config.prefix_for(branch_type).to_string();

        if let Some(explicit) = &opts.branch {
            let full = if explicit.starts_with(&prefix) {
                explicit.clone()
            } else {
                format!("{}{}", prefix, explicit)
            };
            self.lifecycle().require_branch(&full)?;
            return Ok(full);
        }

        let candidates = self.lifecycle().list(Some(branch_type))?;
        if candidates.is_empty() {
            return Err(FlowError::BranchNotFound(format!("{}*", prefix)));
        }

        if let [only] = candidates.as_slice() {
            ui::display_status(&format!("Using {}", only));
            return Ok(only.clone());
        }
        if !self.interactive {
            return Err(FlowError::AmbiguousBranch(candidates));
        }
        let title = format!("Select the {} branch to finish:", branch_type);
        let index = self.prompt.select(&title, &candidates, true)?;
        Ok(candidates[index].clone())
    }

    /// Version a branch stands for; the branch name wins over the version file.
    fn branch_version(&mut self, full: &str) -> Result<Version> {
        let version_path = self.repo.workdir().join(&self.config.files.version);
        let Some(from_branch) = version_from_branch(full) else {
            return read_version_file(&version_path);
        };
        if let Ok(from_file) = read_version_file(&version_path) {
            if from_file != from_branch {
                self.warn(FlowWarning::VersionMismatch {
                    branch: full.to_string(),
                    branch_version: from_branch.to_string(),
                    file_version: from_file.to_string(),
                });
            }
        }
        Ok(from_branch)
    }

    /// Merge, tag and close a release or hotfix branch.
    pub fn finalize(&mut self, branch_type: BranchType, opts: &WorkflowOptions) -> Result<WorkflowResult> {
        Self::require_release_type(branch_type)?;
        {
            let lifecycle = self.lifecycle();
            lifecycle.require_clean()?;
            lifecycle.require_integration_branches()?;
        }

        let full = self.resolve_branch(branch_type, opts)?;
        let prefix = self.config.prefix_for(branch_type);
        let name = full.strip_prefix(prefix).unwrap_or(&full).to_string();
        BranchRef::new(branch_type, name.as_str())?;
        let version = self.branch_version(&full)?;

        let tag = match &opts.tag {
            Some(tag) => Tag::new(tag.as_str()),
            None => Tag::for_version(&self.config.tag_prefix, &version),
        };
        self.lifecycle().require_tag_missing(&tag.name)?;

        tracing::info!(branch = %full, %version, tag = %tag.name, "finalizing workflow");
        self.lifecycle().sync_for_finish(branch_type, &full)?;

        let changelog_updated = if opts.no_changelog {
            false
        } else {
            let dry_run = self.adapter.is_dry_run();
            self.adapter.run(&["checkout", full.as_str()])?;
            let outcome = self.changelog().generate(&version, self.today, dry_run)?;
            if outcome.applied {
                let changelog = self.config.files.changelog.clone();
                self.adapter.run(&["add", changelog.as_str()])?;
                let message = format!("docs: update changelog for v{}", version);
                self.adapter.run(&["commit", "-m", message.as_str()])?;
            }
            outcome.applied || (dry_run && !outcome.already_present)
        };

        let message = opts
            .message
            .clone()
            .unwrap_or_else(|| default_finish_message(branch_type, &version));
        let finish_opts = WorkflowOptions {
            tag: Some(tag.name.clone()),
            message: Some(message),
            ..opts.clone()
        };
        let outcome = self.lifecycle().finish_synced(branch_type, &name, &finish_opts)?;

        Ok(WorkflowResult {
            kind: branch_type.to_string(),
            action: "finish".to_string(),
            branch: outcome.branch,
            version: version.to_string(),
            tag: Some(tag.name),
            version_changed: false,
            changelog_updated,
            branch_deleted: outcome.deleted,
            warnings: self.take_warnings(),
        })
    }
}

/// `Release v1.2.0` / `Hotfix v1.2.1`
pub fn default_finish_message(branch_type: BranchType, version: &Version) -> String {
    let kind = match branch_type {
        BranchType::Hotfix => "Hotfix",
        _ => "Release",
    };
    format!("{} v{}", kind, version)
}
