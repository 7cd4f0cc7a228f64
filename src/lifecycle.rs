//! Branch lifecycle engine.
//!
//! A workflow branch is either missing or existing:
//!
//! ```text
//! Missing --start--> Existing --publish/track--> Existing --finish/delete--> Missing
//! ```
//!
//! Every operation checks its preconditions against the live repository
//! before the first mutation. Mutations go through [GitAdapter]; once one has
//! run, later failures are reported but nothing is rolled back.

use crate::config::Config;
use crate::domain::{BranchRef, BranchType, WorkflowOptions};
use crate::error::{FlowError, Result};
use crate::git::{GitAdapter, Repository};
use crate::ui;
use crate::warning::FlowWarning;

/// Outcome of a successful finish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishOutcome {
    pub branch: String,
    pub tag: Option<String>,
    pub deleted: bool,
}

/// Drives start/finish/publish/track/delete for one repository.
pub struct BranchLifecycle<'a> {
    repo: &'a dyn Repository,
    adapter: &'a mut GitAdapter,
    config: &'a Config,
}

impl<'a> BranchLifecycle<'a> {
    pub fn new(repo: &'a dyn Repository, adapter: &'a mut GitAdapter, config: &'a Config) -> Self {
        BranchLifecycle {
            repo,
            adapter,
            config,
        }
    }

    /// Full branch name, e.g. `feature/login`
    pub fn full_name(&self, branch: &BranchRef) -> String {
        branch.full_name(self.config.prefix_for(branch.branch_type))
    }

    /// Main-line branch; a repository with only `master` is accepted when
    /// the configured name is the default `main`.
    pub fn main_branch(&self) -> Result<String> {
        let configured = &self.config.branches.main;
        if configured == "main"
            && !self.repo.branch_exists(configured)?
            && self.repo.branch_exists("master")?
        {
            return Ok("master".to_string());
        }
        Ok(configured.clone())
    }

    pub fn develop_branch(&self) -> &str {
        &self.config.branches.develop
    }

    /// Base a new branch of this type starts from
    pub fn default_base(&self, branch_type: BranchType) -> Result<String> {
        if branch_type.branches_from_main() {
            self.main_branch()
        } else {
            Ok(self.develop_branch().to_string())
        }
    }

    /// Branches a finished branch is merged into
    pub fn merge_targets(&self, branch_type: BranchType) -> Result<Vec<String>> {
        Ok(match branch_type {
            BranchType::Feature => vec![self.develop_branch().to_string()],
            BranchType::Release | BranchType::Hotfix => {
                vec![self.main_branch()?, self.develop_branch().to_string()]
            }
            BranchType::Support => Vec::new(),
        })
    }

    pub fn require_clean(&self) -> Result<()> {
        if self.repo.is_clean()? {
            Ok(())
        } else {
            Err(FlowError::DirtyTree)
        }
    }

    pub fn require_branch(&self, name: &str) -> Result<()> {
        if self.repo.branch_exists(name)? {
            Ok(())
        } else {
            Err(FlowError::BranchNotFound(name.to_string()))
        }
    }

    pub fn require_missing(&self, name: &str) -> Result<()> {
        if self.repo.branch_exists(name)? {
            Err(FlowError::BranchAlreadyExists(name.to_string()))
        } else {
            Ok(())
        }
    }

    /// Main-line and integration branches must both exist.
    pub fn require_integration_branches(&self) -> Result<()> {
        self.require_branch(&self.main_branch()?)?;
        self.require_branch(self.develop_branch())
    }

    pub fn require_tag_missing(&self, tag: &str) -> Result<()> {
        if self.repo.tag_exists(tag)? {
            Err(FlowError::DuplicateTag(tag.to_string()))
        } else {
            Ok(())
        }
    }

    /// Leading `git flow <type> <action>` arguments.
    ///
    /// The resolved main-line and integration branch names and the type's
    /// prefix are passed as `-c` overrides, so git-flow acts on the same
    /// branches this crate validated instead of its own `gitflow.*` settings.
    fn flow_command(&self, branch_type: BranchType, action: &str) -> Result<Vec<String>> {
        Ok(vec![
            "-c".into(),
            format!("gitflow.branch.master={}", self.main_branch()?),
            "-c".into(),
            format!("gitflow.branch.develop={}", self.develop_branch()),
            "-c".into(),
            format!(
                "gitflow.prefix.{}={}",
                branch_type,
                self.config.prefix_for(branch_type)
            ),
            "flow".into(),
            branch_type.as_str().into(),
            action.into(),
        ])
    }

    /// Fast-forward a local branch from the remote.
    ///
    /// Skipped offline, without a configured remote, or when the remote has
    /// no such branch.
    pub fn sync_branch(&mut self, name: &str) -> Result<()> {
        if self.adapter.is_offline() {
            tracing::info!(branch = name, "offline, not updating");
            return Ok(());
        }
        let remote = self.config.remote.clone();
        if !self.repo.has_remote(&remote)? {
            ui::display_warning(&FlowWarning::NoRemote { remote });
            return Ok(());
        }
        let on_remote = self
            .adapter
            .probe_remote(&["ls-remote", "--exit-code", "--heads", remote.as_str(), name])?;
        if on_remote.is_none() {
            tracing::debug!(branch = name, remote = %remote, "branch not on remote, not updating");
            return Ok(());
        }

        ui::display_status(&format!("Updating {} from {}", name, remote));
        self.adapter.run(&["checkout", name])?;
        self.adapter
            .run_remote(&["pull", "--ff-only", remote.as_str(), name], false)?;
        Ok(())
    }

    /// Create `<type>/<name>` from its base branch.
    ///
    /// # Returns
    /// * `Ok(String)` - Full name of the created branch
    /// * `Err` - Invalid name, dirty tree, missing base, existing branch
    ///   without `force`, or a failed command
    pub fn start(&mut self, branch_type: BranchType, name: &str, opts: &WorkflowOptions) -> Result<String> {
        let branch = BranchRef::new(branch_type, name)?;
        self.require_clean()?;

        let base = match &opts.base {
            Some(base) => base.clone(),
            None => self.default_base(branch_type)?,
        };
        self.require_branch(&base)?;

        let full = self.full_name(&branch);
        if self.repo.branch_exists(&full)? {
            if !opts.force {
                return Err(FlowError::BranchAlreadyExists(full));
            }
            ui::display_warning(&FlowWarning::ForceDelete {
                branch: full.clone(),
            });
            self.adapter.run(&["checkout", base.as_str()])?;
            self.adapter.run(&["branch", "-D", full.as_str()])?;
        }

        if opts.fetch {
            self.sync_branch(&base)?;
        }

        tracing::info!(branch = %full, base = %base, "starting branch");
        let mut args = self.flow_command(branch_type, "start")?;
        args.extend([branch.name.clone(), base.clone()]);
        self.adapter.run(&args[..])?;
        ui::display_success(&format!("Started {} from {}", full, base));
        Ok(full)
    }

    /// Merge `<type>/<name>` back and, for release/hotfix, tag it.
    ///
    /// Release and hotfix finishes need both `tag` and `message`; those are
    /// checked before anything else touches the repository.
    pub fn finish(&mut self, branch_type: BranchType, name: &str, opts: &WorkflowOptions) -> Result<FinishOutcome> {
        self.finish_inner(branch_type, name, opts, true)
    }

    /// Finish without the pre-merge fast-forward; the caller already did it.
    pub(crate) fn finish_synced(
        &mut self,
        branch_type: BranchType,
        name: &str,
        opts: &WorkflowOptions,
    ) -> Result<FinishOutcome> {
        self.finish_inner(branch_type, name, opts, false)
    }

    fn finish_inner(
        &mut self,
        branch_type: BranchType,
        name: &str,
        opts: &WorkflowOptions,
        sync: bool,
    ) -> Result<FinishOutcome> {
        let branch = BranchRef::new(branch_type, name)?;
        if branch_type == BranchType::Support {
            return Err(FlowError::unsupported("support branches cannot be finished"));
        }

        let tag_and_message = if branch_type.is_tagged() {
            let command = format!("finish {}", branch_type);
            let tag = opts
                .tag
                .clone()
                .ok_or_else(|| FlowError::missing_option(&command, "tag"))?;
            let message = opts
                .message
                .clone()
                .ok_or_else(|| FlowError::missing_option(&command, "message"))?;
            Some((tag, message))
        } else {
            None
        };

        self.require_clean()?;
        let full = self.full_name(&branch);
        self.require_branch(&full)?;
        if let Some((tag, _)) = &tag_and_message {
            self.require_tag_missing(tag)?;
        }

        if sync {
            self.sync_for_finish(branch_type, &full)?;
        }

        let mut args = self.flow_command(branch_type, "finish")?;
        args.push("-k".into());
        if let Some((tag, message)) = &tag_and_message {
            args.extend(["-m".into(), message.clone(), "-T".into(), tag.clone()]);
        }
        if opts.squash {
            args.push("-S".into());
        }
        if opts.push {
            if self.adapter.is_offline() {
                ui::display_warning(&FlowWarning::PushSkippedOffline {
                    branch: full.clone(),
                });
            } else {
                args.push("-p".into());
            }
        }
        args.push(branch.name.clone());

        tracing::info!(branch = %full, "finishing branch");
        self.adapter.run_streamed(&args[..])?;

        let deleted = if opts.keep_branch {
            false
        } else {
            self.adapter.run(&["branch", "-d", full.as_str()])?;
            true
        };

        ui::display_success(&format!("Finished {}", full));
        Ok(FinishOutcome {
            branch: full,
            tag: tag_and_message.map(|(tag, _)| tag),
            deleted,
        })
    }

    /// Fast-forward the branch and the branches it merges into.
    pub fn sync_for_finish(&mut self, branch_type: BranchType, full: &str) -> Result<()> {
        if self.adapter.is_offline() {
            return Ok(());
        }
        self.sync_branch(full)?;
        for target in self.merge_targets(branch_type)? {
            self.sync_branch(&target)?;
        }
        Ok(())
    }

    /// Push an existing branch to the remote.
    pub fn publish(&mut self, branch_type: BranchType, name: &str, _opts: &WorkflowOptions) -> Result<String> {
        let branch = BranchRef::new(branch_type, name)?;
        let full = self.full_name(&branch);
        self.require_branch(&full)?;
        let mut args = self.flow_command(branch_type, "publish")?;
        args.push(branch.name.clone());
        self.adapter.run_remote(&args[..], true)?;
        ui::display_success(&format!("Published {}", full));
        Ok(full)
    }

    /// Create a local tracking branch for a remote workflow branch.
    pub fn track(&mut self, branch_type: BranchType, name: &str, _opts: &WorkflowOptions) -> Result<String> {
        let branch = BranchRef::new(branch_type, name)?;
        let full = self.full_name(&branch);
        self.require_missing(&full)?;
        let mut args = self.flow_command(branch_type, "track")?;
        args.push(branch.name.clone());
        self.adapter.run_remote(&args[..], true)?;
        ui::display_success(&format!("Tracking {}", full));
        Ok(full)
    }

    /// Delete a local workflow branch; `force` also deletes unmerged work.
    pub fn delete(&mut self, branch_type: BranchType, name: &str, opts: &WorkflowOptions) -> Result<String> {
        let branch = BranchRef::new(branch_type, name)?;
        let full = self.full_name(&branch);
        self.require_branch(&full)?;

        let mut args = self.flow_command(branch_type, "delete")?;
        if opts.force {
            ui::display_warning(&FlowWarning::ForceDelete {
                branch: full.clone(),
            });
            args.push("-f".into());
        }
        args.push(branch.name.clone());
        self.adapter.run(&args[..])?;
        ui::display_success(&format!("Deleted {}", full));
        Ok(full)
    }

    /// Local workflow branches, optionally of one type, sorted
    pub fn list(&self, branch_type: Option<BranchType>) -> Result<Vec<String>> {
        let types: Vec<BranchType> = match branch_type {
            Some(t) => vec![t],
            None => BranchType::ALL.to_vec(),
        };
        let prefixes: Vec<&str> = types.iter().map(|t| self.config.prefix_for(*t)).collect();
        let mut branches: Vec<String> = self
            .repo
            .list_branches()?
            .into_iter()
            .filter(|b| prefixes.iter().any(|p| b.starts_with(p)))
            .collect();
        branches.sort();
        Ok(branches)
    }
}
