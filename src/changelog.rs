//! Changelog generation from the commits since the last tag.

use crate::domain::changelog::{entry_line, has_section, prepend_section};
use crate::domain::{ChangelogSection, Version};
use crate::error::Result;
use crate::git::Repository;
use crate::ui;
use crate::warning::FlowWarning;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

/// Result of trying to add a section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// The file was written
    pub applied: bool,
    /// A heading for the version was already there
    pub already_present: bool,
}

/// Builds changelog sections from repository history and writes them to one file.
pub struct ChangelogGenerator<'a> {
    repo: &'a dyn Repository,
    path: PathBuf,
}

impl<'a> ChangelogGenerator<'a> {
    pub fn new(repo: &'a dyn Repository, path: impl Into<PathBuf>) -> Self {
        ChangelogGenerator {
            repo,
            path: path.into(),
        }
    }

    /// Most recent tag reachable from HEAD
    pub fn last_tag(&self) -> Result<Option<String>> {
        self.repo.last_tag()
    }

    /// `- <subject>` lines for commits after `tag`, newest first
    pub fn commits_since(&self, tag: Option<&str>) -> Result<Vec<String>> {
        Ok(self
            .repo
            .commit_subjects(tag)?
            .iter()
            .map(|subject| entry_line(subject))
            .collect())
    }

    /// Whether the file already has a section for `version`
    pub fn contains(&self, version: &Version) -> Result<bool> {
        Ok(has_section(&self.read_existing()?, version))
    }

    /// Add `section` above the existing content.
    ///
    /// Nothing is written when the version is already present or in dry-run.
    pub fn append(&self, section: &ChangelogSection, dry_run: bool) -> Result<AppendOutcome> {
        let existing = self.read_existing()?;
        if has_section(&existing, &section.version) {
            ui::display_status(&format!(
                "{} already has a section for v{}",
                self.path.display(),
                section.version
            ));
            return Ok(AppendOutcome {
                applied: false,
                already_present: true,
            });
        }

        if dry_run {
            ui::display_dry_run(&format!(
                "prepend '{}' ({} entries) to {}",
                section.heading(),
                section.entries.len(),
                self.path.display()
            ));
            return Ok(AppendOutcome {
                applied: false,
                already_present: false,
            });
        }

        fs::write(&self.path, prepend_section(&existing, section))?;
        tracing::info!(path = %self.path.display(), version = %section.version, "changelog updated");
        Ok(AppendOutcome {
            applied: true,
            already_present: false,
        })
    }

    /// Build the section for `version` from history and append it.
    ///
    /// History is only read when the version is not in the file yet.
    pub fn generate(&self, version: &Version, date: NaiveDate, dry_run: bool) -> Result<AppendOutcome> {
        if self.contains(version)? {
            return self.append(&ChangelogSection::build(*version, date, Vec::new()), dry_run);
        }

        let tag = self.last_tag()?;
        let commits = self.commits_since(tag.as_deref())?;
        if commits.is_empty() {
            ui::display_warning(&FlowWarning::NoCommitsSinceTag { tag: tag.clone() });
        }
        let section = ChangelogSection::build(*version, date, commits);
        self.append(&section, dry_run)
    }

    fn read_existing(&self) -> Result<String> {
        if self.path.exists() {
            Ok(fs::read_to_string(&self.path)?)
        } else {
            Ok(String::new())
        }
    }
}
