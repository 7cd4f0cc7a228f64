use crate::error::{FlowError, Result};
use crate::git::Repository;
use git2::{
    BranchType, DescribeFormatOptions, DescribeOptions, ErrorCode, Repository as Git2Repo, Sort,
    StatusOptions,
};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository implementing the read-only trait
pub struct Git2Repository {
    repo: Git2Repo,
    workdir: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Self::from_git2(repo)
    }

    /// Create from existing git2::Repository; bare repositories are rejected
    pub fn from_git2(repo: Git2Repo) -> Result<Self> {
        let workdir = repo
            .workdir()
            .ok_or_else(|| FlowError::unsupported("bare repositories have no working tree"))?
            .to_path_buf();
        Ok(Git2Repository { repo, workdir })
    }
}

fn not_found(e: &git2::Error) -> bool {
    e.code() == ErrorCode::NotFound
}

impl Repository for Git2Repository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_branch(name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if not_found(&e) || e.code() == ErrorCode::InvalidSpec => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(_) => Ok(true),
            Err(e) if not_found(&e) || e.code() == ErrorCode::InvalidSpec => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;
        let mut names: Vec<String> = tags.iter().flatten().map(|s| s.to_string()).collect();
        names.sort();
        Ok(names)
    }

    fn is_clean(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);
        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses.is_empty())
    }

    fn last_tag(&self) -> Result<Option<String>> {
        let mut options = DescribeOptions::new();
        options.describe_tags();
        let describe = match self.repo.describe(&options) {
            Ok(describe) => describe,
            Err(e) => {
                // No tags, or no commits yet
                tracing::debug!(error = %e, "describe found no tag");
                return Ok(None);
            }
        };
        let mut format = DescribeFormatOptions::new();
        format.abbreviated_size(0);
        Ok(Some(describe.format(Some(&format))?))
    }

    fn commit_subjects(&self, since: Option<&str>) -> Result<Vec<String>> {
        let mut revwalk = self.repo.revwalk()?;
        match self.repo.head() {
            Ok(head) => {
                let oid = head.peel_to_commit()?.id();
                revwalk.push(oid)?;
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch || not_found(&e) => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        }
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        if let Some(tag) = since {
            let tagged = self
                .repo
                .find_reference(&format!("refs/tags/{}", tag))?
                .peel_to_commit()?;
            revwalk.hide(tagged.id())?;
        }

        let mut subjects = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let subject = commit.summary().unwrap_or("(no subject)").to_string();
            subjects.push(subject);
        }
        Ok(subjects)
    }

    fn has_remote(&self, name: &str) -> Result<bool> {
        match self.repo.find_remote(name) {
            Ok(_) => Ok(true),
            Err(e) if not_found(&e) || e.code() == ErrorCode::InvalidSpec => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn current_branch(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(str::to_string)),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::UnbornBranch || not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
