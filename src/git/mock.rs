use crate::error::Result;
use crate::git::adapter::{CommandOutput, CommandRunner};
use crate::git::Repository;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Mock repository for testing without an actual git repository
pub struct MockRepository {
    workdir: PathBuf,
    branches: BTreeSet<String>,
    tags: BTreeSet<String>,
    remotes: BTreeSet<String>,
    commits: Vec<String>,
    last_tag: Option<String>,
    current: Option<String>,
    clean: bool,
}

impl MockRepository {
    /// Create a new empty, clean mock repository rooted at `.`
    pub fn new() -> Self {
        MockRepository {
            workdir: PathBuf::from("."),
            branches: BTreeSet::new(),
            tags: BTreeSet::new(),
            remotes: BTreeSet::new(),
            commits: Vec::new(),
            last_tag: None,
            current: None,
            clean: true,
        }
    }

    /// Point the working tree at a real directory (for file-backed tests)
    pub fn set_workdir(&mut self, path: impl Into<PathBuf>) {
        self.workdir = path.into();
    }

    /// Add a local branch
    pub fn add_branch(&mut self, name: impl Into<String>) {
        self.branches.insert(name.into());
    }

    /// Add a tag; the most recently added tag becomes the describe result
    pub fn add_tag(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.last_tag = Some(name.clone());
        self.tags.insert(name);
    }

    /// Add a configured remote
    pub fn add_remote(&mut self, name: impl Into<String>) {
        self.remotes.insert(name.into());
    }

    /// Add a commit subject after the last tag (newest last)
    pub fn add_commit(&mut self, subject: impl Into<String>) {
        self.commits.push(subject.into());
    }

    /// Mark the working tree dirty or clean
    pub fn set_clean(&mut self, clean: bool) {
        self.clean = clean;
    }

    /// Set the checked-out branch
    pub fn set_current_branch(&mut self, name: impl Into<String>) {
        self.current = Some(name.into());
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn branch_exists(&self, name: &str) -> Result<bool> {
        Ok(self.branches.contains(name))
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tags.contains(name))
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        Ok(self.branches.iter().cloned().collect())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.tags.iter().cloned().collect())
    }

    fn is_clean(&self) -> Result<bool> {
        Ok(self.clean)
    }

    fn last_tag(&self) -> Result<Option<String>> {
        Ok(self.last_tag.clone())
    }

    fn commit_subjects(&self, _since: Option<&str>) -> Result<Vec<String>> {
        Ok(self.commits.iter().rev().cloned().collect())
    }

    fn has_remote(&self, name: &str) -> Result<bool> {
        Ok(self.remotes.contains(name))
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.current.clone())
    }
}

/// Command runner that records invocations instead of spawning processes.
///
/// Clones share the same call log, so a test can keep one handle while the
/// adapter owns another. Every command succeeds with empty output unless a
/// response was scripted for it.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    calls: Rc<RefCell<Vec<Vec<String>>>>,
    responses: Rc<RefCell<HashMap<String, CommandOutput>>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for the exact argument list `args` (space-joined)
    pub fn respond(&self, args: &str, output: CommandOutput) {
        self.responses.borrow_mut().insert(args.to_string(), output);
    }

    /// Script a failure for the exact argument list `args` (space-joined)
    pub fn fail_on(&self, args: &str, code: i32, stderr: &str) {
        self.respond(args, CommandOutput::failure(code, stderr));
    }

    /// Argument lists of every executed command, in order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// Executed commands as space-joined strings
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.join(" ")).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(
        &self,
        _program: &str,
        args: &[String],
        _cwd: &Path,
        _stream: bool,
    ) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(args.to_vec());
        let key = args.join(" ");
        Ok(self
            .responses
            .borrow()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| CommandOutput::success("")))
    }
}
