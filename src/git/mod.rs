//! Git access layer
//!
//! Two seams keep the workflow code testable:
//!
//! - [Repository] answers read-only questions about the working copy
//!   (branches, tags, cleanliness, history). [repository::Git2Repository]
//!   implements it with the `git2` crate, [mock::MockRepository] in memory.
//! - [adapter::GitAdapter] runs every mutating `git` / `git flow` command as a
//!   subprocess. Dry-run, offline and allow-fail handling live there and only
//!   there, and each invocation is recorded for the JSON summary.
//!
//! Queries never mutate, so they are answered even in dry-run mode.

pub mod adapter;
pub mod mock;
pub mod repository;

pub use adapter::{
    CommandOutput, CommandRunner, GitAdapter, InvokeOptions, OperationRecord, OperationStatus,
    SystemRunner,
};
pub use mock::{MockRepository, RecordingRunner};
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::Path;

/// Read-only view of a git working copy
///
/// ## Error Handling
///
/// Existence checks return `Ok(false)` for absent refs; `Err` is reserved for
/// real failures reading the repository.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): real repository via `git2`
/// - [MockRepository](mock::MockRepository): in-memory test double
pub trait Repository {
    /// Root of the working tree
    fn workdir(&self) -> &Path;

    /// Whether a local branch exists (short name, e.g. `feature/login`)
    fn branch_exists(&self, name: &str) -> Result<bool>;

    /// Whether a tag exists
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// All local branch names, sorted
    fn list_branches(&self) -> Result<Vec<String>>;

    /// All tag names, sorted
    fn list_tags(&self) -> Result<Vec<String>>;

    /// True when no tracked file differs from HEAD (untracked files ignored)
    fn is_clean(&self) -> Result<bool>;

    /// Most recent tag reachable from HEAD, `None` if there is none
    fn last_tag(&self) -> Result<Option<String>>;

    /// Commit subjects in `since..HEAD`, newest first.
    ///
    /// `since` is a tag name and is excluded; `None` walks the whole history.
    fn commit_subjects(&self, since: Option<&str>) -> Result<Vec<String>>;

    /// Whether a remote with this name is configured
    fn has_remote(&self, name: &str) -> Result<bool>;

    /// Checked-out branch, `None` when HEAD is detached or unborn
    fn current_branch(&self) -> Result<Option<String>>;
}
