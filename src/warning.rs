use std::fmt;

/// Non-fatal conditions reported to the operator while a workflow runs.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowWarning {
    /// An existing branch is deleted without the merged check
    ForceDelete { branch: String },
    /// `--push` was requested but the run is offline
    PushSkippedOffline { branch: String },
    /// The configured remote does not exist, so no pull happens
    NoRemote { remote: String },
    /// The branch name and the version file disagree
    VersionMismatch {
        branch: String,
        branch_version: String,
        file_version: String,
    },
    /// Neither the version file nor the changelog changed
    NothingChanged { version: String },
    /// No commits since the last tag; the changelog gets a placeholder entry
    NoCommitsSinceTag { tag: Option<String> },
}

impl fmt::Display for FlowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowWarning::ForceDelete { branch } => write!(
                f,
                "Force-deleting branch '{}'; unmerged commits on it will be lost",
                branch
            ),
            FlowWarning::PushSkippedOffline { branch } => {
                write!(f, "Offline mode: not pushing '{}'", branch)
            }
            FlowWarning::NoRemote { remote } => write!(
                f,
                "Remote '{}' is not configured; using local branch state",
                remote
            ),
            FlowWarning::VersionMismatch {
                branch,
                branch_version,
                file_version,
            } => write!(
                f,
                "Branch '{}' is version {} but the version file says {}; using {}",
                branch, branch_version, file_version, branch_version
            ),
            FlowWarning::NothingChanged { version } => write!(
                f,
                "Neither the version file nor the changelog changed for {}; double-check this run",
                version
            ),
            FlowWarning::NoCommitsSinceTag { tag } => match tag {
                Some(tag) => write!(f, "No commits since tag '{}'", tag),
                None => write!(f, "No commits found in history"),
            },
        }
    }
}
