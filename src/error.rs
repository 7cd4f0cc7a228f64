use thiserror::Error;

/// Unified error type for git-flowkit operations
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid version format: '{0}' - expected X.Y.Z without leading zeros")]
    InvalidVersionFormat(String),

    #[error("Version regression: {new} is lower than the current version {current}")]
    VersionRegression { current: String, new: String },

    #[error("Version file not found: {0}")]
    MissingVersionFile(String),

    #[error("Working tree has uncommitted changes; commit or stash them first")]
    DirtyTree,

    #[error("Branch '{0}' already exists")]
    BranchAlreadyExists(String),

    #[error("Branch '{0}' does not exist")]
    BranchNotFound(String),

    #[error("Tag '{0}' already exists")]
    DuplicateTag(String),

    #[error("Missing required option --{option} for {command}")]
    MissingRequiredOption { command: String, option: String },

    #[error("Multiple candidate branches ({}); pass --branch to choose one", .0.join(", "))]
    AmbiguousBranch(Vec<String>),

    #[error("Command `{command}` failed with exit code {code}: {stderr}")]
    SubprocessFailure {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Invalid branch name '{0}': only letters, digits, '_' and '-' are allowed")]
    InvalidBranchName(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-flowkit
pub type Result<T> = std::result::Result<T, FlowError>;

impl FlowError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        FlowError::Config(msg.into())
    }

    /// Create a missing-option error for a command
    pub fn missing_option(command: impl Into<String>, option: impl Into<String>) -> Self {
        FlowError::MissingRequiredOption {
            command: command.into(),
            option: option.into(),
        }
    }

    /// Create an unsupported-operation error with context
    pub fn unsupported(msg: impl Into<String>) -> Self {
        FlowError::UnsupportedOperation(msg.into())
    }

    /// Create a prompt error with context
    pub fn prompt(msg: impl Into<String>) -> Self {
        FlowError::Prompt(msg.into())
    }

    /// True for failures detected before any repository mutation
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            FlowError::InvalidVersionFormat(_)
                | FlowError::VersionRegression { .. }
                | FlowError::MissingVersionFile(_)
                | FlowError::DirtyTree
                | FlowError::BranchAlreadyExists(_)
                | FlowError::BranchNotFound(_)
                | FlowError::DuplicateTag(_)
                | FlowError::MissingRequiredOption { .. }
                | FlowError::AmbiguousBranch(_)
                | FlowError::InvalidBranchName(_)
                | FlowError::UnsupportedOperation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FlowError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FlowError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_missing_option_display() {
        let err = FlowError::missing_option("finish release", "tag");
        assert_eq!(
            err.to_string(),
            "Missing required option --tag for finish release"
        );
    }

    #[test]
    fn test_ambiguous_branch_lists_candidates() {
        let err = FlowError::AmbiguousBranch(vec![
            "release/v1.0.0".to_string(),
            "release/v1.1.0".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("release/v1.0.0, release/v1.1.0"));
    }

    #[test]
    fn test_subprocess_failure_carries_stderr() {
        let err = FlowError::SubprocessFailure {
            command: "git checkout develop".to_string(),
            code: 128,
            stderr: "pathspec 'develop' did not match".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("git checkout develop"));
        assert!(msg.contains("128"));
        assert!(msg.contains("did not match"));
    }

    #[test]
    fn test_precondition_classification() {
        assert!(FlowError::DirtyTree.is_precondition());
        assert!(FlowError::DuplicateTag("v1.0.0".into()).is_precondition());
        assert!(FlowError::InvalidBranchName("bad name".into()).is_precondition());
        assert!(!FlowError::config("x").is_precondition());
        assert!(!FlowError::SubprocessFailure {
            command: "git".into(),
            code: 1,
            stderr: String::new(),
        }
        .is_precondition());
    }

    #[test]
    fn test_error_special_characters_in_messages() {
        let special_chars = vec![
            "name with\nnewline",
            "name with 'quotes'",
            "name with \"double quotes\"",
            "name with unicode: ñ",
        ];

        for name in special_chars {
            let err = FlowError::InvalidBranchName(name.to_string());
            assert!(err.to_string().contains(name));
        }
    }
}
