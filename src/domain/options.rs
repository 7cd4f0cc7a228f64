/// Options shared by every workflow command.
///
/// Each flag has one effect; all default to off/absent:
/// - `name`: explicit branch short name (release/hotfix start)
/// - `base`: base branch for `start` instead of the type's default
/// - `tag` / `message`: tag name and message for `finish`
/// - `push`: push the branch (start) or merged results (finish)
/// - `force`: replace an existing branch on `start`, unconditional `delete`
/// - `squash`: squash the branch when finishing
/// - `keep_branch`: keep the branch after `finish`
/// - `fetch`: fast-forward the base branch before `start`
/// - `dry_run`: log mutating commands without running them
/// - `offline`: skip every push/pull/fetch
/// - `yes`: never prompt
/// - `no_changelog`: do not touch the changelog
/// - `bump` / `version`: version selection for release/hotfix start
/// - `branch`: explicit branch for release/hotfix finish
/// - `json`: print the operation summary as JSON
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowOptions {
    pub name: Option<String>,
    pub base: Option<String>,
    pub tag: Option<String>,
    pub message: Option<String>,
    pub push: bool,
    pub force: bool,
    pub squash: bool,
    pub keep_branch: bool,
    pub fetch: bool,
    pub dry_run: bool,
    pub offline: bool,
    pub yes: bool,
    pub no_changelog: bool,
    pub bump: Option<String>,
    pub version: Option<String>,
    pub branch: Option<String>,
    pub json: bool,
}

/// Environment variable whose presence marks a CI run
pub const CI_ENV_VAR: &str = "CI";

impl WorkflowOptions {
    /// Whether prompts may block for input.
    ///
    /// `ci` is the presence of the CI indicator; `tty` whether stdin is a terminal.
    pub fn interactive(&self, ci: bool, tty: bool) -> bool {
        !self.yes && !ci && tty
    }
}
