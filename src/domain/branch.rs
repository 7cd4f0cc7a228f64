use crate::domain::version::Version;
use crate::error::{FlowError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// git-flow branch families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchType {
    Feature,
    Release,
    Hotfix,
    Support,
}

impl BranchType {
    pub const ALL: [BranchType; 4] = [
        BranchType::Feature,
        BranchType::Release,
        BranchType::Hotfix,
        BranchType::Support,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchType::Feature => "feature",
            BranchType::Release => "release",
            BranchType::Hotfix => "hotfix",
            BranchType::Support => "support",
        }
    }

    /// Hotfix and support branches grow from the main line; the rest from develop.
    pub fn branches_from_main(&self) -> bool {
        matches!(self, BranchType::Hotfix | BranchType::Support)
    }

    /// Release and hotfix branches end in a tag.
    pub fn is_tagged(&self) -> bool {
        matches!(self, BranchType::Release | BranchType::Hotfix)
    }

    /// Default version bump for the release-style workflows
    pub fn default_bump(&self) -> crate::domain::VersionBump {
        match self {
            BranchType::Hotfix => crate::domain::VersionBump::Patch,
            _ => crate::domain::VersionBump::Minor,
        }
    }
}

impl fmt::Display for BranchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchType {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        BranchType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                FlowError::unsupported(format!(
                    "unknown branch type '{}' (expected feature, release, hotfix or support)",
                    s
                ))
            })
    }
}

fn plain_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static regex"))
}

/// Check a branch short name: ASCII letters, digits, underscores and hyphens,
/// or a version name such as `v1.10.0`.
pub fn validate_name(name: &str) -> Result<()> {
    if plain_name_regex().is_match(name) {
        return Ok(());
    }
    match name.strip_prefix('v').and_then(Version::parse) {
        Some(_) => Ok(()),
        None => Err(FlowError::InvalidBranchName(name.to_string())),
    }
}

/// A workflow branch: type plus short name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchRef {
    pub branch_type: BranchType,
    pub name: String,
}

impl BranchRef {
    /// Create a branch reference, validating the name.
    pub fn new(branch_type: BranchType, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(BranchRef { branch_type, name })
    }

    /// Branch named after a version, e.g. release + 1.10.0 -> `v1.10.0`
    pub fn for_version(branch_type: BranchType, version: &Version) -> Self {
        BranchRef {
            branch_type,
            name: format!("v{}", version),
        }
    }

    /// Full branch name with the given prefix (normally `<type>/`)
    pub fn full_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_type_roundtrip() {
        for t in BranchType::ALL {
            assert_eq!(t.as_str().parse::<BranchType>().unwrap(), t);
        }
        assert!("bugfix".parse::<BranchType>().is_err());
    }

    #[test]
    fn test_default_base_family() {
        assert!(!BranchType::Feature.branches_from_main());
        assert!(!BranchType::Release.branches_from_main());
        assert!(BranchType::Hotfix.branches_from_main());
        assert!(BranchType::Support.branches_from_main());
    }

    #[test]
    fn test_valid_names() {
        assert!(validate_name("login-form").is_ok());
        assert!(validate_name("JIRA_123").is_ok());
        assert!(validate_name("v1.10.0").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        for bad in ["bad name", "", "a/b", "dots.here", "v1.2", "semi;colon"] {
            let err = validate_name(bad).unwrap_err();
            assert!(matches!(err, FlowError::InvalidBranchName(_)), "{}", bad);
        }
    }

    #[test]
    fn test_non_ascii_letters_rejected() {
        for bad in ["café", "ветка", "名前", "login\u{00a0}form"] {
            assert!(validate_name(bad).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_branch_ref_full_name() {
        let r = BranchRef::new(BranchType::Feature, "login").unwrap();
        assert_eq!(r.full_name("feature/"), "feature/login");
    }

    #[test]
    fn test_branch_ref_for_version() {
        let r = BranchRef::for_version(BranchType::Release, &Version::new(1, 10, 0));
        assert_eq!(r.full_name("release/"), "release/v1.10.0");
    }
}
