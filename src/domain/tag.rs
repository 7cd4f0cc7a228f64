use crate::domain::version::Version;
use regex::Regex;
use std::sync::OnceLock;

/// Represents a git tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    /// Create a new tag from a string
    pub fn new(name: impl Into<String>) -> Self {
        Tag { name: name.into() }
    }

    /// Tag for a release version, e.g. prefix "v" and 1.2.3 -> "v1.2.3"
    pub fn for_version(prefix: &str, version: &Version) -> Self {
        Tag::new(version.tag_name(prefix))
    }

    /// Extract the version from the tag when it is `<prefix><semver>`
    pub fn version(&self, prefix: &str) -> Option<Version> {
        self.name.strip_prefix(prefix).and_then(Version::parse)
    }
}

fn branch_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"v(\d+\.\d+\.\d+)$").expect("static regex"))
}

/// Version encoded at the end of a branch name, e.g. `release/v1.10.0`.
///
/// Non-canonical numbers (leading zeros) yield `None`.
pub fn version_from_branch(branch: &str) -> Option<Version> {
    branch_version_regex()
        .captures(branch)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Version::parse(m.as_str()))
}
