use crate::error::{FlowError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic version representation (`major.minor.patch`, nothing else)
///
/// Field order gives the derived `Ord` its lexicographic meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a canonical version string.
    ///
    /// Returns `None` for leading zeros, missing or extra segments, non-numeric
    /// parts, pre-release/build suffixes and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Self> {
        let parsed = semver::Version::parse(text).ok()?;
        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return None;
        }
        Some(Version::new(parsed.major, parsed.minor, parsed.patch))
    }

    /// Parse or fail with `InvalidVersionFormat`; used as a guard before mutations.
    pub fn validate(text: &str) -> Result<Self> {
        Version::parse(text).ok_or_else(|| FlowError::InvalidVersionFormat(text.to_string()))
    }

    /// Bump version according to bump type.
    ///
    /// Fails with `InvalidVersionFormat` when the bumped component would overflow.
    pub fn bump(&self, bump_type: VersionBump) -> Result<Self> {
        let bumped = match bump_type {
            VersionBump::Major => self.major.checked_add(1).map(|m| Version::new(m, 0, 0)),
            VersionBump::Minor => self
                .minor
                .checked_add(1)
                .map(|m| Version::new(self.major, m, 0)),
            VersionBump::Patch => self
                .patch
                .checked_add(1)
                .map(|p| Version::new(self.major, self.minor, p)),
        };
        bumped.ok_or_else(|| {
            FlowError::InvalidVersionFormat(format!("{} cannot take a {} bump", self, bump_type))
        })
    }

    /// Bump by kind name. An unknown kind leaves the version unchanged.
    pub fn bump_named(&self, kind: &str) -> Result<Self> {
        match kind.parse::<VersionBump>() {
            Ok(bump) => self.bump(bump),
            Err(_) => Ok(*self),
        }
    }

    /// Tag name for this version with the given prefix (usually `v`)
    pub fn tag_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self)
    }
}

/// Three-way comparison: major, then minor, then patch.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        Version::validate(s)
    }
}

/// Version bump type decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl VersionBump {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
        }
    }
}

impl FromStr for VersionBump {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            other => Err(FlowError::config(format!(
                "unknown bump kind '{}' (expected major, minor or patch)",
                other
            ))),
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
