use crate::domain::version::Version;
use chrono::NaiveDate;

/// Entry used when a release has no commits of its own
pub const PLACEHOLDER_ENTRY: &str = "- Internal changes";

/// One version's block in the changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogSection {
    pub version: Version,
    pub date: NaiveDate,
    pub entries: Vec<String>,
}

impl ChangelogSection {
    /// Build a section; an empty commit list gets the placeholder entry.
    pub fn build(version: Version, date: NaiveDate, commits: Vec<String>) -> Self {
        let entries = if commits.is_empty() {
            vec![PLACEHOLDER_ENTRY.to_string()]
        } else {
            commits
        };

        ChangelogSection {
            version,
            date,
            entries,
        }
    }

    /// `## v<version>`, the part of the heading used for presence checks
    pub fn heading_key(version: &Version) -> String {
        format!("## v{}", version)
    }

    pub fn heading(&self) -> String {
        format!(
            "{} - {}",
            Self::heading_key(&self.version),
            self.date.format("%Y-%m-%d")
        )
    }

    /// Render the section followed by a blank separator line.
    pub fn render(&self) -> String {
        let mut out = self.heading();
        out.push('\n');
        for entry in &self.entries {
            out.push_str(entry);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

/// Whether `content` already has a heading for `version`.
///
/// Matches whole headings so `## v1.1.1` is not found inside `## v1.1.10`.
pub fn has_section(content: &str, version: &Version) -> bool {
    let key = ChangelogSection::heading_key(version);
    content.lines().any(|line| {
        let line = line.trim_end();
        line == key
            || line
                .strip_prefix(key.as_str())
                .is_some_and(|rest| rest.starts_with(' '))
    })
}

/// New file content with `section` placed above `existing`.
pub fn prepend_section(existing: &str, section: &ChangelogSection) -> String {
    let mut out = section.render();
    out.push_str(existing);
    out
}

/// Format a commit subject as a changelog line
pub fn entry_line(subject: &str) -> String {
    format!("- {}", subject.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_build_uses_placeholder_for_empty() {
        let section = ChangelogSection::build(Version::new(1, 0, 0), date(), vec![]);
        assert_eq!(section.entries, vec![PLACEHOLDER_ENTRY.to_string()]);
    }

    #[test]
    fn test_render_format() {
        let section = ChangelogSection::build(
            Version::new(1, 10, 0),
            date(),
            vec!["- add search".to_string(), "- fix login".to_string()],
        );
        assert_eq!(
            section.render(),
            "## v1.10.0 - 2024-03-01\n- add search\n- fix login\n\n"
        );
    }

    #[test]
    fn test_has_section_whole_heading_only() {
        let content = "## v1.1.10 - 2024-01-01\n- a\n";
        assert!(has_section(content, &Version::new(1, 1, 10)));
        assert!(!has_section(content, &Version::new(1, 1, 1)));
    }

    #[test]
    fn test_has_section_bare_heading() {
        assert!(has_section("intro\n## v2.0.0\n", &Version::new(2, 0, 0)));
        assert!(!has_section("", &Version::new(2, 0, 0)));
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let old = ChangelogSection::build(Version::new(1, 0, 0), date(), vec![]).render();
        let new = ChangelogSection::build(Version::new(1, 1, 0), date(), vec!["- x".into()]);
        let merged = prepend_section(&old, &new);
        let first = merged.find("## v1.1.0").unwrap();
        let second = merged.find("## v1.0.0").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_entry_line() {
        assert_eq!(entry_line("feat: search  "), "- feat: search");
    }
}
