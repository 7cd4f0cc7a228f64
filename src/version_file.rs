//! Reading and writing the tracked version file.
//!
//! The first non-empty line holds the canonical version; any following lines
//! are left untouched on write.

use crate::domain::Version;
use crate::error::{FlowError, Result};
use std::fs;
use std::path::Path;

/// Load the current version from `path`.
///
/// # Returns
/// * `Ok(Version)` - Parsed version from the first non-empty line
/// * `Err(MissingVersionFile)` - If the file does not exist
/// * `Err(InvalidVersionFormat)` - If that line is not a canonical version
pub fn read_version_file(path: &Path) -> Result<Version> {
    if !path.exists() {
        return Err(FlowError::MissingVersionFile(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    let first = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    Version::validate(first)
}

/// File content with the version line replaced by `version`.
///
/// Line terminators are kept as found, including a missing final newline.
/// Content without a version line becomes `version` plus `\n`.
pub fn replace_version_line(content: &str, version: &Version) -> String {
    if content.trim().is_empty() {
        return format!("{}\n", version);
    }
    let mut out = String::with_capacity(content.len());
    let mut replaced = false;
    for line in content.split_inclusive('\n') {
        if replaced || line.trim().is_empty() {
            out.push_str(line);
            continue;
        }
        let ending = if line.ends_with("\r\n") {
            "\r\n"
        } else if line.ends_with('\n') {
            "\n"
        } else {
            ""
        };
        out.push_str(&version.to_string());
        out.push_str(ending);
        replaced = true;
    }
    out
}

/// Write `version` into `path`, creating the file if needed.
///
/// Returns whether the file content changed.
pub fn write_version_file(path: &Path, version: &Version) -> Result<bool> {
    let existing = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };
    let updated = replace_version_line(&existing, version);
    if updated == existing {
        return Ok(false);
    }
    fs::write(path, updated)?;
    tracing::debug!(path = %path.display(), %version, "version file written");
    Ok(true)
}
