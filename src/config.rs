use crate::domain::BranchType;
use crate::error::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the repository-local configuration file
pub const CONFIG_FILE_NAME: &str = "gitflowkit.toml";

/// Represents the complete configuration for git-flowkit.
///
/// Contains the integration branch names, per-type prefixes, the remote used
/// for push/pull, the tag prefix and the tracked file names.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default)]
    pub prefix: PrefixConfig,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    #[serde(default)]
    pub files: FilesConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

/// Integration branch names.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BranchesConfig {
    #[serde(default = "default_main_branch")]
    pub main: String,

    #[serde(default = "default_develop_branch")]
    pub develop: String,
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_develop_branch() -> String {
    "develop".to_string()
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            main: default_main_branch(),
            develop: default_develop_branch(),
        }
    }
}

/// Branch name prefixes per workflow type.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PrefixConfig {
    #[serde(default = "default_feature_prefix")]
    pub feature: String,

    #[serde(default = "default_release_prefix")]
    pub release: String,

    #[serde(default = "default_hotfix_prefix")]
    pub hotfix: String,

    #[serde(default = "default_support_prefix")]
    pub support: String,
}

fn default_feature_prefix() -> String {
    "feature/".to_string()
}

fn default_release_prefix() -> String {
    "release/".to_string()
}

fn default_hotfix_prefix() -> String {
    "hotfix/".to_string()
}

fn default_support_prefix() -> String {
    "support/".to_string()
}

impl Default for PrefixConfig {
    fn default() -> Self {
        PrefixConfig {
            feature: default_feature_prefix(),
            release: default_release_prefix(),
            hotfix: default_hotfix_prefix(),
            support: default_support_prefix(),
        }
    }
}

/// Tracked files, relative to the repository root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    #[serde(default = "default_version_file")]
    pub version: String,

    #[serde(default = "default_changelog_file")]
    pub changelog: String,
}

fn default_version_file() -> String {
    "version.txt".to_string()
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            version: default_version_file(),
            changelog: default_changelog_file(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            branches: BranchesConfig::default(),
            prefix: PrefixConfig::default(),
            remote: default_remote(),
            tag_prefix: default_tag_prefix(),
            files: FilesConfig::default(),
        }
    }
}

impl Config {
    /// Branch prefix for a workflow type
    pub fn prefix_for(&self, branch_type: BranchType) -> &str {
        match branch_type {
            BranchType::Feature => &self.prefix.feature,
            BranchType::Release => &self.prefix.release,
            BranchType::Hotfix => &self.prefix.hotfix,
            BranchType::Support => &self.prefix.support,
        }
    }

    /// Every key with its current value, as `(dotted.key, value)` pairs sorted by key.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let value = toml::Value::try_from(self)
            .map_err(|e| FlowError::config(format!("cannot serialize configuration: {}", e)))?;
        let mut out = Vec::new();
        if let toml::Value::Table(table) = value {
            flatten("", &table, &mut out);
        }
        out.sort();
        Ok(out)
    }

    /// Value of a dotted key such as `branches.main`
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries()?
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v))
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut Vec<(String, String)>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::Table(inner) => flatten(&full, inner, out),
            toml::Value::String(s) => out.push((full, s.clone())),
            other => out.push((full, other.to_string())),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitflowkit.toml` in current directory
/// 3. `.gitflowkit.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = match config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => default_config_file(),
    };

    let Some(path) = path else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path)
        .map_err(|e| FlowError::config(format!("cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&config_str)
        .map_err(|e| FlowError::config(format!("invalid {}: {}", path.display(), e)))
}

fn default_config_file() -> Option<PathBuf> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join(format!(".{}", CONFIG_FILE_NAME));
    user.exists().then_some(user)
}

/// Set a dotted key in the file at `path`, creating the file if needed.
///
/// The key must be a known configuration key; the resulting document is
/// validated before it is written.
pub fn set_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let known = Config::default().entries()?;
    if !known.iter().any(|(k, _)| k == key) {
        return Err(FlowError::config(format!("unknown configuration key '{}'", key)));
    }

    let mut document: toml::Table = if path.exists() {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| FlowError::config(format!("invalid {}: {}", path.display(), e)))?
    } else {
        toml::Table::new()
    };

    let mut segments: Vec<&str> = key.split('.').collect();
    let leaf = segments.pop().unwrap_or(key);
    let mut cursor = &mut document;
    for segment in segments {
        let entry = cursor
            .entry(segment.to_string())
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        cursor = match entry {
            toml::Value::Table(table) => table,
            _ => {
                return Err(FlowError::config(format!(
                    "'{}' is not a table in {}",
                    segment,
                    path.display()
                )))
            }
        };
    }
    cursor.insert(leaf.to_string(), toml::Value::String(value.to_string()));

    let _validated: Config = toml::Value::Table(document.clone())
        .try_into()
        .map_err(|e| FlowError::config(format!("rejected value for '{}': {}", key, e)))?;

    let text = toml::to_string_pretty(&document)
        .map_err(|e| FlowError::config(format!("cannot serialize configuration: {}", e)))?;
    fs::write(path, text)?;
    tracing::debug!(key, value, path = %path.display(), "configuration updated");
    Ok(())
}
