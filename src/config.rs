use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::analyzer::severity::key_label_map;
use crate::analyzer::{SeverityClassifier, TypeConstraint, VersionCalculator};
use crate::changelog::{default_type_labels, TypeLabelMap};
use crate::domain::branch::DEFAULT_RELEASE_BRANCH;
use crate::domain::BranchSuffixRule;
use crate::error::{ChangelogError, Result};
use crate::fetcher::github::parse_repository_slug;
use crate::parser::{LogParser, DEFAULT_FEATURE_TYPE};

/// Name of the configuration file looked up in the working copy and user config dir
pub const CONFIG_FILE_NAME: &str = "semantic-changelog.toml";

/// Represents the complete configuration for semantic-changelog.
///
/// Contains file locations, the release branch, changelog labels, branch
/// suffix rules, optional type constraints and behavior options.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_version_file")]
    pub version_file: String,

    #[serde(default = "default_changelog_file")]
    pub changelog_file: String,

    #[serde(default = "default_release_branch")]
    pub release_branch: String,

    #[serde(default = "default_feature_type")]
    pub feature_type: String,

    #[serde(default = "default_type_labels")]
    pub types: TypeLabelMap,

    /// Ordered; the first matching rule wins
    #[serde(default)]
    pub branch_suffix: Vec<BranchSuffixConfig>,

    #[serde(default)]
    pub type_constraints: Vec<TypeConstraint>,

    #[serde(default)]
    pub ticket_url: Option<String>,

    /// `owner/name` slug used for the pull request lookup
    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

fn default_version_file() -> String {
    "VERSION".to_string()
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

fn default_release_branch() -> String {
    DEFAULT_RELEASE_BRANCH.to_string()
}

fn default_feature_type() -> String {
    DEFAULT_FEATURE_TYPE.to_string()
}

/// A `[[branch_suffix]]` entry
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BranchSuffixConfig {
    /// Regular expression matched against the branch name
    pub pattern: String,
    /// Suffix template with `{RELEASE_NUMBER}` or `{COMMIT_SHA}`
    pub suffix: String,
}

/// Configuration for behavior customization.
///
/// Controls runtime behavior without affecting version analysis.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct BehaviorConfig {
    #[serde(default)]
    pub fetch_before_generate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version_file: default_version_file(),
            changelog_file: default_changelog_file(),
            release_branch: default_release_branch(),
            feature_type: default_feature_type(),
            types: default_type_labels(),
            branch_suffix: Vec::new(),
            type_constraints: Vec::new(),
            ticket_url: None,
            repository: None,
            behavior: BehaviorConfig::default(),
        }
    }
}

impl Config {
    /// Check everything that would otherwise fail halfway through a release
    pub fn validate(&self) -> Result<()> {
        if self.version_file.trim().is_empty() {
            return Err(ChangelogError::config("version_file must not be empty"));
        }
        if self.release_branch.trim().is_empty() {
            return Err(ChangelogError::config("release_branch must not be empty"));
        }
        self.suffix_rules()?;
        for constraint in &self.type_constraints {
            constraint.validate()?;
        }
        if let Some(repository) = &self.repository {
            parse_repository_slug(repository)?;
        }
        Ok(())
    }

    /// Compiled branch suffix rules, in declaration order
    pub fn suffix_rules(&self) -> Result<Vec<BranchSuffixRule>> {
        self.branch_suffix
            .iter()
            .map(|rule| BranchSuffixRule::new(&rule.pattern, &rule.suffix))
            .collect()
    }

    pub fn version_calculator(&self) -> Result<VersionCalculator> {
        Ok(VersionCalculator::new(
            self.release_branch.clone(),
            self.suffix_rules()?,
        ))
    }

    /// Builtin severities unless type constraints are declared
    pub fn severity_classifier(&self) -> SeverityClassifier {
        if self.type_constraints.is_empty() {
            SeverityClassifier::Builtin
        } else {
            SeverityClassifier::from_constraints(&self.type_constraints)
        }
    }

    /// Section labels with type constraint labels merged over `types`
    pub fn type_labels(&self) -> TypeLabelMap {
        let mut labels = self.types.clone();
        for (key, label) in key_label_map(&self.type_constraints) {
            if !label.is_empty() {
                labels.insert(key, label);
            }
        }
        labels
    }

    pub fn log_parser(&self) -> LogParser {
        LogParser::new().with_feature_type(self.feature_type.clone())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `semantic-changelog.toml` in the working copy `dir`
/// 3. `semantic-changelog.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `dir` - Working copy the release is made for
///
/// # Returns
/// * `Ok(Config)` - Loaded and validated, or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>, dir: &Path) -> Result<Config> {
    let local = dir.join(CONFIG_FILE_NAME);

    let config_str = if let Some(path) = config_path {
        debug!(path, "loading configuration");
        fs::read_to_string(path)?
    } else if local.exists() {
        debug!(path = %local.display(), "loading configuration");
        fs::read_to_string(&local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            debug!(path = %config_path.display(), "loading configuration");
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config =
        toml::from_str(&config_str).map_err(|e| ChangelogError::config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
