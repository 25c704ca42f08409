use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Commit, Severity};
use crate::error::{ChangelogError, Result};

/// Maximum severity across commits, `Patch` for an empty slice
pub fn max_severity(commits: &[Commit]) -> Severity {
    commits
        .iter()
        .map(|c| c.severity)
        .max()
        .unwrap_or(Severity::Patch)
}

/// User declared commit type with its changelog label and severity
///
/// At most one of `major`, `minor`, `patch` may be set; none means patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConstraint {
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub major: bool,
    #[serde(default)]
    pub minor: bool,
    #[serde(default)]
    pub patch: bool,
}

impl TypeConstraint {
    /// Severity declared by this constraint
    pub fn severity(&self) -> Severity {
        if self.major {
            Severity::Major
        } else if self.minor {
            Severity::Minor
        } else {
            Severity::Patch
        }
    }

    /// Reject constraints declaring more than one severity
    pub fn validate(&self) -> Result<()> {
        let declared = [self.major, self.minor, self.patch]
            .iter()
            .filter(|flag| **flag)
            .count();
        if declared > 1 {
            return Err(ChangelogError::config(format!(
                "type constraint '{}' declares more than one of major/minor/patch",
                self.key
            )));
        }
        Ok(())
    }
}

/// Builds a key -> label map from type constraints
pub fn key_label_map(constraints: &[TypeConstraint]) -> HashMap<String, String> {
    constraints
        .iter()
        .map(|c| (c.key.clone(), c.label.clone()))
        .collect()
}

/// Builds a key -> severity map from type constraints
pub fn key_severity_map(constraints: &[TypeConstraint]) -> HashMap<String, Severity> {
    constraints
        .iter()
        .map(|c| (c.key.clone(), c.severity()))
        .collect()
}

/// Reduces commits to the severity of the release they make up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SeverityClassifier {
    /// Use the severity assigned while parsing
    #[default]
    Builtin,
    /// Look the commit type up in user declared constraints; unknown types are patch
    Constraints(HashMap<String, Severity>),
}

impl SeverityClassifier {
    /// Classifier in constraint mode
    pub fn from_constraints(constraints: &[TypeConstraint]) -> Self {
        SeverityClassifier::Constraints(key_severity_map(constraints))
    }

    /// Severity of a single commit.
    ///
    /// A body starting with `BREAKING CHANGE` is major in either mode.
    pub fn severity_of(&self, commit: &Commit) -> Severity {
        match self {
            SeverityClassifier::Builtin => commit.severity,
            SeverityClassifier::Constraints(map) => {
                if commit.is_breaking_change() {
                    Severity::Major
                } else {
                    map.get(&commit.r#type).copied().unwrap_or_default()
                }
            }
        }
    }

    /// Maximum severity across commits, `Patch` for an empty slice
    pub fn max_severity(&self, commits: &[Commit]) -> Severity {
        let max = commits
            .iter()
            .map(|c| self.severity_of(c))
            .max()
            .unwrap_or(Severity::Patch);
        debug!(commit_count = commits.len(), severity = %max, "computed max severity");
        max
    }
}
