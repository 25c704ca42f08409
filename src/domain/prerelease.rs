//! Prerelease suffixes for non-release branches
//!
//! A branch suffix rule pairs a branch name pattern with a suffix template.
//! Templates carry one of two tokens:
//! - `{RELEASE_NUMBER}` is replaced with a counter that increments per release
//! - `{COMMIT_SHA}` is replaced with the short hash of the latest commit

use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::domain::commit::short_hash;
use crate::error::{ChangelogError, Result};

/// Token replaced with the prerelease counter, starting at 1
pub const RELEASE_NUMBER_TOKEN: &str = "{RELEASE_NUMBER}";

/// Token replaced with the short hash of the latest commit
pub const COMMIT_SHA_TOKEN: &str = "{COMMIT_SHA}";

/// Suffix template of a branch rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuffixTemplate {
    /// Template containing `{RELEASE_NUMBER}`
    ReleaseNumber(String),
    /// Template containing `{COMMIT_SHA}` (and no release number)
    CommitSha(String),
}

impl SuffixTemplate {
    /// Parse a suffix template
    ///
    /// # Returns
    /// * `Ok(SuffixTemplate)` - Template with a recognised token
    /// * `Err` - If neither token is present
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Compute the next prerelease string.
    ///
    /// For a release number template the literal text around the token is
    /// stripped from `current_prerelease`, the remainder is read as the
    /// previous counter (0 if it is not a number) and incremented. A counter
    /// already at `u64::MAX` fails with [`ChangelogError::Version`].
    ///
    /// # Examples
    /// ```ignore
    /// let t = SuffixTemplate::parse("rc{RELEASE_NUMBER}")?;
    /// assert_eq!(t.next_suffix("rc400", "abc")?, "rc401");
    /// assert_eq!(t.next_suffix("", "abc")?, "rc1");
    /// ```
    pub fn next_suffix(&self, current_prerelease: &str, commit_hash: &str) -> Result<String> {
        match self {
            SuffixTemplate::ReleaseNumber(template) => {
                let prefix = template.replacen(RELEASE_NUMBER_TOKEN, "", 1);
                let counter = current_prerelease
                    .replacen(prefix.as_str(), "", 1)
                    .parse::<u64>()
                    .unwrap_or(0);
                let next = counter.checked_add(1).ok_or_else(|| {
                    ChangelogError::version(format!(
                        "release number of prerelease '{}' overflows",
                        current_prerelease
                    ))
                })?;
                Ok(template.replacen(RELEASE_NUMBER_TOKEN, &next.to_string(), 1))
            }
            SuffixTemplate::CommitSha(template) => {
                Ok(template.replacen(COMMIT_SHA_TOKEN, short_hash(commit_hash), 1))
            }
        }
    }
}

impl FromStr for SuffixTemplate {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self> {
        if s.contains(RELEASE_NUMBER_TOKEN) {
            Ok(SuffixTemplate::ReleaseNumber(s.to_string()))
        } else if s.contains(COMMIT_SHA_TOKEN) {
            Ok(SuffixTemplate::CommitSha(s.to_string()))
        } else {
            Err(ChangelogError::config(format!(
                "suffix template '{}' must contain {} or {}",
                s, RELEASE_NUMBER_TOKEN, COMMIT_SHA_TOKEN
            )))
        }
    }
}

impl fmt::Display for SuffixTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuffixTemplate::ReleaseNumber(t) | SuffixTemplate::CommitSha(t) => write!(f, "{}", t),
        }
    }
}

/// Maps branches matching `pattern` to a prerelease suffix template
#[derive(Debug, Clone)]
pub struct BranchSuffixRule {
    pattern: Regex,
    template: SuffixTemplate,
}

impl BranchSuffixRule {
    /// Create a new rule from a regular expression and a suffix template
    ///
    /// The pattern is unanchored, as with any regex search.
    pub fn new(pattern: &str, template: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            ChangelogError::config(format!("invalid branch pattern '{}': {}", pattern, e))
        })?;

        Ok(BranchSuffixRule {
            pattern: regex,
            template: SuffixTemplate::parse(template)?,
        })
    }

    /// Whether this rule applies to the branch
    pub fn matches(&self, branch: &str) -> bool {
        self.pattern.is_match(branch)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn template(&self) -> &SuffixTemplate {
        &self.template
    }
}

impl PartialEq for BranchSuffixRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_str() == other.pattern.as_str() && self.template == other.template
    }
}
