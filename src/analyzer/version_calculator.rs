use semver::Version;
use tracing::{debug, info, warn};

use crate::domain::branch::DEFAULT_RELEASE_BRANCH;
use crate::domain::version::{bump, with_prerelease};
use crate::domain::{BranchContext, BranchSuffixRule, Commit, Severity};
use crate::error::Result;

/// Computes the next version for a branch
///
/// On the release branch a version without prerelease is incremented by
/// severity, and a prerelease is promoted by dropping its tag. On any other
/// branch the first matching suffix rule rewrites the prerelease; the core
/// version never changes there.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionCalculator {
    release_branch: String,
    rules: Vec<BranchSuffixRule>,
}

impl VersionCalculator {
    /// Create a calculator from the release branch name and ordered suffix rules
    pub fn new(release_branch: impl Into<String>, rules: Vec<BranchSuffixRule>) -> Self {
        VersionCalculator {
            release_branch: release_branch.into(),
            rules,
        }
    }

    pub fn release_branch(&self) -> &str {
        &self.release_branch
    }

    /// First rule whose pattern matches the branch
    pub fn matching_rule(&self, branch: &str) -> Option<&BranchSuffixRule> {
        self.rules.iter().find(|rule| rule.matches(branch))
    }

    /// Calculate the next version.
    ///
    /// # Arguments
    /// * `latest_commit` - Newest commit of the release, source of `{COMMIT_SHA}`
    /// * `branch` - Branch the release is calculated for
    /// * `current` - Version of the previous release
    /// * `severity` - Maximum severity of the commits since that release
    ///
    /// # Returns
    /// * `Ok(Version)` - The next version; unchanged when a non-release branch matches no rule
    /// * `Err` - If a component or counter overflows, or the computed prerelease is not valid semver
    pub fn next_version(
        &self,
        latest_commit: &Commit,
        branch: &str,
        current: &Version,
        severity: Severity,
    ) -> Result<Version> {
        let branch = BranchContext::new(branch, &self.release_branch);
        debug!(branch = %branch.name, current = %current, severity = %severity, "calculating next version");

        if branch.is_release_branch() {
            if current.pre.is_empty() {
                info!(severity = %severity, "release branch without prerelease, incrementing");
                return bump(current, severity);
            }
            info!(prerelease = %current.pre, "release branch with prerelease, promoting");
            return with_prerelease(current, "");
        }

        match self.matching_rule(&branch.name) {
            Some(rule) => {
                let suffix = rule
                    .template()
                    .next_suffix(current.pre.as_str(), &latest_commit.hash)?;
                info!(
                    pattern = rule.pattern(),
                    template = %rule.template(),
                    suffix = %suffix,
                    "applying branch suffix"
                );
                with_prerelease(current, &suffix)
            }
            None => {
                warn!(branch = %branch.name, "no suffix rule matches branch, keeping version");
                Ok(current.clone())
            }
        }
    }
}

impl Default for VersionCalculator {
    fn default() -> Self {
        VersionCalculator::new(DEFAULT_RELEASE_BRANCH, Vec::new())
    }
}
