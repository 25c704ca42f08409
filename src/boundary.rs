use std::fmt;
use std::path::PathBuf;

/// Warnings raised while planning or writing a release.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Non-release branch without a suffix rule; the version is left unchanged
    NoSuffixRuleMatched { branch: String, version: String },
    /// Changelog file did not exist and will be created
    ChangelogFileMissing { path: PathBuf },
    /// Pull request annotations are skipped
    PullRequestLookupDisabled { reason: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoSuffixRuleMatched { branch, version } => {
                write!(
                    f,
                    "No suffix rule matches branch '{}', keeping version {}",
                    branch, version
                )
            }
            BoundaryWarning::ChangelogFileMissing { path } => {
                write!(
                    f,
                    "Changelog file '{}' does not exist, creating it",
                    path.display()
                )
            }
            BoundaryWarning::PullRequestLookupDisabled { reason } => {
                write!(f, "Pull request lookup disabled: {}", reason)
            }
        }
    }
}
