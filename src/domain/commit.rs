use chrono::{DateTime, Utc};

use crate::domain::version::Severity;

/// Body prefix that marks a commit as a breaking change
pub const BREAKING_CHANGE_MARKER: &str = "BREAKING CHANGE";

/// Number of hash characters shown in changelogs and prerelease suffixes
pub const SHORT_HASH_LEN: usize = 8;

/// Author of a commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

/// A single parsed commit from the history log
///
/// Records are produced once by the log parser and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    /// Full commit hash
    pub hash: String,
    /// Space separated parent hashes
    pub parent_hashes: String,
    pub author: CommitAuthor,
    /// Author date
    pub date: DateTime<Utc>,
    /// Lowercase commit type, empty if the subject did not declare one
    pub r#type: String,
    /// Uppercase scope (usually a ticket id), empty if absent
    pub scope: String,
    /// Lowercased and truncated subject
    pub subject: String,
    /// Raw body, newline terminated lines
    pub body: String,
    pub severity: Severity,
}

impl Commit {
    /// Leading characters of the hash, see [`short_hash`]
    pub fn short_hash(&self) -> &str {
        short_hash(&self.hash)
    }

    /// Whether the body opens with the breaking change marker
    pub fn is_breaking_change(&self) -> bool {
        self.body.starts_with(BREAKING_CHANGE_MARKER)
    }
}

/// Returns the first 8 characters of a hash, or the whole hash if it is shorter
pub fn short_hash(hash: &str) -> &str {
    match hash.char_indices().nth(SHORT_HASH_LEN) {
        Some((idx, _)) => &hash[..idx],
        None => hash,
    }
}
