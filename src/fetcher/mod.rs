//! Pull request lookup used to annotate changelog entries

pub mod github;

pub use github::GithubFetcher;

use crate::error::Result;

/// A pull request as seen by the changelog formatter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequest {
    /// Number shown in reference markers (`#<id>`)
    pub id: u64,
    pub title: String,
    pub merged: bool,
}

impl PullRequest {
    pub fn new(id: u64, title: impl Into<String>, merged: bool) -> Self {
        PullRequest {
            id,
            title: title.into(),
            merged,
        }
    }
}

/// Source of pull requests for a repository
///
/// Implementations perform at most one lookup per call and never retry.
pub trait PullRequestFetcher {
    fn fetch(&self) -> Result<Vec<PullRequest>>;
}

/// Fetcher returning a fixed list, used when pull requests are already known
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pull_requests: Vec<PullRequest>,
}

impl StaticFetcher {
    pub fn new(pull_requests: Vec<PullRequest>) -> Self {
        StaticFetcher { pull_requests }
    }
}

impl PullRequestFetcher for StaticFetcher {
    fn fetch(&self) -> Result<Vec<PullRequest>> {
        Ok(self.pull_requests.clone())
    }
}
