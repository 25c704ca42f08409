use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use super::{PullRequest, PullRequestFetcher};
use crate::error::{ChangelogError, Result};

const API_BASE_URL: &str = "https://api.github.com";
const PAGE_SIZE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("semantic-changelog/", env!("CARGO_PKG_VERSION"));

/// Pull request payload returned by the GitHub REST API
#[derive(Debug, Deserialize)]
struct ApiPullRequest {
    number: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    merged_at: Option<String>,
}

impl From<ApiPullRequest> for PullRequest {
    fn from(pr: ApiPullRequest) -> Self {
        PullRequest {
            id: pr.number,
            title: pr.title.unwrap_or_default(),
            merged: pr.merged_at.is_some(),
        }
    }
}

/// Split an `owner/name` slug
pub fn parse_repository_slug(slug: &str) -> Result<(String, String)> {
    match slug.trim().split_once('/') {
        Some((owner, name))
            if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
        {
            Ok((owner.to_string(), name.to_string()))
        }
        _ => Err(ChangelogError::config(format!(
            "repository must be given as 'owner/name', got '{}'",
            slug
        ))),
    }
}

/// Lists closed pull requests of a GitHub repository
#[derive(Debug, Clone)]
pub struct GithubFetcher {
    owner: String,
    name: String,
    token: String,
    base_url: String,
}

impl GithubFetcher {
    /// Create a fetcher for an `owner/name` repository slug
    pub fn new(token: impl Into<String>, repository: &str) -> Result<Self> {
        let (owner, name) = parse_repository_slug(repository)?;
        Ok(GithubFetcher {
            owner,
            name,
            token: token.into(),
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Point the fetcher at another API host, e.g. GitHub Enterprise
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn pulls_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/pulls?state=closed&per_page={}",
            self.base_url, self.owner, self.name, PAGE_SIZE
        )
    }
}

impl PullRequestFetcher for GithubFetcher {
    fn fetch(&self) -> Result<Vec<PullRequest>> {
        let url = self.pulls_url();
        debug!(url = %url, "listing closed pull requests");

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ChangelogError::fetch(e.to_string()))?;

        let resp = client
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .map_err(|e| ChangelogError::fetch(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(ChangelogError::fetch(format!("HTTP {}: {}", status, body)));
        }

        let pulls: Vec<ApiPullRequest> = resp
            .json()
            .map_err(|e| ChangelogError::fetch(format!("deserialization failed: {}", e)))?;
        debug!(count = pulls.len(), "fetched pull requests");

        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }
}
