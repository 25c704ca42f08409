//! Per-commit formatting for changelog entries
//!
//! A formatter turns one commit into one changelog line. Variants:
//! - [`DefaultFormatter`]: `* <subject> [<scope>] (<short-hash>) `
//! - [`TicketUrlFormatter`]: links the scope to a ticket URL
//! - [`PullRequestFormatter`]: links the scope and lists merged pull requests for the ticket

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use tracing::debug;

use crate::domain::Commit;
use crate::error::Result;
use crate::fetcher::{PullRequest, PullRequestFetcher};

/// Token in a ticket URL template replaced with the commit scope
pub const SCOPE_TOKEN: &str = "{SCOPE}";

/// Ticket id inside a pull request title, e.g. `TICK-123`
static TICKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w*-[0-9]+)").expect("Invalid regex"));

/// Formats a single commit as a changelog line
pub trait CommitFormatter {
    fn format(&self, commit: &Commit) -> String;
}

impl<F> CommitFormatter for F
where
    F: Fn(&Commit) -> String,
{
    fn format(&self, commit: &Commit) -> String {
        self(commit)
    }
}

/// Plain entry with scope and short hash
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultFormatter;

impl CommitFormatter for DefaultFormatter {
    fn format(&self, commit: &Commit) -> String {
        if commit.scope.is_empty() {
            format!("* {} ({}) \n", commit.subject, commit.short_hash())
        } else {
            format!(
                "* {} [{}] ({}) \n",
                commit.subject,
                commit.scope,
                commit.short_hash()
            )
        }
    }
}

/// Substitute the scope into a ticket URL template
pub fn ticket_url(template: &str, scope: &str) -> String {
    template.replace(SCOPE_TOKEN, scope)
}

/// Links the scope of a commit to a ticket tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketUrlFormatter {
    url_template: String,
}

impl TicketUrlFormatter {
    pub fn new(url_template: impl Into<String>) -> Self {
        TicketUrlFormatter {
            url_template: url_template.into(),
        }
    }
}

impl CommitFormatter for TicketUrlFormatter {
    fn format(&self, commit: &Commit) -> String {
        if commit.scope.is_empty() {
            return DefaultFormatter.format(commit);
        }
        format!(
            "* {} [{}]({}) ({}) \n",
            commit.subject,
            commit.scope,
            ticket_url(&self.url_template, &commit.scope),
            commit.short_hash()
        )
    }
}

/// Links the scope to a ticket and lists the merged pull requests referencing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestFormatter {
    url_template: String,
    references: HashMap<String, Vec<String>>,
}

impl PullRequestFormatter {
    /// Build the ticket -> pull request index from already fetched pull requests.
    ///
    /// Only merged pull requests with a non-empty title are considered; the
    /// first ticket-like token of the title is the key. References keep the
    /// order in which pull requests were listed.
    pub fn new(url_template: impl Into<String>, pull_requests: &[PullRequest]) -> Self {
        let mut references: HashMap<String, Vec<String>> = HashMap::new();

        for pr in pull_requests {
            if !pr.merged || pr.title.is_empty() {
                continue;
            }
            if let Some(ticket) = TICKET_PATTERN.find(&pr.title) {
                references
                    .entry(ticket.as_str().to_string())
                    .or_default()
                    .push(format!("#{}", pr.id));
            }
        }

        debug!(tickets = references.len(), "indexed pull requests by ticket");
        PullRequestFormatter {
            url_template: url_template.into(),
            references,
        }
    }

    /// Fetch pull requests and build the formatter
    pub fn from_fetcher(
        url_template: impl Into<String>,
        fetcher: &dyn PullRequestFetcher,
    ) -> Result<Self> {
        let pull_requests = fetcher.fetch()?;
        Ok(Self::new(url_template, &pull_requests))
    }

    /// Reference markers recorded for a ticket, e.g. `["#2", "#3"]`
    pub fn references(&self, ticket: &str) -> &[String] {
        self.references
            .get(ticket)
            .map(|refs| refs.as_slice())
            .unwrap_or(&[])
    }
}

impl CommitFormatter for PullRequestFormatter {
    fn format(&self, commit: &Commit) -> String {
        if commit.scope.is_empty() {
            return DefaultFormatter.format(commit);
        }

        let url = ticket_url(&self.url_template, &commit.scope);
        let refs = self.references(&commit.scope);
        if refs.is_empty() {
            format!("* {} [{}]({}) \n", commit.subject, commit.scope, url)
        } else {
            format!(
                "* {} [{}]({}) ({}) \n",
                commit.subject,
                commit.scope,
                url,
                refs.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::StaticFetcher;

    const URL: &str = "http://example.com/{SCOPE}/fart";

    fn commit(subject: &str, scope: &str, hash: &str) -> Commit {
        Commit {
            subject: subject.to_string(),
            scope: scope.to_string(),
            hash: hash.to_string(),
            ..Default::default()
        }
    }

    fn pull_requests() -> Vec<PullRequest> {
        vec![
            PullRequest::new(1, "REFPR-1", true),
            PullRequest::new(2, "REFPR-2", true),
            PullRequest::new(3, "feat(REFPR-2): follow up", true),
            PullRequest::new(4, "unrelated hotfix", true),
            PullRequest::new(5, "", true),
            PullRequest::new(6, "REFPR-1 abandoned", false),
        ]
    }

    #[test]
    fn test_default_formatter_without_scope() {
        assert_eq!(
            DefaultFormatter.format(&commit("message", "", "1234")),
            "* message (1234) \n"
        );
    }

    #[test]
    fn test_default_formatter_with_scope() {
        assert_eq!(
            DefaultFormatter.format(&commit("message", "TEST-123", "1234")),
            "* message [TEST-123] (1234) \n"
        );
    }

    #[test]
    fn test_default_formatter_trims_hash() {
        assert_eq!(
            DefaultFormatter.format(&commit("message", "", "1234567890abcdef")),
            "* message (12345678) \n"
        );
    }

    #[test]
    fn test_default_formatter_empty_commit() {
        assert_eq!(DefaultFormatter.format(&Commit::default()), "*  () \n");
    }

    #[test]
    fn test_ticket_url_formatter() {
        let formatter = TicketUrlFormatter::new(URL);
        assert_eq!(
            formatter.format(&commit("mymessage", "TICK-1", "1234567890")),
            "* mymessage [TICK-1](http://example.com/TICK-1/fart) (12345678) \n"
        );
        assert_eq!(
            formatter.format(&commit("mymessage", "", "1234")),
            "* mymessage (1234) \n"
        );
    }

    #[test]
    fn test_ticket_url_replaces_every_token() {
        assert_eq!(ticket_url("{SCOPE}/{SCOPE}", "A-1"), "A-1/A-1");
    }

    #[test]
    fn test_pull_request_formatter_without_scope() {
        let formatter = PullRequestFormatter::new(URL, &pull_requests());
        assert_eq!(formatter.format(&Commit::default()), "*  () \n");
    }

    #[test]
    fn test_pull_request_formatter_unreferenced_ticket() {
        let formatter = PullRequestFormatter::new(URL, &pull_requests());
        assert_eq!(
            formatter.format(&commit("mymessage", "UNREFERENCED-1", "")),
            "* mymessage [UNREFERENCED-1](http://example.com/UNREFERENCED-1/fart) \n"
        );
    }

    #[test]
    fn test_pull_request_formatter_single_reference() {
        let formatter = PullRequestFormatter::new(URL, &pull_requests());
        assert_eq!(
            formatter.format(&commit("mymessage", "REFPR-1", "")),
            "* mymessage [REFPR-1](http://example.com/REFPR-1/fart) (#1) \n"
        );
    }

    #[test]
    fn test_pull_request_formatter_multiple_references_in_order() {
        let formatter = PullRequestFormatter::new(URL, &pull_requests());
        assert_eq!(formatter.references("REFPR-2"), ["#2", "#3"]);
        assert_eq!(
            formatter.format(&commit("mymessage", "REFPR-2", "")),
            "* mymessage [REFPR-2](http://example.com/REFPR-2/fart) (#2, #3) \n"
        );
    }

    #[test]
    fn test_pull_request_formatter_skips_unmerged() {
        let formatter = PullRequestFormatter::new(URL, &pull_requests());
        assert_eq!(formatter.references("REFPR-1"), ["#1"]);
    }

    #[test]
    fn test_pull_request_formatter_from_fetcher() {
        let fetcher = StaticFetcher::new(pull_requests());
        let formatter = PullRequestFormatter::from_fetcher(URL, &fetcher).unwrap();
        assert_eq!(formatter.references("REFPR-2").len(), 2);
    }

    #[test]
    fn test_closure_formatter() {
        let formatter = |c: &Commit| format!("{}\n", c.subject);
        assert_eq!(formatter.format(&commit("x", "", "")), "x\n");
    }
}
