//! Formatting functions for UI output.
//!
//! Everything here writes to stderr so that stdout only carries the machine
//! readable result (a version or a changelog).

use console::style;
use semver::Version;

use crate::boundary::BoundaryWarning;
use crate::domain::{Commit, Severity};

/// Number of commits listed before the summary is cut off
const SUMMARY_LIMIT: usize = 10;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One line per commit, at most ten, plus a line counting the rest.
pub fn commit_summary_lines(commits: &[Commit]) -> Vec<String> {
    let mut lines: Vec<String> = commits
        .iter()
        .take(SUMMARY_LIMIT)
        .enumerate()
        .map(|(i, c)| {
            let r#type = if c.r#type.is_empty() { "-" } else { &c.r#type };
            format!("{}. {} {} {}", i + 1, c.short_hash(), r#type, c.subject)
        })
        .collect();

    if commits.len() > SUMMARY_LIMIT {
        lines.push(format!(
            "... and {} more commits",
            commits.len() - SUMMARY_LIMIT
        ));
    }
    lines
}

/// Display the commits a release is made of.
pub fn display_commit_summary(commits: &[Commit], branch: &str) {
    eprintln!(
        "\n{}",
        style(format!("{} commits on branch '{}'", commits.len(), branch)).bold()
    );
    for line in commit_summary_lines(commits) {
        eprintln!("  {}", line);
    }
}

/// Display the version transition.
pub fn display_version_change(current: &Version, next: &Version, severity: Severity) {
    eprintln!("\n{}", style(format!("Release ({} change):", severity)).bold());
    eprintln!("  From: {}", style(current).red());
    eprintln!("  To:   {}", style(next).green());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, r#type: &str, subject: &str) -> Commit {
        Commit {
            hash: hash.to_string(),
            r#type: r#type.to_string(),
            subject: subject.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_commit_summary_lines() {
        let commits = vec![
            commit("1591e972ca68d72430ab", "feat", "add thing"),
            commit("abc", "", "misc"),
        ];
        assert_eq!(
            commit_summary_lines(&commits),
            ["1. 1591e972 feat add thing", "2. abc - misc"]
        );
    }

    #[test]
    fn test_commit_summary_truncates() {
        let commits: Vec<Commit> = (0..13).map(|i| commit(&i.to_string(), "fix", "x")).collect();
        let lines = commit_summary_lines(&commits);
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[10], "... and 3 more commits");
    }

    #[test]
    fn test_display_functions() {
        // Visual verification test - output is printed to stderr
        display_error("test error");
        display_success("test success");
        display_status("test status");
        display_boundary_warning(&BoundaryWarning::PullRequestLookupDisabled {
            reason: "no token".to_string(),
        });
        display_version_change(&Version::new(1, 2, 3), &Version::new(1, 3, 0), Severity::Minor);
    }
}
