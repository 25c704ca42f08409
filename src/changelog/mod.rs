//! Markdown changelog rendering
//!
//! Commits are grouped by type; groups are emitted in ascending key order
//! (the empty type sorts first) and entries keep their input order inside a
//! group. The version header is only written when a version is given.

pub mod formatter;

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};
use semver::Version;
use tracing::debug;

use crate::domain::Commit;
use formatter::{CommitFormatter, DefaultFormatter};

pub use formatter::{PullRequestFormatter, TicketUrlFormatter};

/// Commit type token -> section label
pub type TypeLabelMap = HashMap<String, String>;

/// Built-in section labels
pub const DEFAULT_TYPE_LABELS: [(&str, &str); 9] = [
    ("feat", "Feature"),
    ("breaking", "Breaking Changes"),
    ("fix", "Bug Fixes"),
    ("perf", "Performance Improvements"),
    ("revert", "Reverted"),
    ("docs", "Documentation"),
    ("refactor", "Code Refactoring"),
    ("test", "Tests"),
    ("chore", "Chores"),
];

pub fn default_type_labels() -> TypeLabelMap {
    DEFAULT_TYPE_LABELS
        .iter()
        .map(|(key, label)| (key.to_string(), label.to_string()))
        .collect()
}

/// Renders commit sequences as Markdown
pub struct Changelog {
    labels: TypeLabelMap,
    formatter: Box<dyn CommitFormatter>,
}

impl Changelog {
    pub fn new<F: CommitFormatter + 'static>(labels: TypeLabelMap, formatter: F) -> Self {
        Changelog {
            labels,
            formatter: Box::new(formatter),
        }
    }

    /// Renderer with a boxed formatter chosen at runtime
    pub fn with_boxed_formatter(labels: TypeLabelMap, formatter: Box<dyn CommitFormatter>) -> Self {
        Changelog { labels, formatter }
    }

    /// Section label for a type, the raw type when unmapped
    pub fn label<'a>(&'a self, r#type: &'a str) -> &'a str {
        self.labels.get(r#type).map(String::as_str).unwrap_or(r#type)
    }

    /// Render with today's UTC date in the header
    pub fn render(&self, commits: &[Commit], version: Option<&Version>) -> String {
        self.render_dated(commits, version, Utc::now().date_naive())
    }

    /// Render with an explicit header date
    pub fn render_dated(
        &self,
        commits: &[Commit],
        version: Option<&Version>,
        date: NaiveDate,
    ) -> String {
        let mut groups: BTreeMap<&str, String> = BTreeMap::new();
        for commit in commits {
            groups
                .entry(commit.r#type.as_str())
                .or_default()
                .push_str(&self.formatter.format(commit));
        }
        debug!(
            commit_count = commits.len(),
            group_count = groups.len(),
            "rendering changelog"
        );

        let mut out = String::new();
        if let Some(version) = version {
            out.push_str(&format!("## {} ({})\n\n", version, date.format("%Y-%m-%d")));
        }
        for (r#type, entries) in &groups {
            out.push_str(&format!("#### {}\n\n{}\n", self.label(r#type), entries));
        }
        out
    }
}

impl Default for Changelog {
    fn default() -> Self {
        Changelog::new(default_type_labels(), DefaultFormatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::version::parse_version;

    fn commit(subject: &str, r#type: &str) -> Commit {
        Commit {
            subject: subject.to_string(),
            r#type: r#type.to_string(),
            ..Default::default()
        }
    }

    fn subject_only(c: &Commit) -> String {
        format!("{}\n", c.subject)
    }

    fn labels(pairs: &[(&str, &str)]) -> TypeLabelMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 11, 12).unwrap()
    }

    #[test]
    fn test_render_groups_sorted_with_header() {
        let commits = vec![
            commit("test1", "foo"),
            commit("test2", ""),
            commit("test3", ""),
            commit("test4", "foo"),
        ];
        let changelog = Changelog::new(labels(&[("foo", "Foo")]), subject_only);
        let version = parse_version("2.1.3-rc123").unwrap();

        assert_eq!(
            changelog.render_dated(&commits, Some(&version), date()),
            "## 2.1.3-rc123 (2017-11-12)\n\n#### \n\ntest2\ntest3\n\n#### Foo\n\ntest1\ntest4\n\n"
        );
    }

    #[test]
    fn test_render_without_version_has_no_header() {
        let commits = vec![commit("t1", "foo"), commit("t2", "")];
        let changelog = Changelog::new(labels(&[("foo", "Foo")]), subject_only);

        let out = changelog.render_dated(&commits, None, date());
        assert_eq!(out, "#### \n\nt2\n\n#### Foo\n\nt1\n\n");
    }

    #[test]
    fn test_unmapped_type_uses_raw_key() {
        let changelog = Changelog::new(TypeLabelMap::new(), subject_only);
        let out = changelog.render_dated(&[commit("x", "ci")], None, date());
        assert_eq!(out, "#### ci\n\nx\n\n");
    }

    #[test]
    fn test_render_empty_sequence() {
        let changelog = Changelog::default();
        assert_eq!(changelog.render_dated(&[], None, date()), "");
        let version = Version::new(1, 0, 0);
        assert_eq!(
            changelog.render_dated(&[], Some(&version), date()),
            "## 1.0.0 (2017-11-12)\n\n"
        );
    }

    #[test]
    fn test_default_changelog_uses_builtin_labels() {
        let commits = vec![Commit {
            r#type: "fix".to_string(),
            scope: "TICK-1".to_string(),
            subject: "crash on start".to_string(),
            hash: "1591e972ca68d72430ab159100f87683c2080508".to_string(),
            ..Default::default()
        }];
        let out = Changelog::default().render_dated(&commits, None, date());
        assert_eq!(
            out,
            "#### Bug Fixes\n\n* crash on start [TICK-1] (1591e972) \n\n"
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let commits = vec![commit("a", "fix"), commit("b", "feat"), commit("c", "fix")];
        let changelog = Changelog::default();
        let version = Version::new(3, 1, 0);
        assert_eq!(
            changelog.render_dated(&commits, Some(&version), date()),
            changelog.render_dated(&commits, Some(&version), date())
        );
    }

    #[test]
    fn test_header_version_round_trips() {
        let version = parse_version("1.2.3-rc.1+build.5").unwrap();
        let out = Changelog::default().render(&[commit("a", "fix")], Some(&version));

        let header = out.lines().next().unwrap();
        let text = header
            .trim_start_matches("## ")
            .split(' ')
            .next()
            .unwrap();
        assert_eq!(parse_version(text).unwrap(), version);
    }

    #[test]
    fn test_default_type_labels() {
        let labels = default_type_labels();
        assert_eq!(labels.len(), 9);
        assert_eq!(labels["feat"], "Feature");
        assert_eq!(labels["chore"], "Chores");
    }
}
