//! Release workflow orchestration
//!
//! The command line only parses arguments and prints results; everything
//! between reading the version file and writing the changelog lives here so
//! it can run against any [Repository] and [PullRequestFetcher].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use semver::Version;
use tracing::{debug, info, instrument};

use crate::boundary::BoundaryWarning;
use crate::changelog::formatter::{CommitFormatter, DefaultFormatter};
use crate::changelog::{Changelog, PullRequestFormatter, TicketUrlFormatter};
use crate::config::Config;
use crate::domain::version::{parse_version, read_version_file};
use crate::domain::{BranchContext, Commit, Severity};
use crate::error::{ChangelogError, Result};
use crate::fetcher::PullRequestFetcher;
use crate::git::Repository;

/// Arguments shared by all workflows
///
/// Mirrors the CLI arguments in a form that can be built without clap.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowArgs {
    /// Working copy the release is made for
    pub dir: PathBuf,

    /// Branch the next version is calculated for
    pub branch: String,

    /// Version file relative to `dir`; the configured file when absent
    pub version_file: Option<String>,
}

impl WorkflowArgs {
    pub fn new(dir: impl Into<PathBuf>, branch: impl Into<String>) -> Self {
        WorkflowArgs {
            dir: dir.into(),
            branch: branch.into(),
            version_file: None,
        }
    }

    pub fn with_version_file(mut self, version_file: impl Into<String>) -> Self {
        self.version_file = Some(version_file.into());
        self
    }

    fn version_file<'a>(&'a self, config: &'a Config) -> &'a str {
        self.version_file
            .as_deref()
            .unwrap_or(config.version_file.as_str())
    }
}

/// Output of a workflow together with the non-fatal warnings it raised
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult<T> {
    pub output: T,
    pub warnings: Vec<BoundaryWarning>,
}

impl<T> WorkflowResult<T> {
    fn new(output: T, warnings: Vec<BoundaryWarning>) -> Self {
        WorkflowResult { output, warnings }
    }
}

/// Everything known about the upcoming release
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasePlan {
    /// Version stored in the version file
    pub current_version: Version,
    pub next_version: Version,
    /// Latest commit that changed the version file
    pub release_commit: Commit,
    /// Commits since the release commit, newest first; never empty
    pub commits: Vec<Commit>,
    pub severity: Severity,
    pub branch: String,
}

/// Explicit history range for the changelog workflow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangelogRange {
    /// Any git revision expression
    pub revision: Option<String>,
    /// Version written to the header
    pub version: Option<String>,
}

/// Files written by the generate workflow
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedRelease {
    pub plan: ReleasePlan,
    pub changelog: String,
    pub version_path: PathBuf,
    pub changelog_path: PathBuf,
}

/// Work out the next release from the version file and the history since
/// the commit that last changed it.
#[instrument(skip(repo, config), fields(dir = %args.dir.display(), branch = %args.branch))]
pub fn plan_release(
    repo: &dyn Repository,
    config: &Config,
    args: &WorkflowArgs,
) -> Result<WorkflowResult<ReleasePlan>> {
    let version_file = args.version_file(config);
    let current_version = read_version_file(&args.dir.join(version_file))?;
    info!(version = %current_version, file = version_file, "found version");

    let release_commit = repo.latest_change_of_file(version_file)?;
    info!(
        hash = %release_commit.hash,
        date = %release_commit.date.format("%Y-%m-%d"),
        "latest release commit"
    );

    let commits = repo.history_until(&release_commit.hash)?;
    if commits.is_empty() {
        return Err(ChangelogError::EmptyHistory);
    }
    info!(count = commits.len(), "commits since last release");

    let severity = config.severity_classifier().max_severity(&commits);
    let calculator = config.version_calculator()?;

    let mut warnings = Vec::new();
    let branch = BranchContext::new(args.branch.as_str(), calculator.release_branch());
    if !branch.is_release_branch() && calculator.matching_rule(&branch.name).is_none() {
        warnings.push(BoundaryWarning::NoSuffixRuleMatched {
            branch: branch.name.clone(),
            version: current_version.to_string(),
        });
    }

    let next_version =
        calculator.next_version(&commits[0], &branch.name, &current_version, severity)?;
    info!(next = %next_version, "next version");

    let plan = ReleasePlan {
        current_version,
        next_version,
        release_commit,
        commits,
        severity,
        branch: branch.name,
    };
    Ok(WorkflowResult::new(plan, warnings))
}

/// Pick the per-commit formatter.
///
/// The pull request formatter needs both a fetcher and a ticket URL; with
/// only a URL the ticket formatter is used, otherwise the default one.
pub fn build_formatter(
    config: &Config,
    fetcher: Option<&dyn PullRequestFetcher>,
) -> Result<(Box<dyn CommitFormatter>, Vec<BoundaryWarning>)> {
    let mut warnings = Vec::new();

    let formatter: Box<dyn CommitFormatter> = match (fetcher, config.ticket_url.as_deref()) {
        (Some(fetcher), Some(url)) => {
            debug!("using pull request formatter");
            Box::new(PullRequestFormatter::from_fetcher(url, fetcher)?)
        }
        (Some(_), None) => {
            warnings.push(BoundaryWarning::PullRequestLookupDisabled {
                reason: "no ticket_url configured".to_string(),
            });
            Box::new(DefaultFormatter)
        }
        (None, Some(url)) => {
            debug!("using ticket url formatter");
            Box::new(TicketUrlFormatter::new(url))
        }
        (None, None) => Box::new(DefaultFormatter),
    };

    Ok((formatter, warnings))
}

fn render(
    config: &Config,
    fetcher: Option<&dyn PullRequestFetcher>,
    commits: &[Commit],
    version: &Version,
) -> Result<(String, Vec<BoundaryWarning>)> {
    let (formatter, warnings) = build_formatter(config, fetcher)?;
    let changelog = Changelog::with_boxed_formatter(config.type_labels(), formatter);
    Ok((changelog.render(commits, Some(version)), warnings))
}

/// The version the next release should carry
pub fn next_version(
    repo: &dyn Repository,
    config: &Config,
    args: &WorkflowArgs,
) -> Result<WorkflowResult<ReleasePlan>> {
    plan_release(repo, config, args)
}

/// Render a changelog.
///
/// With an explicit range both revision and version are required and the
/// range's commits are rendered under that version. Otherwise the release is
/// planned from the version file and rendered under the next version.
#[instrument(skip(repo, config, fetcher, range), fields(branch = %args.branch))]
pub fn changelog(
    repo: &dyn Repository,
    config: &Config,
    fetcher: Option<&dyn PullRequestFetcher>,
    args: &WorkflowArgs,
    range: &ChangelogRange,
) -> Result<WorkflowResult<String>> {
    match (range.revision.as_deref(), range.version.as_deref()) {
        (Some(revision), Some(version)) => {
            let version = parse_version(version)?;
            let commits = repo.history(revision)?;
            if commits.is_empty() {
                return Err(ChangelogError::EmptyHistory);
            }
            info!(revision, count = commits.len(), "rendering explicit range");
            let (text, warnings) = render(config, fetcher, &commits, &version)?;
            Ok(WorkflowResult::new(text, warnings))
        }
        (Some(_), None) => Err(ChangelogError::input(
            "--revision works only together with --version",
        )),
        (None, Some(_)) => Err(ChangelogError::input(
            "--version works only together with --revision",
        )),
        (None, None) => {
            let WorkflowResult {
                output: plan,
                mut warnings,
            } = plan_release(repo, config, args)?;
            let (text, render_warnings) =
                render(config, fetcher, &plan.commits, &plan.next_version)?;
            warnings.extend(render_warnings);
            Ok(WorkflowResult::new(text, warnings))
        }
    }
}

/// Plan the release, prepend its changelog to the changelog file and write
/// the next version to the version file.
#[instrument(skip(repo, config, fetcher), fields(dir = %args.dir.display(), branch = %args.branch))]
pub fn generate(
    repo: &dyn Repository,
    config: &Config,
    fetcher: Option<&dyn PullRequestFetcher>,
    args: &WorkflowArgs,
) -> Result<WorkflowResult<GeneratedRelease>> {
    if config.behavior.fetch_before_generate {
        info!("fetching remotes");
        repo.fetch_all()?;
    }

    let WorkflowResult {
        output: plan,
        mut warnings,
    } = plan_release(repo, config, args)?;
    let (changelog, render_warnings) =
        render(config, fetcher, &plan.commits, &plan.next_version)?;
    warnings.extend(render_warnings);

    let changelog_path = args.dir.join(&config.changelog_file);
    let previous = read_existing(&changelog_path, &mut warnings)?;
    fs::write(&changelog_path, format!("{}\n\n\n{}", changelog, previous))?;

    let version_path = args.dir.join(args.version_file(config));
    fs::write(&version_path, format!("{}\n", plan.next_version))?;
    info!(
        version = %plan.next_version,
        changelog = %changelog_path.display(),
        "release written"
    );

    Ok(WorkflowResult::new(
        GeneratedRelease {
            plan,
            changelog,
            version_path,
            changelog_path,
        },
        warnings,
    ))
}

fn read_existing(path: &Path, warnings: &mut Vec<BoundaryWarning>) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warnings.push(BoundaryWarning::ChangelogFileMissing {
                path: path.to_path_buf(),
            });
            Ok(String::new())
        }
        Err(e) => Err(e.into()),
    }
}
