use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use semantic_changelog::boundary::BoundaryWarning;
use semantic_changelog::cli::orchestration::{self, ChangelogRange, WorkflowArgs};
use semantic_changelog::config::{self, Config};
use semantic_changelog::fetcher::{GithubFetcher, PullRequestFetcher};
use semantic_changelog::git::{GitRepository, Repository};
use semantic_changelog::{ui, ChangelogError};

#[derive(clap::Parser)]
#[command(
    name = "semantic-changelog",
    version,
    about = "Changelog and version generation based on semantic commit messages",
    long_about = "Changelog and version generation based on semantic commit messages.\n\n\
        All commit messages should follow this convention:\n\n    \
        <type>(scope): <subject>\n\n    <body>\n\n\
        Example subjects:\n    \
        feat(TICKET-123): implementing a feature\n    \
        fix: fixed something"
)]
struct Args {
    #[arg(short, long, global = true, default_value = ".", help = "Working directory")]
    dir: PathBuf,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short,
        long,
        global = true,
        env = "RELEASE_BRANCH",
        help = "Branch to release from (default: the checked out branch)"
    )]
    branch: Option<String>,

    #[arg(
        long,
        global = true,
        env = "RELEASE_GITHUB_TOKEN",
        hide_env_values = true,
        help = "GitHub token used to look up pull requests"
    )]
    token: Option<String>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the next version based on the history since the last release
    #[command(alias = "n")]
    NextVersion {
        #[arg(short, long, help = "Version file, its last change marks the last release")]
        file: Option<String>,
    },

    /// Print the changelog of the upcoming release
    #[command(alias = "c")]
    Changelog {
        #[arg(short, long, requires = "version", help = "Revision range, requires --version")]
        revision: Option<String>,

        #[arg(long, requires = "revision", help = "Release version, requires --revision")]
        version: Option<String>,

        #[arg(short, long, help = "Version file, its last change marks the last release")]
        file: Option<String>,
    },

    /// Write the changelog and the next version to their files
    #[command(alias = "g")]
    Generate,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        ui::display_error(&format!("{:#}", err));
        let code = err
            .downcast_ref::<ChangelogError>()
            .map(ChangelogError::exit_code)
            .unwrap_or(1);
        process::exit(code);
    }
}

/// Console logging on stderr, controlled by RUST_LOG (default: warn)
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref(), &args.dir)?;
    let repo = GitRepository::new(&args.dir).with_parser(config.log_parser());
    let branch = resolve_branch(args.branch, &repo, &config);
    debug!(branch = %branch, "resolved branch");

    let mut warnings = Vec::new();
    let fetcher = build_fetcher(args.token.as_deref(), &config, &mut warnings)?;
    let fetcher = fetcher.as_ref().map(|f| f as &dyn PullRequestFetcher);

    let workflow = WorkflowArgs::new(&args.dir, branch);

    match args.command {
        Command::NextVersion { file } => {
            let workflow = match file {
                Some(file) => workflow.with_version_file(file),
                None => workflow,
            };
            let result = orchestration::next_version(&repo, &config, &workflow)?;
            warnings.extend(result.warnings);
            report(&warnings);

            let plan = result.output;
            ui::display_commit_summary(&plan.commits, &plan.branch);
            ui::display_version_change(&plan.current_version, &plan.next_version, plan.severity);
            print!("{}", plan.next_version);
        }
        Command::Changelog {
            revision,
            version,
            file,
        } => {
            let workflow = match file {
                Some(file) => workflow.with_version_file(file),
                None => workflow,
            };
            let range = ChangelogRange { revision, version };
            let result = orchestration::changelog(&repo, &config, fetcher, &workflow, &range)?;
            warnings.extend(result.warnings);
            report(&warnings);

            print!("{}", result.output);
        }
        Command::Generate => {
            ui::display_status(&format!("Generating release in {}", args.dir.display()));
            let result = orchestration::generate(&repo, &config, fetcher, &workflow)?;
            warnings.extend(result.warnings);
            report(&warnings);

            let release = result.output;
            ui::display_version_change(
                &release.plan.current_version,
                &release.plan.next_version,
                release.plan.severity,
            );
            ui::display_success(&format!(
                "Wrote {} and {}",
                release.changelog_path.display(),
                release.version_path.display()
            ));
        }
    }

    Ok(())
}

/// Explicit branch, else the checked out one, else the release branch
fn resolve_branch(explicit: Option<String>, repo: &GitRepository, config: &Config) -> String {
    if let Some(branch) = explicit {
        return branch;
    }
    match repo.current_branch() {
        Ok(branch) => branch,
        Err(e) => {
            debug!(error = %e, "cannot read current branch, using release branch");
            config.release_branch.clone()
        }
    }
}

fn build_fetcher(
    token: Option<&str>,
    config: &Config,
    warnings: &mut Vec<BoundaryWarning>,
) -> Result<Option<GithubFetcher>> {
    match (token, config.repository.as_deref()) {
        (Some(token), Some(repository)) => {
            let fetcher = GithubFetcher::new(token, repository)
                .with_context(|| format!("Invalid repository '{}'", repository))?;
            Ok(Some(fetcher))
        }
        (Some(_), None) => {
            warnings.push(BoundaryWarning::PullRequestLookupDisabled {
                reason: "no repository configured".to_string(),
            });
            Ok(None)
        }
        (None, _) => Ok(None),
    }
}

fn report(warnings: &[BoundaryWarning]) {
    for warning in warnings {
        ui::display_boundary_warning(warning);
    }
}
