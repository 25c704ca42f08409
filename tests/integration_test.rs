// tests/integration_test.rs
use git2::{Repository as Git2Repo, RepositoryInitOptions, Signature, Time};
use semantic_changelog::cli::orchestration::{generate, WorkflowArgs};
use semantic_changelog::config::Config;
use semantic_changelog::domain::Severity;
use semantic_changelog::git::{GitRepository, Repository};
use semantic_changelog::ChangelogError;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_semantic-changelog");

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

macro_rules! require_git {
    () => {
        if !git_available() {
            eprintln!("git executable not found, skipping");
            return;
        }
    };
}

/// Repository on `master` with a single commit adding `VERSION`
fn create_repository(version: &str) -> (TempDir, Git2Repo) {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("master");
    let repo = Git2Repo::init_opts(dir.path(), &opts).unwrap();

    commit_file(&repo, "VERSION", version, "initial commit", 1_510_488_000);
    (dir, repo)
}

fn commit_file(repo: &Git2Repo, name: &str, content: &str, message: &str, time: i64) -> git2::Oid {
    let workdir = repo.workdir().unwrap();
    fs::write(workdir.join(name), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let sig = Signature::new("Test Author", "test@example.com", &Time::new(time, 0)).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

fn add_commits(repo: &Git2Repo, messages: &[&str]) {
    for (i, message) in messages.iter().enumerate() {
        commit_file(
            repo,
            &format!("file-{}", i),
            message,
            message,
            1_510_488_100 + i as i64,
        );
    }
}

fn run_bin(dir: &Path, args: &[&str]) -> std::process::Output {
    let config_home = tempfile::tempdir().unwrap();
    Command::new(BIN)
        .arg("--dir")
        .arg(dir)
        .args(args)
        .env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RELEASE_BRANCH")
        .env_remove("RELEASE_GITHUB_TOKEN")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute binary")
}

// ============================================================================
// Git collaborator
// ============================================================================

#[test]
fn test_latest_change_of_file() {
    require_git!();
    let (dir, _repo) = create_repository("1.0.0");
    let git = GitRepository::new(dir.path());

    let commit = git.latest_change_of_file("VERSION").unwrap();
    assert_eq!(commit.subject, "initial commit");
    assert_eq!(commit.author.name, "Test Author");
    assert_eq!(commit.date.timestamp(), 1_510_488_000);
    assert_eq!(commit.hash.len(), 40);
}

#[test]
fn test_latest_change_of_file_without_history() {
    require_git!();
    let (dir, _repo) = create_repository("1.0.0");
    let git = GitRepository::new(dir.path());

    assert!(matches!(
        git.latest_change_of_file("DOESNOTEXIST"),
        Err(ChangelogError::EmptyHistory)
    ));
}

#[test]
fn test_latest_change_of_file_outside_repository() {
    require_git!();
    let dir = tempfile::tempdir().unwrap();
    let git = GitRepository::new(dir.path());

    let err = git.latest_change_of_file("VERSION").unwrap_err();
    assert!(matches!(err, ChangelogError::Git(_)));
    assert_eq!(err.exit_code(), 6);
}

#[test]
fn test_history_until_is_newest_first() {
    require_git!();
    let (dir, repo) = create_repository("1.0.0");
    let git = GitRepository::new(dir.path());
    let release = git.latest_change_of_file("VERSION").unwrap();

    add_commits(&repo, &["first", "second", "third"]);

    let subjects: Vec<String> = git
        .history_until(&release.hash)
        .unwrap()
        .into_iter()
        .map(|c| c.subject)
        .collect();
    assert_eq!(subjects, ["third", "second", "first"]);
}

#[test]
fn test_history_with_revision_range() {
    require_git!();
    let (dir, repo) = create_repository("1.0.0");
    add_commits(&repo, &["fix: one", "feat: two"]);
    let git = GitRepository::new(dir.path());

    let commits = git.history("HEAD~1..HEAD").unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].r#type, "feat");
    assert_eq!(commits[0].severity, Severity::Minor);
    assert_eq!(commits[0].parent_hashes.len(), 40);
}

#[test]
fn test_body_is_parsed_from_git_output() {
    require_git!();
    let (dir, repo) = create_repository("1.0.0");
    add_commits(
        &repo,
        &["docs(TICK-3): readme\n\nBREAKING CHANGE: config keys renamed\n"],
    );
    let git = GitRepository::new(dir.path());

    let commits = git.history("HEAD~1..HEAD").unwrap();
    assert_eq!(commits[0].scope, "TICK-3");
    assert!(commits[0].body.starts_with("BREAKING CHANGE: config keys renamed\n"));
    assert_eq!(commits[0].severity, Severity::Major);
}

#[test]
fn test_current_branch() {
    let (dir, _repo) = create_repository("1.0.0");
    let git = GitRepository::new(dir.path());
    assert_eq!(git.current_branch().unwrap(), "master");
}

// ============================================================================
// Workflows against a real repository
// ============================================================================

#[test]
fn test_generate_release() {
    require_git!();
    let (dir, repo) = create_repository("1.0.0\n");
    add_commits(&repo, &["fix: crash on start", "feat(TICK-1): login page"]);

    let git = GitRepository::new(dir.path());
    let result = generate(
        &git,
        &Config::default(),
        None,
        &WorkflowArgs::new(dir.path(), "master"),
    )
    .unwrap();

    assert_eq!(result.output.plan.next_version.to_string(), "1.1.0");
    assert_eq!(
        fs::read_to_string(dir.path().join("VERSION")).unwrap(),
        "1.1.0\n"
    );
    let changelog = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
    assert!(changelog.starts_with("## 1.1.0 ("));
    assert!(changelog.contains("#### Feature\n\n* login page [TICK-1] ("));
    assert!(changelog.contains("#### Bug Fixes\n\n* crash on start ("));
}

// ============================================================================
// Binary
// ============================================================================

#[test]
fn test_help() {
    let output = Command::new(BIN).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("semantic-changelog"));
    assert!(stdout.contains("next-version"));
    assert!(stdout.contains("generate"));
}

#[test]
fn test_bin_next_version() {
    require_git!();
    let (dir, repo) = create_repository("1.2.3\n");
    add_commits(&repo, &["feat(TICK-9): add thing"]);

    let output = run_bin(dir.path(), &["--branch", "master", "next-version"]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "1.3.0");
}

#[test]
fn test_bin_changelog_explicit_range() {
    require_git!();
    let (dir, repo) = create_repository("1.2.3\n");
    add_commits(&repo, &["fix: one", "fix: two"]);

    let output = run_bin(
        dir.path(),
        &["changelog", "--revision", "HEAD~1..HEAD", "--version", "9.9.9"],
    );
    assert!(output.status.success(), "{:?}", output);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("## 9.9.9 ("));
    assert!(stdout.contains("* two ("));
    assert!(!stdout.contains("* one ("));
}

#[test]
fn test_bin_exit_code_nothing_to_release() {
    require_git!();
    let (dir, _repo) = create_repository("1.2.3\n");

    let output = run_bin(dir.path(), &["--branch", "master", "n"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_bin_exit_code_missing_version_file() {
    require_git!();
    let (dir, _repo) = create_repository("1.2.3\n");

    let output = run_bin(dir.path(), &["next-version", "--file", "NOPE"]);
    assert_eq!(output.status.code(), Some(2));
}
