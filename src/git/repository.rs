use crate::domain::Commit;
use crate::error::{ChangelogError, Result};
use crate::parser::{log_format, LogParser};
use git2::Repository as Git2Repo;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Working copy accessed through the `git` executable
pub struct GitRepository {
    path: PathBuf,
    parser: LogParser,
}

impl GitRepository {
    /// Use the working copy at `path` with the default log parser
    ///
    /// The path is not checked here; a missing repository surfaces as a
    /// git error on first use.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        GitRepository {
            path: path.as_ref().to_path_buf(),
            parser: LogParser::new(),
        }
    }

    /// Replace the parser, e.g. to change the feature type
    pub fn with_parser(mut self, parser: LogParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run_git(&self, args: &[&str]) -> Result<String> {
        debug!(dir = %self.path.display(), ?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .output()
            .map_err(|e| ChangelogError::git(format!("cannot run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChangelogError::git(format!(
                "git {} exited with {}: {}",
                args.first().copied().unwrap_or_default(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn log(&self, extra: &[&str]) -> Result<Vec<Commit>> {
        let format = format!("--format={}", log_format());
        let mut args = vec!["log", format.as_str()];
        args.extend_from_slice(extra);

        let out = self.run_git(&args)?;
        self.parser.parse_str(&out)
    }
}

impl super::Repository for GitRepository {
    fn latest_change_of_file(&self, file: &str) -> Result<Commit> {
        let commits = self.log(&["-n1", "--", file])?;
        commits.into_iter().next().ok_or(ChangelogError::EmptyHistory)
    }

    fn history_until(&self, revision: &str) -> Result<Vec<Commit>> {
        let range = format!("{}..HEAD", revision);
        self.log(&[range.as_str()])
    }

    fn history(&self, revisions: &str) -> Result<Vec<Commit>> {
        self.log(&[revisions])
    }

    fn current_branch(&self) -> Result<String> {
        let repo = Git2Repo::discover(&self.path)?;
        let head = repo.head()?;
        if !head.is_branch() {
            return Err(ChangelogError::git("HEAD is detached"));
        }
        head.shorthand()
            .map(|name| name.to_string())
            .ok_or_else(|| ChangelogError::git("branch name is not valid UTF-8"))
    }

    fn fetch_all(&self) -> Result<()> {
        self.run_git(&["fetch", "--all"])?;
        Ok(())
    }
}
