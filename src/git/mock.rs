use crate::domain::Commit;
use crate::error::{ChangelogError, Result};
use crate::git::Repository;
use std::cell::Cell;
use std::collections::HashMap;

/// Mock repository for testing without actual git operations
///
/// Commits are stored newest first, like `git log` emits them.
pub struct MockRepository {
    commits: Vec<Commit>,
    file_changes: HashMap<String, String>,
    branch: String,
    fetch_count: Cell<usize>,
}

impl MockRepository {
    /// Create a new empty mock repository on `master`
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            file_changes: HashMap::new(),
            branch: "master".to_string(),
            fetch_count: Cell::new(0),
        }
    }

    /// Add a commit on top of the history
    pub fn add_commit(&mut self, commit: Commit) {
        self.commits.insert(0, commit);
    }

    /// Record that the newest commit changed `file`
    pub fn touch_file(&mut self, file: impl Into<String>) {
        if let Some(head) = self.commits.first() {
            self.file_changes.insert(file.into(), head.hash.clone());
        }
    }

    /// Set the checked out branch
    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.branch = branch.into();
    }

    /// Number of `fetch_all` calls so far
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.get()
    }

    fn position(&self, hash: &str) -> Result<usize> {
        self.commits
            .iter()
            .position(|c| c.hash == hash)
            .ok_or_else(|| ChangelogError::git(format!("unknown revision '{}'", hash)))
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn latest_change_of_file(&self, file: &str) -> Result<Commit> {
        let hash = self
            .file_changes
            .get(file)
            .ok_or(ChangelogError::EmptyHistory)?;
        Ok(self.commits[self.position(hash)?].clone())
    }

    fn history_until(&self, revision: &str) -> Result<Vec<Commit>> {
        let end = self.position(revision)?;
        Ok(self.commits[..end].to_vec())
    }

    fn history(&self, revisions: &str) -> Result<Vec<Commit>> {
        match revisions.split_once("..") {
            Some((from, "HEAD")) | Some((from, "")) => self.history_until(from),
            Some(_) => Err(ChangelogError::git(format!(
                "unsupported revision range '{}'",
                revisions
            ))),
            None => {
                let start = self.position(revisions)?;
                Ok(self.commits[start..].to_vec())
            }
        }
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn fetch_all(&self) -> Result<()> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        Ok(())
    }
}
