//! History collaborator
//!
//! The workflows never talk to git directly; they depend on the
//! [Repository] trait. The implementations are:
//!
//! - [repository::GitRepository]: runs the `git` executable with the fixed
//!   log format and parses its output, uses `git2` for branch lookups
//! - [mock::MockRepository]: canned histories for tests
//!
//! ```rust
//! # use semantic_changelog::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> semantic_changelog::Result<()> {
//! let release = repo.latest_change_of_file("VERSION")?;
//! let commits = repo.history_until(&release.hash)?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::GitRepository;

use crate::domain::Commit;
use crate::error::Result;

/// Access to the commit history of a working copy
///
/// All histories are returned newest first. Failures of the underlying
/// tooling are reported as [crate::error::ChangelogError::Git] and never
/// retried.
pub trait Repository {
    /// The newest commit that touched `file`
    ///
    /// # Returns
    /// * `Ok(Commit)` - The commit of the latest change
    /// * `Err(EmptyHistory)` - If the file has no history
    /// * `Err` - If git fails, e.g. outside of a repository
    fn latest_change_of_file(&self, file: &str) -> Result<Commit>;

    /// Commits reachable from `HEAD` but not from `revision` (`revision..HEAD`)
    fn history_until(&self, revision: &str) -> Result<Vec<Commit>>;

    /// Commits selected by any git revision expression
    ///
    /// e.g. `13c2a8c..HEAD`, `develop..master` or `HEAD^1`, see
    /// `man 7 gitrevisions`.
    fn history(&self, revisions: &str) -> Result<Vec<Commit>>;

    /// Name of the checked out branch
    fn current_branch(&self) -> Result<String>;

    /// Fetch all remotes
    fn fetch_all(&self) -> Result<()>;
}
