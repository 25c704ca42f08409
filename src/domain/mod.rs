//! Domain logic - pure business rules independent of git operations

pub mod branch;
pub mod commit;
pub mod prerelease;
pub mod version;

pub use branch::BranchContext;
pub use commit::{short_hash, Commit, CommitAuthor};
pub use prerelease::{BranchSuffixRule, SuffixTemplate};
pub use version::Severity;
