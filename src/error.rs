use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for semantic-changelog operations
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Missing input: {0}")]
    Input(String),

    #[error("Could not parse log output: {reason} (line: {line:?})")]
    Parse { reason: String, line: String },

    #[error("Invalid commit timestamp '{value}': {reason}")]
    Timestamp { value: String, reason: String },

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Version file '{}' does not exist", .0.display())]
    VersionFileMissing(PathBuf),

    #[error("Version file '{}' is empty", .0.display())]
    EmptyVersionFile(PathBuf),

    #[error("There is nothing to release; no new commits found")]
    EmptyHistory,

    #[error("Git command failed: {0}")]
    Git(String),

    #[error("Git repository error: {0}")]
    Repository(#[from] git2::Error),

    #[error("Pull request lookup failed: {0}")]
    Fetch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in semantic-changelog
pub type Result<T> = std::result::Result<T, ChangelogError>;

impl ChangelogError {
    /// Create an input error with context
    pub fn input(msg: impl Into<String>) -> Self {
        ChangelogError::Input(msg.into())
    }

    /// Create a log parse error carrying the offending line
    pub fn parse(reason: impl Into<String>, line: impl Into<String>) -> Self {
        ChangelogError::Parse {
            reason: reason.into(),
            line: line.into(),
        }
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ChangelogError::Version(msg.into())
    }

    /// Create a git collaborator error with context
    pub fn git(msg: impl Into<String>) -> Self {
        ChangelogError::Git(msg.into())
    }

    /// Create a pull request lookup error with context
    pub fn fetch(msg: impl Into<String>) -> Self {
        ChangelogError::Fetch(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ChangelogError::Config(msg.into())
    }

    /// Process exit code reported by the command line for this error.
    ///
    /// Every member of the taxonomy maps to its own stable code so that
    /// scripts can tell "nothing to release" apart from real failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            ChangelogError::Input(_) | ChangelogError::VersionFileMissing(_) => 2,
            ChangelogError::Parse { .. } | ChangelogError::Timestamp { .. } => 3,
            ChangelogError::Version(_) => 4,
            ChangelogError::EmptyHistory => 5,
            ChangelogError::Git(_) | ChangelogError::Repository(_) => 6,
            ChangelogError::Fetch(_) => 7,
            ChangelogError::Io(_) => 8,
            ChangelogError::Config(_) => 9,
            ChangelogError::EmptyVersionFile(_) => 10,
        }
    }
}
