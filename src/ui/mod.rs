//! User interface module - styled terminal output.

pub mod formatter;

pub use formatter::{
    commit_summary_lines, display_boundary_warning, display_commit_summary, display_error,
    display_status, display_success, display_version_change,
};
