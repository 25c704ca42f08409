//! History log parsing
//!
//! The history collaborator runs `git log` with [`log_format`] and hands the
//! raw output to a [`LogParser`]. Each commit is one header line with six
//! fields joined by [`DELIMITER`], optionally followed by a body enclosed in
//! [`BODY_BEGIN`] / [`BODY_END`] marker lines.

use std::io::BufRead;

use chrono::{TimeZone, Utc};
use tracing::debug;

use crate::conventional::{CommitClassifier, DefaultClassifier};
use crate::domain::{Commit, CommitAuthor, Severity};
use crate::error::{ChangelogError, Result};

/// Separates the header fields of a log entry
pub const DELIMITER: &str = "~Ü>8~#Ä~8<Ü~";

/// Line opening a commit body
pub const BODY_BEGIN: &str = "((((((((----))))))))";

/// Line closing a commit body
pub const BODY_END: &str = "((((((((^^^^))))))))";

/// Number of fields in a header line
pub const HEADER_FIELDS: usize = 6;

/// Default type token that raises a commit to at least minor severity
pub const DEFAULT_FEATURE_TYPE: &str = "feat";

/// Pretty format placeholders, in header field order
const FORMAT_FIELDS: [&str; HEADER_FIELDS] = [
    "%P",  // parent hashes
    "%H",  // commit hash
    "%at", // author date, unix seconds
    "%an", // author name
    "%ae", // author email
    "%s",  // subject
];

/// The `--format` argument matching what [`LogParser`] expects
pub fn log_format() -> String {
    format!(
        "{}%n{}%n%b%n{}",
        FORMAT_FIELDS.join(DELIMITER),
        BODY_BEGIN,
        BODY_END
    )
}

/// Turns raw log output into commit records, newest first
pub struct LogParser {
    classifier: Box<dyn CommitClassifier>,
    feature_type: String,
}

impl LogParser {
    /// Parser using the [`DefaultClassifier`] and `feat` as feature type
    pub fn new() -> Self {
        LogParser {
            classifier: Box::new(DefaultClassifier::new()),
            feature_type: DEFAULT_FEATURE_TYPE.to_string(),
        }
    }

    /// Use a custom subject classifier
    pub fn with_classifier<C: CommitClassifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Set the type token that marks features
    pub fn with_feature_type(mut self, feature_type: impl Into<String>) -> Self {
        self.feature_type = feature_type.into();
        self
    }

    /// Parse log output held in memory
    pub fn parse_str(&self, output: &str) -> Result<Vec<Commit>> {
        self.parse(output.as_bytes())
    }

    /// Parse log output from a reader.
    ///
    /// A body is only read when the line after a header is [`BODY_BEGIN`];
    /// otherwise that line starts the next entry.
    ///
    /// Fails with [`ChangelogError::Parse`] when a header line does not split
    /// into exactly six fields or a line is not valid UTF-8, and with
    /// [`ChangelogError::Timestamp`] when the author date is not an integer.
    /// Nothing is returned on failure.
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<Vec<Commit>> {
        let mut commits = Vec::new();
        let mut lines = reader.split(b'\n').map(decode_line).peekable();

        while let Some(header) = lines.next() {
            let header = header?;
            if header.trim().is_empty() {
                continue;
            }

            let mut body = String::new();
            if matches!(lines.peek(), Some(Ok(line)) if line == BODY_BEGIN) {
                lines.next();
                for line in lines.by_ref() {
                    let line = line?;
                    if line == BODY_BEGIN {
                        continue;
                    }
                    if line == BODY_END {
                        break;
                    }
                    body.push_str(&line);
                    body.push('\n');
                }
            }

            commits.push(self.parse_entry(&header, body)?);
        }

        debug!(commit_count = commits.len(), "parsed log output");
        Ok(commits)
    }

    fn parse_entry(&self, header: &str, body: String) -> Result<Commit> {
        let fields: Vec<&str> = header.split(DELIMITER).collect();
        if fields.len() != HEADER_FIELDS {
            return Err(ChangelogError::parse(
                format!(
                    "expected {} header fields, found {}",
                    HEADER_FIELDS,
                    fields.len()
                ),
                header,
            ));
        }

        let seconds = fields[2]
            .parse::<i64>()
            .map_err(|e| ChangelogError::Timestamp {
                value: fields[2].to_string(),
                reason: e.to_string(),
            })?;
        let date = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| ChangelogError::Timestamp {
                value: fields[2].to_string(),
                reason: "out of range".to_string(),
            })?;

        let classification = self.classifier.classify(fields[5]);

        let mut severity = Severity::Patch;
        if classification.r#type == self.feature_type {
            severity = Severity::Minor;
        }

        let mut commit = Commit {
            hash: fields[1].to_string(),
            parent_hashes: fields[0].to_string(),
            author: CommitAuthor {
                name: fields[3].to_string(),
                email: fields[4].to_string(),
            },
            date,
            r#type: classification.r#type,
            scope: classification.scope,
            subject: classification.subject,
            body,
            severity,
        };
        if commit.is_breaking_change() {
            commit.severity = Severity::Major;
        }

        Ok(commit)
    }
}

/// Decode one raw line, dropping the trailing `\r` of CRLF output
fn decode_line(raw: std::io::Result<Vec<u8>>) -> Result<String> {
    let mut bytes = raw?;
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8(bytes).map_err(|e| {
        let reason = format!("log output is not valid UTF-8: {}", e.utf8_error());
        ChangelogError::parse(reason, String::from_utf8_lossy(e.as_bytes()))
    })
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}
