use regex::Regex;
use std::sync::LazyLock;

/// Maximum number of characters kept from a commit subject
pub const MAX_SUBJECT_LEN: usize = 50;

/// Subject grammar: `type(scope): subject`, type and scope optional
static COMMIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w*)(?:\((.*)\))?: (.*)$").expect("Invalid regex"));

/// Result of classifying a commit subject line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub r#type: String,
    pub scope: String,
    pub subject: String,
}

/// Extracts type, scope and display subject from a commit subject line
pub trait CommitClassifier {
    fn classify(&self, message: &str) -> Classification;
}

impl<F> CommitClassifier for F
where
    F: Fn(&str) -> Classification,
{
    fn classify(&self, message: &str) -> Classification {
        self(message)
    }
}

/// Classifier for `type(scope): subject` messages
///
/// The type is lowercased, the scope uppercased (scopes usually carry ticket
/// ids like `TICK-9`) and the subject lowercased and truncated. Messages that
/// do not follow the grammar keep their whole first line as subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultClassifier {
    max_subject_len: usize,
}

impl DefaultClassifier {
    pub fn new() -> Self {
        DefaultClassifier {
            max_subject_len: MAX_SUBJECT_LEN,
        }
    }

    /// Use a different subject length limit
    pub fn with_max_subject_len(max_subject_len: usize) -> Self {
        DefaultClassifier { max_subject_len }
    }

    fn display_subject(&self, subject: &str) -> String {
        subject
            .to_lowercase()
            .chars()
            .take(self.max_subject_len)
            .collect()
    }
}

impl Default for DefaultClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CommitClassifier for DefaultClassifier {
    fn classify(&self, message: &str) -> Classification {
        let first_line = message.lines().next().unwrap_or("");

        match COMMIT_PATTERN.captures(first_line) {
            Some(captures) => {
                let group = |i: usize| captures.get(i).map(|m| m.as_str()).unwrap_or("");
                Classification {
                    r#type: group(1).to_lowercase(),
                    scope: group(2).to_uppercase(),
                    subject: self.display_subject(group(3)),
                }
            }
            None => Classification {
                r#type: String::new(),
                scope: String::new(),
                subject: self.display_subject(first_line),
            },
        }
    }
}
