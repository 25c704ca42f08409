/// Default name of the branch releases are cut from
pub const DEFAULT_RELEASE_BRANCH: &str = "master";

/// Represents the branch a release is calculated for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    pub name: String,
    pub is_release: bool,
}

impl BranchContext {
    /// Create a new branch context, comparing against the designated release branch
    pub fn new(name: impl Into<String>, release_branch: &str) -> Self {
        let name = name.into();
        let is_release = name == release_branch;

        BranchContext { name, is_release }
    }

    /// Check if releases on this branch increment the version
    pub fn is_release_branch(&self) -> bool {
        self.is_release
    }
}
