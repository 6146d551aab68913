use crate::tree::path;

/// Description given to every node nobody has annotated yet.
pub const DEFAULT_DESCRIPTION: &str = "No description added";

/// One tracked file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNode {
    pub path: String,
    pub is_dir: bool,
    pub description: String,
}

impl PathNode {
    pub fn new(path: impl Into<String>, is_dir: bool) -> Self {
        Self {
            path: path.into(),
            is_dir,
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self::new(path, false)
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self::new(path, true)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn name(&self) -> &str {
        path::file_name(&self.path)
    }

    pub fn parent(&self) -> &str {
        path::parent_of(&self.path)
    }

    pub fn has_description(&self) -> bool {
        self.description != DEFAULT_DESCRIPTION
    }

    /// Message used when this node's description is replayed as a commit.
    /// Git refuses empty messages, so a blank description falls back to the default.
    pub fn commit_message(&self) -> &str {
        if self.description.trim().is_empty() {
            DEFAULT_DESCRIPTION
        } else {
            &self.description
        }
    }
}
