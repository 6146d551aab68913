use derive_more::{Display, From};

/// Identifier of a repository commit, as printed by `git rev-parse`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Display, From)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form used in log lines and commit messages.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(7)
            .map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }
}

impl From<&str> for CommitId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
