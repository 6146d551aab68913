use crate::tree::CommitId;
use crate::vcs::{PathChange, TrackedPath, VcsError};

/// Operations the core needs from the version-control system.
///
/// Calls are awaited one at a time; implementations may assume they never
/// run concurrently against the same working tree.
pub trait Vcs {
    async fn is_repository(&self) -> Result<bool, VcsError>;

    /// Resolves a branch, tag or commit expression to a commit id.
    async fn resolve_reference(&self, reference: &str) -> Result<CommitId, VcsError>;

    /// Every tracked file and directory as of `reference`.
    async fn list_tracked_paths(&self, reference: &str) -> Result<Vec<TrackedPath>, VcsError>;

    /// Structural changes between `from` and `to`. An empty list means nothing changed.
    async fn diff_name_status(
        &self,
        from: &CommitId,
        to: &str,
    ) -> Result<Vec<PathChange>, VcsError>;

    async fn current_branch(&self) -> Result<String, VcsError>;
    async fn branch_exists(&self, name: &str) -> Result<bool, VcsError>;
    async fn create_branch(&self, name: &str, base: &str) -> Result<(), VcsError>;
    async fn switch_branch(&self, name: &str) -> Result<(), VcsError>;
    async fn delete_branch(&self, name: &str) -> Result<(), VcsError>;

    async fn has_uncommitted_changes(&self) -> Result<bool, VcsError>;
    async fn stash(&self) -> Result<(), VcsError>;
    async fn stash_pop(&self) -> Result<(), VcsError>;

    /// Stages everything matching `pathspec` (deletions included) and commits it.
    async fn stage_and_commit(&self, pathspec: &str, message: &str) -> Result<(), VcsError>;
}
