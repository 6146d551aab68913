//! Keeps a persisted [`crate::tree::PathTree`] in step with the repository.
//!
//! The [`diff_processor`] replays structural changes since the tree's baseline
//! commit onto a clone, the [`structure_loader`] reads what actually exists, and
//! the [`reconciler`] merges the two.

pub mod diff_processor;
pub mod reconciler;
pub mod structure_loader;

use snafu::{ResultExt, Snafu};
use tracing::info;

use crate::tree::{CommitId, PathTree};
use crate::vcs::{PathChange, Vcs, VcsError};

pub use diff_processor::{DiffOutcome, process_diff};
pub use reconciler::reconcile;
pub use structure_loader::load_structure;

/// Result of bringing a tree up to date with a reference.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Nothing changed since the baseline; callers should skip persisting and committing.
    UpToDate,
    Synced {
        tree: PathTree,
        changes: Vec<PathChange>,
    },
}

/// Diffs `baseline` against `reference`, then reconciles the result with the
/// structure currently found at `reference`.
pub async fn synchronize<V: Vcs>(
    vcs: &V,
    baseline: &PathTree,
    reference: &str,
) -> Result<SyncOutcome, SyncError> {
    let (updated, changes) = match process_diff(vcs, baseline, reference).await? {
        DiffOutcome::Unchanged => {
            info!(
                "Tree is already up to date with '{}' ({})",
                reference,
                baseline.source_commit().short()
            );
            return Ok(SyncOutcome::UpToDate);
        }
        DiffOutcome::Changed { tree, changes } => (tree, changes),
    };

    let current = load_structure(vcs, reference).await?;
    let tree = reconcile(&updated, &current);
    info!(
        "Synchronized tree from {} to {} ({} changes, {} nodes)",
        baseline.source_commit().short(),
        tree.source_commit().short(),
        changes.len(),
        tree.len()
    );

    Ok(SyncOutcome::Synced { tree, changes })
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SyncError {
    #[snafu(display("Failed to resolve '{}'", reference))]
    ResolveError {
        reference: String,
        source: VcsError,
    },
    #[snafu(display("Failed to list tracked paths at '{}'", reference))]
    ListError {
        reference: String,
        source: VcsError,
    },
    #[snafu(display("Failed to diff {} against '{}'", baseline, reference))]
    DiffError {
        baseline: CommitId,
        reference: String,
        source: VcsError,
    },
}

/// Wraps a resolution failure with the reference it concerns.
pub(crate) async fn resolve<V: Vcs>(vcs: &V, reference: &str) -> Result<CommitId, SyncError> {
    vcs.resolve_reference(reference)
        .await
        .context(ResolveSnafu { reference })
}
