use snafu::ResultExt;
use tracing::{debug, info};

use crate::sync::{DiffSnafu, SyncError, resolve};
use crate::tree::{PathNode, PathTree, TreeError};
use crate::vcs::{PathChange, Vcs};

#[derive(Debug)]
pub enum DiffOutcome {
    /// No structural change since the baseline commit.
    Unchanged,
    Changed {
        tree: PathTree,
        changes: Vec<PathChange>,
    },
}

/// Applies the structural changes between `baseline`'s commit and `reference`
/// to a clone of `baseline`. The baseline itself is left untouched.
pub async fn process_diff<V: Vcs>(
    vcs: &V,
    baseline: &PathTree,
    reference: &str,
) -> Result<DiffOutcome, SyncError> {
    let head = resolve(vcs, reference).await?;
    if &head == baseline.source_commit() {
        debug!("'{}' still points at the baseline commit", reference);
        return Ok(DiffOutcome::Unchanged);
    }

    let changes = vcs
        .diff_name_status(baseline.source_commit(), reference)
        .await
        .context(DiffSnafu {
            baseline: baseline.source_commit().clone(),
            reference,
        })?;
    if changes.is_empty() {
        debug!("No structural changes between {} and '{}'", baseline.source_commit(), reference);
        return Ok(DiffOutcome::Unchanged);
    }

    info!("Applying {} changes since {}", changes.len(), baseline.source_commit().short());
    let tree = apply_changes(baseline, &changes);
    Ok(DiffOutcome::Changed { tree, changes })
}

/// Replays `changes` in order onto a deep copy of `baseline`.
///
/// Deleting a path that is already gone is a no-op, since deleting a directory
/// earlier in the list removes its children too. A rename whose source is
/// missing degrades to adding the target.
pub fn apply_changes(baseline: &PathTree, changes: &[PathChange]) -> PathTree {
    let mut tree = baseline.clone();

    for change in changes {
        debug!("Applying {}", change);
        match change {
            PathChange::Added { path } => {
                tree.add_node(PathNode::file(path.as_str()));
            }
            PathChange::Deleted { path } => {
                if let Err(TreeError::NotFound { path }) = tree.delete_subtree(path) {
                    debug!("'{}' was already removed", path);
                }
            }
            PathChange::Renamed { from, to } => {
                if let Err(TreeError::NotFound { path }) = tree.rename_path(from, to) {
                    debug!("Rename source '{}' is unknown, adding '{}' instead", path, to);
                    tree.add_node(PathNode::file(to.as_str()));
                }
            }
        }
    }

    tree
}
