use tracing::debug;

use crate::tree::{PathNode, PathTree};

/// Merges a diff-updated tree with the structure that actually exists.
///
/// `current` decides which paths exist and whether they are directories;
/// `updated` supplies the descriptions for every path it still knows about.
/// The merged tree takes over `current`'s source commit.
pub fn reconcile(updated: &PathTree, current: &PathTree) -> PathTree {
    let mut merged = PathTree::new(current.source_commit().clone());
    let mut carried = 0usize;

    for node in current.nodes() {
        let description = match updated.get_node(&node.path) {
            Some(annotated) => {
                carried += 1;
                annotated.description.clone()
            }
            None => node.description.clone(),
        };

        merged.add_node(PathNode {
            path: node.path.clone(),
            is_dir: node.is_dir,
            description,
        });
    }

    debug!(
        "Reconciled {} paths, {} carried over, {} dropped",
        merged.len(),
        carried,
        updated.len().saturating_sub(carried)
    );
    merged
}
