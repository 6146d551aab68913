use snafu::ResultExt;
use tracing::debug;

use crate::sync::{ListSnafu, SyncError, resolve};
use crate::tree::{PathNode, PathTree};
use crate::vcs::Vcs;

/// Builds a tree of every path tracked at `reference`, all with the default description.
///
/// Intermediate directories missing from the listing are synthesized, so the
/// result never contains an orphaned path.
pub async fn load_structure<V: Vcs>(vcs: &V, reference: &str) -> Result<PathTree, SyncError> {
    let commit = resolve(vcs, reference).await?;
    let tracked = vcs
        .list_tracked_paths(reference)
        .await
        .context(ListSnafu { reference })?;
    debug!("'{}' tracks {} entries", reference, tracked.len());

    let mut tree = PathTree::new(commit);
    for entry in tracked {
        let node = PathNode::new(entry.path, entry.is_dir);
        // A directory synthesized earlier must not be downgraded to a file.
        let already_present = tree
            .get_node(&node.path)
            .is_some_and(|existing| existing.is_dir || !node.is_dir);
        if !already_present {
            tree.add_node_with_ancestors(node);
        }
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncError;
    use crate::tree::DEFAULT_DESCRIPTION;
    use crate::vcs::fake::FakeVcs;
    use crate::vcs::{TrackedPath, VcsError};

    #[compio::test]
    async fn fresh_load_uses_default_descriptions() {
        let vcs = FakeVcs::on_branch("main").with_ref("main", "abc").with_tracked(
            "main",
            vec![
                TrackedPath::dir("a"),
                TrackedPath::file("a/x.txt"),
                TrackedPath::file("b.txt"),
            ],
        );

        let tree = load_structure(&vcs, "main").await.unwrap();

        assert_eq!(tree.source_commit().as_str(), "abc");
        assert_eq!(tree.len(), 3);
        assert!(tree.get_node("a").unwrap().is_dir);
        assert!(
            tree.nodes()
                .all(|node| node.description == DEFAULT_DESCRIPTION)
        );
    }

    #[compio::test]
    async fn synthesizes_missing_intermediate_directories() {
        let vcs = FakeVcs::on_branch("main")
            .with_ref("main", "abc")
            .with_tracked("main", vec![TrackedPath::file("a/b/c.txt")]);

        let tree = load_structure(&vcs, "main").await.unwrap();

        let mut paths = tree.paths().collect::<Vec<_>>();
        paths.sort();
        assert_eq!(paths, vec!["a", "a/b", "a/b/c.txt"]);
        assert!(tree.get_node("a/b").unwrap().is_dir);
    }

    #[compio::test]
    async fn directory_listed_after_its_files_stays_a_directory() {
        let vcs = FakeVcs::on_branch("main").with_ref("main", "abc").with_tracked(
            "main",
            vec![TrackedPath::file("d/f.txt"), TrackedPath::dir("d")],
        );

        let tree = load_structure(&vcs, "main").await.unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree.get_node("d").unwrap().is_dir);
    }

    #[compio::test]
    async fn unresolvable_reference_fails() {
        let vcs = FakeVcs::on_branch("main");

        let result = load_structure(&vcs, "missing").await;

        assert!(matches!(
            result,
            Err(SyncError::ResolveError {
                source: VcsError::ReferenceError { .. },
                ..
            })
        ));
        assert!(!vcs.calls().iter().any(|call| call.starts_with("list_tracked_paths")));
    }
}
