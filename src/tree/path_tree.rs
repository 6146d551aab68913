use std::collections::HashMap;

use snafu::{OptionExt, Snafu, ensure};
use tracing::debug;

use crate::tree::{CommitId, PathNode, path};

/// Snapshot of every annotated path in a repository at one commit.
///
/// Storage order is meaningless; use [`crate::traversal`] for a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTree {
    source_commit: CommitId,
    nodes: HashMap<String, PathNode>,
}

impl PathTree {
    pub fn new(source_commit: impl Into<CommitId>) -> Self {
        Self {
            source_commit: source_commit.into(),
            nodes: HashMap::new(),
        }
    }

    pub fn source_commit(&self) -> &CommitId {
        &self.source_commit
    }

    /// Inserts `node`, replacing and returning any node previously stored at its path.
    pub fn add_node(&mut self, node: PathNode) -> Option<PathNode> {
        self.nodes.insert(node.path.clone(), node)
    }

    /// Inserts `node` and a default directory node for every missing ancestor.
    pub fn add_node_with_ancestors(&mut self, node: PathNode) {
        for ancestor in path::ancestors(&node.path) {
            if !self.nodes.contains_key(ancestor) {
                self.nodes
                    .insert(ancestor.to_string(), PathNode::dir(ancestor));
            }
        }
        self.add_node(node);
    }

    pub fn get_node(&self, path: &str) -> Option<&PathNode> {
        self.nodes.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PathNode> {
        self.nodes.values()
    }

    #[cfg(test)]
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Removes `path` and everything below it, returning how many nodes were dropped.
    pub fn delete_subtree(&mut self, path: &str) -> Result<usize, TreeError> {
        ensure!(self.nodes.contains_key(path), NotFoundSnafu { path });

        let before = self.nodes.len();
        self.nodes
            .retain(|candidate, _| candidate != path && !path::is_within(path, candidate));
        let removed = before - self.nodes.len();

        debug!("Deleted '{}' ({} nodes)", path, removed);
        Ok(removed)
    }

    /// Moves `old_path` and all of its descendants under `new_path`.
    ///
    /// Descriptions and directory flags travel with the nodes. Returns how many
    /// nodes were relocated.
    pub fn rename_path(&mut self, old_path: &str, new_path: &str) -> Result<usize, TreeError> {
        ensure!(
            self.nodes.contains_key(old_path),
            NotFoundSnafu { path: old_path }
        );

        let moved = self
            .nodes
            .keys()
            .filter_map(|candidate| {
                path::rebase(candidate, old_path, new_path)
                    .map(|target| (candidate.clone(), target))
            })
            .collect::<Vec<_>>();

        let relocated = moved
            .into_iter()
            .filter_map(|(from, to)| self.nodes.remove(&from).map(|node| (to, node)))
            .collect::<Vec<_>>();

        let count = relocated.len();
        for (to, mut node) in relocated {
            node.path = to;
            self.add_node(node);
        }

        debug!("Renamed '{}' -> '{}' ({} nodes)", old_path, new_path, count);
        Ok(count)
    }

    /// Nodes whose immediate parent is `path`, sorted by path.
    ///
    /// Pass [`path::ROOT`] to get the top-level nodes.
    pub fn children_of(&self, path: &str) -> Vec<&PathNode> {
        let mut children = self
            .nodes
            .values()
            .filter(|node| node.path != path && node.parent() == path)
            .collect::<Vec<_>>();
        children.sort_by(|a, b| a.path.cmp(&b.path));
        children
    }

    pub fn set_description(
        &mut self,
        path: &str,
        description: impl Into<String>,
    ) -> Result<&PathNode, TreeError> {
        let node = self.nodes.get_mut(path).context(NotFoundSnafu { path })?;
        node.description = description.into();
        Ok(node)
    }
}

#[derive(Debug, Snafu)]
pub enum TreeError {
    #[snafu(display("Path '{}' is not present in the tree", path))]
    NotFound { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::DEFAULT_DESCRIPTION;

    fn sample_tree() -> PathTree {
        let mut tree = PathTree::new("c0ffee");
        tree.add_node(PathNode::dir("a"));
        tree.add_node(PathNode::dir("a/b"));
        tree.add_node(PathNode::file("a/b/c.txt").with_description("deep file"));
        tree.add_node(PathNode::file("a/bc").with_description("sibling prefix"));
        tree.add_node(PathNode::file("a/x.txt"));
        tree.add_node(PathNode::file("top.txt"));
        tree
    }

    fn sorted_paths(tree: &PathTree) -> Vec<String> {
        let mut paths = tree.paths().map(str::to_string).collect::<Vec<_>>();
        paths.sort();
        paths
    }

    #[test]
    fn clone_is_independent() {
        let original = sample_tree();
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.delete_subtree("a").unwrap();
        copy.set_description("top.txt", "changed").unwrap();

        assert!(original.contains("a/b/c.txt"));
        assert_eq!(
            original.get_node("top.txt").unwrap().description,
            DEFAULT_DESCRIPTION
        );
    }

    #[test]
    fn delete_subtree_removes_descendants_only() {
        let mut tree = sample_tree();
        let removed = tree.delete_subtree("a/b").unwrap();

        assert_eq!(removed, 2);
        assert_eq!(sorted_paths(&tree), vec!["a", "a/bc", "a/x.txt", "top.txt"]);
    }

    #[test]
    fn delete_subtree_twice_fails_with_not_found() {
        let mut tree = sample_tree();
        tree.delete_subtree("a/b").unwrap();

        let result = tree.delete_subtree("a/b");
        assert!(matches!(result, Err(TreeError::NotFound { path }) if path == "a/b"));
    }

    #[test]
    fn rename_path_cascades_and_preserves_content() {
        let mut tree = sample_tree();
        let moved = tree.rename_path("a/b", "z").unwrap();

        assert_eq!(moved, 2);
        assert!(!tree.contains("a/b"));
        assert!(!tree.contains("a/b/c.txt"));

        let dir = tree.get_node("z").unwrap();
        assert!(dir.is_dir);
        let file = tree.get_node("z/c.txt").unwrap();
        assert!(!file.is_dir);
        assert_eq!(file.description, "deep file");

        assert_eq!(
            tree.get_node("a/bc").unwrap().description,
            "sibling prefix"
        );
    }

    #[test]
    fn rename_missing_path_fails_with_not_found() {
        let mut tree = sample_tree();
        let before = tree.clone();

        let result = tree.rename_path("nope", "other");
        assert!(matches!(result, Err(TreeError::NotFound { .. })));
        assert_eq!(tree, before);
    }

    #[test]
    fn rename_into_own_subdirectory() {
        let mut tree = sample_tree();
        tree.rename_path("a/b", "a/b/inner").unwrap();

        assert!(tree.contains("a/b/inner"));
        assert_eq!(
            tree.get_node("a/b/inner/c.txt").unwrap().description,
            "deep file"
        );
        assert!(!tree.contains("a/b/c.txt"));
    }

    #[test]
    fn children_of_uses_derived_parents() {
        let tree = sample_tree();
        let children = tree
            .children_of("a")
            .into_iter()
            .map(|node| node.path.as_str())
            .collect::<Vec<_>>();
        assert_eq!(children, vec!["a/b", "a/bc", "a/x.txt"]);

        let top = tree
            .children_of(path::ROOT)
            .into_iter()
            .map(|node| node.path.as_str())
            .collect::<Vec<_>>();
        assert_eq!(top, vec!["a", "top.txt"]);
    }

    #[test]
    fn add_node_with_ancestors_synthesizes_directories() {
        let mut tree = PathTree::new("c0ffee");
        tree.add_node_with_ancestors(PathNode::file("x/y/z.txt"));

        assert_eq!(sorted_paths(&tree), vec!["x", "x/y", "x/y/z.txt"]);
        assert!(tree.get_node("x/y").unwrap().is_dir);
    }

    #[test]
    fn set_description_on_missing_path_fails() {
        let mut tree = sample_tree();
        let result = tree.set_description("missing", "text");
        assert!(matches!(result, Err(TreeError::NotFound { .. })));
    }
}
