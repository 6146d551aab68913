use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::tree::{PathNode, PathTree, path};

/// Post-order over every node of a tree.
///
/// Children come before their directory and siblings are visited in ascending
/// path order, so replaying the sequence as commits describes contents before
/// the folder that holds them. Building the order is cheap to repeat and always
/// yields the same sequence for the same tree.
#[derive(Debug)]
pub struct PostOrder<'a> {
    tree: &'a PathTree,
    children: BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'a> PostOrder<'a> {
    pub fn new(tree: &'a PathTree) -> Self {
        let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for node in tree.nodes() {
            // Orphans hang off the root so they are still visited.
            let parent = if tree.contains(node.parent()) {
                node.parent()
            } else {
                path::ROOT
            };
            children.entry(parent).or_default().push(node.path.as_str());
        }
        for siblings in children.values_mut() {
            siblings.sort_unstable();
        }

        Self { tree, children }
    }

    /// The ordered nodes. Each call walks the tree afresh.
    pub fn nodes(&self) -> Vec<&'a PathNode> {
        let mut ordered = Vec::with_capacity(self.tree.len());
        let mut visited = HashSet::with_capacity(self.tree.len());

        for top in self.children_of(path::ROOT) {
            self.visit(*top, &mut visited, &mut ordered);
        }

        ordered
    }

    fn children_of(&self, path: &str) -> &[&'a str] {
        self.children
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterative depth-first walk; a frame is `(path, children_expanded)`.
    fn visit(
        &self,
        start: &'a str,
        visited: &mut HashSet<&'a str>,
        ordered: &mut Vec<&'a PathNode>,
    ) {
        let mut stack = vec![(start, false)];

        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                match self.tree.get_node(current) {
                    Some(node) => ordered.push(node),
                    None => warn!("Skipping '{}', it is no longer in the tree", current),
                }
                continue;
            }

            if !visited.insert(current) {
                continue;
            }

            stack.push((current, true));
            for child in self.children_of(current).iter().rev() {
                if !visited.contains(child) {
                    stack.push((*child, false));
                }
            }
        }
    }
}

/// Convenience wrapper around [`PostOrder`].
pub fn post_order(tree: &PathTree) -> Vec<&PathNode> {
    PostOrder::new(tree).nodes()
}
