//! Annotated path tree.
//!
//! A [`PathTree`] is a flat mapping from repository-relative path to a
//! [`PathNode`], together with the commit the snapshot was taken from.
//! Parent/child relationships are never stored, they are derived from the
//! paths themselves by the helpers in [`path`].

mod commit_id;
pub mod path;
mod path_node;
mod path_tree;

pub use commit_id::CommitId;
pub use path_node::{DEFAULT_DESCRIPTION, PathNode};
pub use path_tree::{PathTree, TreeError};
