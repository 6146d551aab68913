//! Persistence of [`crate::tree::PathTree`] as YAML.

mod tree_store;

pub use tree_store::{TreeStore, TreeStoreError};
