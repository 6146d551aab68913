//! Replays node descriptions as commit messages.
//!
//! Git only records a commit when something changed, so every node goes
//! through two commits: one carrying a throwaway [`Placeholder`] change, and
//! one undoing it whose message is the node's description.

mod driver;
mod placeholder;

pub use driver::{CommitReplay, ReplayError, ReplayReport};
pub use placeholder::{Placeholder, PlaceholderError, WorkingTreePlaceholder};
