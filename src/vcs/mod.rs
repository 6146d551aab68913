//! Version-control capability used by the rest of the crate.
//!
//! Everything that touches the repository goes through the [`Vcs`] trait, so
//! tree mutation, diffing and ordering stay testable without a real checkout.

mod change;
mod error;
#[cfg(test)]
pub mod fake;
mod git;
#[cfg(test)]
pub mod scratch;
mod tracked;
mod vcs;

pub use change::{PathChange, parse_name_status};
pub use error::VcsError;
pub use git::GitCli;
pub use tracked::{TrackedPath, parse_ls_tree};
pub use vcs::Vcs;
