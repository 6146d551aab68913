//! Temporarily moves the work tree onto the metadata branch.

mod isolation;

pub use isolation::{BranchIsolation, IsolationError};
