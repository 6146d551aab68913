use derive_more::Display;
use snafu::OptionExt;
use tracing::debug;

use crate::vcs::error::{MissingPathSnafu, ParseError};

/// A structural change reported between two commits.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PathChange {
    #[display("added {path}")]
    Added { path: String },
    #[display("deleted {path}")]
    Deleted { path: String },
    #[display("renamed {from} -> {to}")]
    Renamed { from: String, to: String },
}

/// Parses the output of `git diff --name-status -z`.
///
/// Records are NUL separated: a status token followed by one path, or two paths
/// for renames and copies. Content-only statuses (`M`, `T`, ...) are dropped.
pub fn parse_name_status(output: &str) -> Result<Vec<PathChange>, ParseError> {
    let mut tokens = output.split('\0').filter(|token| !token.is_empty());
    let mut changes = Vec::new();

    while let Some(status) = tokens.next() {
        let mut next_path = || {
            tokens
                .next()
                .map(str::to_string)
                .context(MissingPathSnafu { status })
        };

        match status.chars().next() {
            Some('A') => changes.push(PathChange::Added { path: next_path()? }),
            Some('D') => changes.push(PathChange::Deleted { path: next_path()? }),
            Some('R') => {
                let from = next_path()?;
                let to = next_path()?;
                changes.push(PathChange::Renamed { from, to });
            }
            Some('C') => {
                let _source = next_path()?;
                changes.push(PathChange::Added { path: next_path()? });
            }
            _ => {
                let path = next_path()?;
                debug!("Ignoring content-only change '{}' on {}", status, path);
            }
        }
    }

    Ok(changes)
}
