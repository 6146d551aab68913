use snafu::OptionExt;

use crate::vcs::error::{MalformedEntrySnafu, ParseError};

/// A path tracked by the repository at some reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPath {
    pub path: String,
    pub is_dir: bool,
}

#[cfg(test)]
impl TrackedPath {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
        }
    }
}

/// Parses the output of `git ls-tree -r -t -z`.
///
/// Each NUL terminated entry looks like `<mode> SP <type> SP <object> TAB <path>`.
/// `tree` entries are directories; blobs and submodule commits are files.
pub fn parse_ls_tree(output: &str) -> Result<Vec<TrackedPath>, ParseError> {
    output
        .split('\0')
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (meta, path) = entry
                .split_once('\t')
                .context(MalformedEntrySnafu { entry })?;
            let object_type = meta
                .split(' ')
                .nth(1)
                .context(MalformedEntrySnafu { entry })?;

            Ok(TrackedPath {
                path: path.to_string(),
                is_dir: object_type == "tree",
            })
        })
        .collect()
}
