//! Helpers deriving relationships between repository-relative paths.
//!
//! Every prefix test here respects the `/` boundary, so `a/b` is never
//! considered an ancestor of `a/bc`.

pub const SEPARATOR: char = '/';

/// Parent of every top-level path.
pub const ROOT: &str = "";

/// Returns the immediate parent directory of `path`, or [`ROOT`] for top-level paths.
pub fn parent_of(path: &str) -> &str {
    path.rfind(SEPARATOR).map_or(ROOT, |idx| &path[..idx])
}

/// Returns the last segment of `path`.
pub fn file_name(path: &str) -> &str {
    path.rfind(SEPARATOR).map_or(path, |idx| &path[idx + 1..])
}

/// Whether `path` lies strictly below `ancestor`.
pub fn is_within(ancestor: &str, path: &str) -> bool {
    if ancestor == ROOT {
        return path != ROOT;
    }
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with(SEPARATOR))
}

/// Rewrites `path` from under `old` to under `new`.
///
/// Returns `None` when `path` is neither `old` nor one of its descendants.
/// Only the leading occurrence of `old` is substituted.
pub fn rebase(path: &str, old: &str, new: &str) -> Option<String> {
    if path == old {
        Some(new.to_string())
    } else if old != ROOT && is_within(old, path) {
        Some(format!("{new}{}", &path[old.len()..]))
    } else {
        None
    }
}

/// Proper ancestors of `path`, nearest first, excluding the root.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    let mut current = path;
    std::iter::from_fn(move || {
        let parent = parent_of(current);
        if parent == ROOT {
            None
        } else {
            current = parent;
            Some(parent)
        }
    })
}

/// Normalizes user input into the form stored in a tree.
pub fn normalize(path: &str) -> String {
    path.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
