use std::path::PathBuf;

use compio::fs;
use snafu::{ResultExt, Snafu, ensure};
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::tree::{PathNode, path};

/// Name of the scratch file created inside directories.
const MARKER_FILE_NAME: &str = ".gittier-placeholder";

/// A reversible change that gives git something to commit for a node.
pub trait Placeholder {
    async fn apply(&self, node: &PathNode) -> Result<AppliedPlaceholder, PlaceholderError>;
    async fn revert(&self, applied: &AppliedPlaceholder) -> Result<(), PlaceholderError>;
}

/// Record of an applied placeholder, enough to undo it exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedPlaceholder {
    /// A marker line was appended to a file; `original` holds its previous bytes.
    AppendedMarker { path: String, original: Vec<u8> },
    /// A marker file was created and must be deleted again.
    CreatedMarkerFile { path: String },
}

impl AppliedPlaceholder {
    /// Repository-relative path to stage for both commits.
    pub fn pathspec(&self) -> &str {
        match self {
            AppliedPlaceholder::AppendedMarker { path, .. } => path,
            AppliedPlaceholder::CreatedMarkerFile { path } => path,
        }
    }
}

/// [`Placeholder`] editing files in a checked-out work tree.
#[derive(Debug, Clone)]
pub struct WorkingTreePlaceholder {
    root: PathBuf,
}

impl WorkingTreePlaceholder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn marker_line(node: &PathNode) -> String {
        format!("\n[gittier placeholder for {}]\n", node.path)
    }

    /// Creates a marker file inside `directory` on behalf of `node`.
    async fn create_marker(
        &self,
        directory: &str,
        node: &PathNode,
    ) -> Result<AppliedPlaceholder, PlaceholderError> {
        let path = match directory {
            path::ROOT => MARKER_FILE_NAME.to_string(),
            directory => format!("{directory}/{MARKER_FILE_NAME}"),
        };
        let absolute = self.root.join(&path);
        ensure!(!absolute.exists(), MarkerExistsSnafu { path: absolute });

        let contents = Self::marker_line(node).into_bytes();
        fs::write(&absolute, contents)
            .await
            .0
            .context(WriteSnafu { path: absolute })?;
        debug!("Created marker file {}", path);
        Ok(AppliedPlaceholder::CreatedMarkerFile { path })
    }
}

impl Placeholder for WorkingTreePlaceholder {
    async fn apply(&self, node: &PathNode) -> Result<AppliedPlaceholder, PlaceholderError> {
        if node.is_dir {
            return self.create_marker(&node.path, node).await;
        }

        let absolute = self.root.join(&node.path);
        let metadata = fs::symlink_metadata(&absolute).await.context(ReadSnafu {
            path: absolute.clone(),
        })?;
        // Symlinks and submodules cannot carry a marker line of their own.
        if !metadata.is_file() {
            debug!("'{}' is not a regular file, marking its parent", node.path);
            return self.create_marker(node.parent(), node).await;
        }

        let original = fs::read(&absolute).await.context(ReadSnafu {
            path: absolute.clone(),
        })?;

        let mut marked = original.clone();
        marked.extend_from_slice(Self::marker_line(node).as_bytes());
        fs::write(&absolute, marked)
            .await
            .0
            .context(WriteSnafu { path: absolute })?;
        debug!("Appended marker to {}", node.path);

        Ok(AppliedPlaceholder::AppendedMarker {
            path: node.path.clone(),
            original,
        })
    }

    async fn revert(&self, applied: &AppliedPlaceholder) -> Result<(), PlaceholderError> {
        let absolute = self.root.join(applied.pathspec());
        match applied {
            AppliedPlaceholder::AppendedMarker { original, .. } => {
                fs::write(&absolute, original.clone())
                    .await
                    .0
                    .context(WriteSnafu { path: absolute })?;
            }
            AppliedPlaceholder::CreatedMarkerFile { .. } => {
                fs::remove_file(&absolute)
                    .await
                    .context(RemoveSnafu { path: absolute })?;
            }
        }
        debug!("Reverted placeholder on {}", applied.pathspec());
        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum PlaceholderError {
    #[snafu(display("Failed to read {}", path.best_effort_path_display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write {}", path.best_effort_path_display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to remove {}", path.best_effort_path_display()))]
    RemoveError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "Marker {} already exists, probably left over by an interrupted commit",
        path.best_effort_path_display()
    ))]
    MarkerExists { path: PathBuf },
}
