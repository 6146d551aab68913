//! User-facing commands, each a thin sequence over the core modules.
//!
//! Anything that reads or writes the tree file runs inside
//! [`CommandContext::isolated`], which checks out the metadata branch for the
//! duration and always tries to return to the user's branch afterwards.

pub mod clean;
pub mod commit;
pub mod desc;
pub mod init;
pub mod show;
pub mod sync;

use std::fmt::Display;
use std::path::PathBuf;

use colored::Colorize;
use snafu::prelude::*;
use tracing::{debug, error};

use crate::application::RuntimeConfig;
use crate::branch::{BranchIsolation, IsolationError};
use crate::ext::BestEffortPathExt;
use crate::replay::ReplayError;
use crate::store::{TreeStore, TreeStoreError};
use crate::sync::SyncError;
use crate::tree::TreeError;
use crate::vcs::{Vcs, VcsError};

pub struct CommandContext<'a, V> {
    pub vcs: &'a V,
    pub config: &'a RuntimeConfig,
}

impl<'a, V: Vcs> CommandContext<'a, V> {
    pub fn new(vcs: &'a V, config: &'a RuntimeConfig) -> Self {
        Self { vcs, config }
    }

    pub fn store(&self) -> TreeStore {
        TreeStore::new(&self.config.root, &self.config.tree_file)
    }

    pub async fn ensure_repository(&self) -> Result<(), CommandError> {
        let is_repository = self.vcs.is_repository().await.context(VcsSnafu)?;
        ensure!(
            is_repository,
            NotARepositorySnafu {
                root: self.config.root.clone()
            }
        );
        Ok(())
    }

    pub async fn ensure_initialized(&self) -> Result<(), CommandError> {
        self.ensure_repository().await?;
        let branch = &self.config.metadata_branch;
        let exists = self.vcs.branch_exists(branch).await.context(VcsSnafu)?;
        ensure!(exists, NotInitializedSnafu { branch });
        Ok(())
    }

    /// Runs `work` with the metadata branch checked out.
    ///
    /// `work` is only polled after the switch. The original branch is restored
    /// whether or not it succeeds; if both fail, both errors are reported.
    pub async fn isolated<T>(
        &self,
        work: impl Future<Output = Result<T, CommandError>>,
    ) -> Result<T, CommandError> {
        let isolation = BranchIsolation::enter(
            self.vcs,
            &self.config.metadata_branch,
            &self.config.main_branch,
        )
        .await
        .context(IsolationSnafu)?;
        debug!("Isolation entered: {:?}", isolation.state());

        let outcome = work.await;
        let restored = isolation.exit(self.vcs).await;

        match (outcome, restored) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(restore)) => Err(restore).context(RestoreSnafu),
            (Err(error), Ok(())) => Err(error),
            (Err(error), Err(restore)) => {
                error!("Failed to restore the original branch: {}", restore);
                Err(CommandError::FailedWithoutRestore {
                    source: Box::new(error),
                    restore,
                })
            }
        }
    }

    /// Commits the tree file on whatever branch is checked out.
    pub async fn commit_tree_file(&self, message: &str) -> Result<(), CommandError> {
        let file = &self.config.tree_file;
        self.vcs
            .stage_and_commit(file, message)
            .await
            .context(CommitTreeSnafu { file })
    }
}

pub(crate) fn announce(label: &str, detail: impl Display) {
    println!("{} {}", label.green().bold(), detail);
}

pub(crate) fn notice(detail: impl Display) {
    println!("{}", detail.to_string().dimmed());
}

#[derive(Debug, Snafu)]
pub enum CommandError {
    #[snafu(display("Git operation failed"))]
    VcsError { source: VcsError },
    #[snafu(display("{} is not inside a git work tree", root.best_effort_path_display()))]
    NotARepository { root: PathBuf },
    #[snafu(display(
        "Branch '{}' already exists, run `gittier clean` to start over",
        branch
    ))]
    AlreadyInitialized { branch: String },
    #[snafu(display("Branch '{}' does not exist, run `gittier init` first", branch))]
    NotInitialized { branch: String },
    #[snafu(display("Cannot delete '{}' while it is checked out", branch))]
    BranchCheckedOut { branch: String },
    #[snafu(display("Failed to switch to the metadata branch"))]
    IsolationError { source: IsolationError },
    #[snafu(display("The command succeeded but the original branch could not be restored"))]
    RestoreError { source: IsolationError },
    #[snafu(display("{}; restoring the original branch also failed: {}", source, restore))]
    FailedWithoutRestore {
        source: Box<CommandError>,
        restore: IsolationError,
    },
    #[snafu(display("Tree file error"))]
    StoreError { source: TreeStoreError },
    #[snafu(display("Failed to synchronize the tree"))]
    SyncError { source: SyncError },
    #[snafu(display("Failed to update the tree"))]
    TreeError { source: TreeError },
    #[snafu(display("Failed to replay descriptions"))]
    ReplayError { source: ReplayError },
    #[snafu(display("Failed to commit '{}'", file))]
    CommitTreeError { file: String, source: VcsError },
}
