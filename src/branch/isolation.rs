use snafu::{ResultExt, Snafu};
use tracing::{debug, info, warn};

use crate::vcs::{Vcs, VcsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationState {
    OnOriginalBranch,
    Stashed,
    OnMetadataBranch,
}

/// An active switch to the metadata branch.
///
/// Obtained from [`BranchIsolation::enter`]; [`BranchIsolation::exit`] must be
/// called once the guarded work is done, whether it succeeded or not.
#[derive(Debug)]
#[must_use = "the original branch is only restored by calling `exit`"]
pub struct BranchIsolation {
    original_branch: String,
    metadata_branch: String,
    state: IsolationState,
    stashed: bool,
    switched: bool,
}

impl BranchIsolation {
    /// Records the current branch, stashes uncommitted work, creates the
    /// metadata branch from `base` if needed, and checks it out.
    ///
    /// If anything fails after stashing, the stash is popped again before the
    /// error is returned.
    pub async fn enter<V: Vcs>(
        vcs: &V,
        metadata_branch: &str,
        base: &str,
    ) -> Result<Self, IsolationError> {
        let original_branch = vcs.current_branch().await.context(CurrentBranchSnafu)?;
        let mut isolation = Self {
            original_branch,
            metadata_branch: metadata_branch.to_string(),
            state: IsolationState::OnOriginalBranch,
            stashed: false,
            switched: false,
        };

        if isolation.original_branch == metadata_branch {
            debug!("Already on '{}'", metadata_branch);
            isolation.state = IsolationState::OnMetadataBranch;
            return Ok(isolation);
        }

        if vcs
            .has_uncommitted_changes()
            .await
            .context(StatusSnafu)?
        {
            info!("Stashing uncommitted changes on '{}'", isolation.original_branch);
            vcs.stash().await.context(StashSnafu)?;
            isolation.stashed = true;
            isolation.state = IsolationState::Stashed;
        }

        if let Err(error) = isolation.switch_to_metadata(vcs, base).await {
            if isolation.stashed {
                if let Err(pop_error) = vcs.stash_pop().await {
                    warn!("Failed to restore stashed changes: {}", pop_error);
                }
            }
            return Err(error);
        }

        isolation.state = IsolationState::OnMetadataBranch;
        Ok(isolation)
    }

    async fn switch_to_metadata<V: Vcs>(&mut self, vcs: &V, base: &str) -> Result<(), IsolationError> {
        let branch = self.metadata_branch.as_str();

        let exists = vcs
            .branch_exists(branch)
            .await
            .context(BranchLookupSnafu { branch })?;
        if !exists {
            info!("Creating branch '{}' from '{}'", branch, base);
            vcs.create_branch(branch, base)
                .await
                .context(CreateBranchSnafu { branch, base })?;
        }

        vcs.switch_branch(branch)
            .await
            .context(BranchSwitchFailureSnafu { branch })?;
        self.switched = true;
        debug!("Switched to '{}'", branch);
        Ok(())
    }

    pub fn state(&self) -> IsolationState {
        self.state
    }

    /// Switches back to the original branch and pops the stash taken on entry.
    ///
    /// When switching back fails the stash is left alone, since popping it
    /// onto the metadata branch would mix user work into metadata commits.
    pub async fn exit<V: Vcs>(self, vcs: &V) -> Result<(), IsolationError> {
        if self.switched {
            if let Err(source) = vcs.switch_branch(&self.original_branch).await {
                return if self.stashed {
                    Err(source).context(SwitchBackStashKeptSnafu {
                        branch: self.original_branch.clone(),
                    })
                } else {
                    Err(source).context(BranchSwitchFailureSnafu {
                        branch: self.original_branch.clone(),
                    })
                };
            }
            debug!("Switched back to '{}'", self.original_branch);
        }

        if self.stashed {
            vcs.stash_pop().await.context(StashPopSnafu {
                branch: self.original_branch.clone(),
            })?;
            info!("Restored uncommitted changes on '{}'", self.original_branch);
        }

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum IsolationError {
    #[snafu(display("Failed to determine the current branch"))]
    CurrentBranchError { source: VcsError },
    #[snafu(display("Failed to check for uncommitted changes"))]
    StatusError { source: VcsError },
    #[snafu(display("Failed to stash uncommitted changes"))]
    StashError { source: VcsError },
    #[snafu(display("Failed to look up branch '{}'", branch))]
    BranchLookupError { branch: String, source: VcsError },
    #[snafu(display("Failed to create branch '{}' from '{}'", branch, base))]
    CreateBranchError {
        branch: String,
        base: String,
        source: VcsError,
    },
    #[snafu(display("Failed to switch to branch '{}'", branch))]
    BranchSwitchFailure { branch: String, source: VcsError },
    #[snafu(display(
        "Failed to switch back to branch '{}', uncommitted changes remain in the stash",
        branch
    ))]
    SwitchBackStashKept { branch: String, source: VcsError },
    #[snafu(display("Failed to restore stashed changes on '{}'", branch))]
    StashPopError { branch: String, source: VcsError },
}
