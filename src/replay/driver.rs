use derive_more::Display;
use snafu::{ResultExt, Snafu};
use tracing::{info, warn};

use crate::replay::{Placeholder, PlaceholderError};
use crate::tree::PathNode;
use crate::vcs::{Vcs, VcsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReplayStep {
    #[display("placeholder commit")]
    Placeholder,
    #[display("description commit")]
    Restore,
}

/// Paths committed so far, in replay order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub committed: Vec<String>,
}

/// Drives the two-commit sequence for each node, strictly one node at a time.
pub struct CommitReplay<'a, V, P> {
    vcs: &'a V,
    placeholder: &'a P,
}

impl<'a, V: Vcs, P: Placeholder> CommitReplay<'a, V, P> {
    pub fn new(vcs: &'a V, placeholder: &'a P) -> Self {
        Self { vcs, placeholder }
    }

    /// Replays `nodes` in the given order, stopping at the first failure.
    pub async fn replay_all<'n>(
        &self,
        nodes: impl IntoIterator<Item = &'n PathNode>,
    ) -> Result<ReplayReport, ReplayError> {
        let mut report = ReplayReport::default();

        for node in nodes {
            info!("Committing description of '{}'", node.path);
            self.replay_node(node).await?;
            report.committed.push(node.path.clone());
        }

        info!("Replayed {} descriptions", report.committed.len());
        Ok(report)
    }

    /// Commits the placeholder change for `node`, then its undo under the node's description.
    pub async fn replay_node(&self, node: &PathNode) -> Result<(), ReplayError> {
        let applied = self
            .placeholder
            .apply(node)
            .await
            .context(PlaceholderFailureSnafu {
                path: node.path.clone(),
                step: ReplayStep::Placeholder,
            })?;

        let placeholder_message = format!("Placeholder change for {}", node.path);
        if let Err(source) = self
            .vcs
            .stage_and_commit(applied.pathspec(), &placeholder_message)
            .await
        {
            // Nothing was committed, so leave the work tree as it was.
            if let Err(revert_error) = self.placeholder.revert(&applied).await {
                warn!(
                    "Could not undo placeholder on '{}': {}",
                    applied.pathspec(),
                    revert_error
                );
            }
            return Err(source).context(CommitStepFailureSnafu {
                path: node.path.clone(),
                step: ReplayStep::Placeholder,
            });
        }

        self.placeholder
            .revert(&applied)
            .await
            .context(PlaceholderFailureSnafu {
                path: node.path.clone(),
                step: ReplayStep::Restore,
            })?;

        self.vcs
            .stage_and_commit(applied.pathspec(), node.commit_message())
            .await
            .context(CommitStepFailureSnafu {
                path: node.path.clone(),
                step: ReplayStep::Restore,
            })
    }
}

#[derive(Debug, Snafu)]
pub enum ReplayError {
    #[snafu(display("Failed the {} for '{}'", step, path))]
    CommitStepFailure {
        path: String,
        step: ReplayStep,
        source: VcsError,
    },
    #[snafu(display("Failed to prepare the {} for '{}'", step, path))]
    PlaceholderFailure {
        path: String,
        step: ReplayStep,
        source: PlaceholderError,
    },
}
