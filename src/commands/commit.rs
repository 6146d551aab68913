use snafu::ResultExt;

use crate::commands::sync::sync_tree;
use crate::commands::{CommandContext, CommandError, ReplaySnafu, TreeSnafu, announce};
use crate::replay::{CommitReplay, ReplayReport, WorkingTreePlaceholder};
use crate::traversal::post_order;
use crate::tree::{TreeError, path};
use crate::vcs::Vcs;

/// Syncs the tree, then replays descriptions as commits on the metadata branch.
///
/// With `only` set, just that path is replayed.
pub async fn run<V: Vcs>(
    ctx: &CommandContext<'_, V>,
    only: Option<&str>,
) -> Result<(), CommandError> {
    ctx.ensure_initialized().await?;

    let only = only.map(path::normalize);
    let report = ctx.isolated(replay(ctx, only.as_deref())).await?;
    announce(
        "Committed",
        format!(
            "{} descriptions on '{}'",
            report.committed.len(),
            ctx.config.metadata_branch
        ),
    );
    Ok(())
}

async fn replay<V: Vcs>(
    ctx: &CommandContext<'_, V>,
    only: Option<&str>,
) -> Result<ReplayReport, CommandError> {
    let tree = sync_tree(ctx).await?.tree;

    let mut nodes = post_order(&tree);
    if let Some(target) = only {
        nodes.retain(|node| node.path == target);
        if nodes.is_empty() {
            return Err(TreeError::NotFound {
                path: target.to_string(),
            })
            .context(TreeSnafu);
        }
    }

    let placeholder = WorkingTreePlaceholder::new(&ctx.config.root);
    CommitReplay::new(ctx.vcs, &placeholder)
        .replay_all(nodes)
        .await
        .context(ReplaySnafu)
}
