use snafu::prelude::*;
use tracing::info;

use crate::commands::{
    AlreadyInitializedSnafu, CommandContext, CommandError, StoreSnafu, SyncSnafu, VcsSnafu,
    announce,
};
use crate::sync::load_structure;
use crate::tree::PathTree;
use crate::vcs::Vcs;

/// Records the main line's current structure on a new metadata branch.
pub async fn run<V: Vcs>(ctx: &CommandContext<'_, V>) -> Result<(), CommandError> {
    ctx.ensure_repository().await?;

    let branch = &ctx.config.metadata_branch;
    let exists = ctx.vcs.branch_exists(branch).await.context(VcsSnafu)?;
    ensure!(!exists, AlreadyInitializedSnafu { branch });

    let tree = ctx.isolated(record_structure(ctx)).await?;
    announce(
        "Initialized",
        format!(
            "{} with {} paths from '{}' ({}) on '{}'",
            ctx.config.tree_file,
            tree.len(),
            ctx.config.main_branch,
            tree.source_commit().short(),
            branch
        ),
    );
    Ok(())
}

async fn record_structure<V: Vcs>(ctx: &CommandContext<'_, V>) -> Result<PathTree, CommandError> {
    let tree = load_structure(ctx.vcs, &ctx.config.main_branch)
        .await
        .context(SyncSnafu)?;
    info!("Recording {} paths", tree.len());

    ctx.store().save(&tree).await.context(StoreSnafu)?;
    ctx.commit_tree_file(&format!(
        "Record {} at {}",
        ctx.config.tree_file,
        tree.source_commit().short()
    ))
    .await?;
    Ok(tree)
}
