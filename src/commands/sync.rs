use snafu::ResultExt;

use crate::commands::{CommandContext, CommandError, StoreSnafu, SyncSnafu, announce, notice};
use crate::sync::{SyncOutcome, synchronize};
use crate::tree::PathTree;
use crate::vcs::{PathChange, Vcs};

/// The persisted tree after a sync, and what changed to get there.
#[derive(Debug)]
pub struct SyncSummary {
    pub tree: PathTree,
    pub changes: Vec<PathChange>,
}

pub async fn run<V: Vcs>(ctx: &CommandContext<'_, V>) -> Result<(), CommandError> {
    ctx.ensure_initialized().await?;

    let summary = ctx.isolated(sync_tree(ctx)).await?;
    if summary.changes.is_empty() {
        notice(format!(
            "{} is already up to date with '{}'",
            ctx.config.tree_file, ctx.config.main_branch
        ));
        return Ok(());
    }

    for change in &summary.changes {
        println!("  {change}");
    }
    announce(
        "Synced",
        format!(
            "{} to '{}' ({}), {} paths",
            ctx.config.tree_file,
            ctx.config.main_branch,
            summary.tree.source_commit().short(),
            summary.tree.len()
        ),
    );
    Ok(())
}

/// Brings the tree file up to date with the main branch and commits it when it changed.
///
/// Must run with the metadata branch checked out.
pub(crate) async fn sync_tree<V: Vcs>(
    ctx: &CommandContext<'_, V>,
) -> Result<SyncSummary, CommandError> {
    let store = ctx.store();
    let baseline = store.load().await.context(StoreSnafu)?;

    match synchronize(ctx.vcs, &baseline, &ctx.config.main_branch)
        .await
        .context(SyncSnafu)?
    {
        SyncOutcome::UpToDate => Ok(SyncSummary {
            tree: baseline,
            changes: Vec::new(),
        }),
        SyncOutcome::Synced { tree, changes } => {
            store.save(&tree).await.context(StoreSnafu)?;
            ctx.commit_tree_file(&format!(
                "Sync {} to {}",
                ctx.config.tree_file,
                tree.source_commit().short()
            ))
            .await?;
            Ok(SyncSummary { tree, changes })
        }
    }
}
