use snafu::ResultExt;
use tracing::info;

use crate::commands::{CommandContext, CommandError, StoreSnafu, TreeSnafu, announce, notice};
use crate::tree::{DEFAULT_DESCRIPTION, path};
use crate::vcs::Vcs;

pub async fn run<V: Vcs>(
    ctx: &CommandContext<'_, V>,
    target: &str,
    description: &str,
) -> Result<(), CommandError> {
    ctx.ensure_initialized().await?;

    let target = path::normalize(target);
    let changed = ctx.isolated(describe(ctx, &target, description)).await?;
    if changed {
        announce("Described", format!("'{target}'"));
    } else {
        notice(format!("'{target}' already has that description"));
    }
    Ok(())
}

/// Sets the description of `target` and commits the tree file.
///
/// Returns `false` without committing when the description is unchanged.
async fn describe<V: Vcs>(
    ctx: &CommandContext<'_, V>,
    target: &str,
    description: &str,
) -> Result<bool, CommandError> {
    let description = match description.trim() {
        "" => DEFAULT_DESCRIPTION,
        trimmed => trimmed,
    };

    let store = ctx.store();
    let mut tree = store.load().await.context(StoreSnafu)?;

    if let Some(node) = tree.get_node(target) {
        if node.description == description {
            return Ok(false);
        }
        if node.has_description() {
            info!("Replacing description of '{}': {}", target, node.description);
        }
    }

    tree.set_description(target, description).context(TreeSnafu)?;
    store.save(&tree).await.context(StoreSnafu)?;
    ctx.commit_tree_file(&format!("Describe {target}")).await?;
    Ok(true)
}
