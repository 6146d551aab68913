use snafu::prelude::*;
use tracing::info;

use crate::commands::{
    BranchCheckedOutSnafu, CommandContext, CommandError, VcsSnafu, announce, notice,
};
use crate::vcs::Vcs;

/// Deletes the metadata branch and everything recorded on it.
pub async fn run<V: Vcs>(ctx: &CommandContext<'_, V>) -> Result<(), CommandError> {
    ctx.ensure_repository().await?;
    let branch = &ctx.config.metadata_branch;

    if !ctx.vcs.branch_exists(branch).await.context(VcsSnafu)? {
        notice(format!("Nothing to clean, '{branch}' does not exist"));
        return Ok(());
    }

    let current = ctx.vcs.current_branch().await.context(VcsSnafu)?;
    ensure!(current != *branch, BranchCheckedOutSnafu { branch });

    info!("Deleting branch '{}'", branch);
    ctx.vcs.delete_branch(branch).await.context(VcsSnafu)?;
    announce("Removed", format!("branch '{branch}'"));
    Ok(())
}
