use colored::Colorize;
use snafu::ResultExt;

use crate::commands::{CommandContext, CommandError, StoreSnafu};
use crate::traversal::post_order;
use crate::tree::{PathNode, PathTree, path};
use crate::vcs::Vcs;

const INDENT: &str = "  ";

/// Prints the stored tree in replay order.
pub async fn run<V: Vcs>(ctx: &CommandContext<'_, V>) -> Result<(), CommandError> {
    ctx.ensure_initialized().await?;

    let tree = ctx
        .isolated(async { ctx.store().load().await.context(StoreSnafu) })
        .await?;

    println!(
        "{} {}",
        ctx.config.tree_file.bold(),
        format!("at {}", tree.source_commit().short()).dimmed()
    );
    for line in render_lines(&tree) {
        println!("{line}");
    }
    Ok(())
}

fn depth(node: &PathNode) -> usize {
    path::ancestors(&node.path).count()
}

fn render_lines(tree: &PathTree) -> Vec<String> {
    post_order(tree)
        .into_iter()
        .map(|node| {
            let name = if node.is_dir {
                format!("{}/", node.name()).blue().bold().to_string()
            } else {
                node.name().to_string()
            };
            let description = if node.has_description() {
                node.description.normal()
            } else {
                node.description.dimmed()
            };
            format!("{}{} - {}", INDENT.repeat(depth(node)), name, description)
        })
        .collect()
}
