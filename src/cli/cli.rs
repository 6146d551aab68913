use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Describe every path of a repository in its git history")]
pub struct Cli {
    #[command(subcommand)]
    pub action: Action,

    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// The root directory of the repository
    #[clap(long, short, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Tree file name, relative to the root
    #[clap(long, global = true)]
    pub tree_file: Option<String>,

    /// Branch holding the tree file and description commits
    #[clap(long, global = true)]
    pub metadata_branch: Option<String>,

    /// Branch whose structure is described
    #[clap(long, global = true)]
    pub main_branch: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Record the main branch's structure on a new metadata branch
    Init,
    /// Bring the tree file up to date with the main branch
    #[command(alias = "update")]
    Sync,
    /// Set the description of a file or directory
    Desc { path: String, description: String },
    /// Replay every description as a commit on the metadata branch
    Commit {
        /// Only replay this path
        #[arg(long)]
        path: Option<String>,
    },
    /// Print the stored tree
    Show,
    /// Delete the metadata branch
    Clean,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Init => "init",
            Action::Sync => "sync",
            Action::Desc { .. } => "desc",
            Action::Commit { .. } => "commit",
            Action::Show => "show",
            Action::Clean => "clean",
        }
    }
}
