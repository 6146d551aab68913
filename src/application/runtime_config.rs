use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::Settings;

/// Effective configuration: CLI flags over `gittier.yaml` over built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub tree_file: String,
    pub metadata_branch: String,
    pub main_branch: String,
}

impl From<(&Cli, &Settings)> for RuntimeConfig {
    fn from((cli, settings): (&Cli, &Settings)) -> Self {
        Self {
            root: cli.root.clone(),
            tree_file: cli
                .tree_file
                .clone()
                .unwrap_or_else(|| settings.tree_file().to_string()),
            metadata_branch: cli
                .metadata_branch
                .clone()
                .unwrap_or_else(|| settings.metadata_branch().to_string()),
            main_branch: cli
                .main_branch
                .clone()
                .unwrap_or_else(|| settings.main_branch().to_string()),
        }
    }
}
