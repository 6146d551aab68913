use snafu::Snafu;
use snafu::prelude::*;
use tracing::debug;

use crate::application::RuntimeConfig;
use crate::cli::{Action, Cli};
use crate::commands::{self, CommandContext, CommandError};
use crate::config::{Settings, SettingsError};
use crate::vcs::GitCli;

pub struct Application;

impl Application {
    pub async fn run(cli: Cli) -> Result<(), ApplicationError> {
        let settings = Settings::read(&cli.root).await.context(SettingsSnafu)?;
        let runtime_config = RuntimeConfig::from((&cli, &settings));
        debug!("Runtime config: {:?}", runtime_config);

        let vcs = GitCli::new(&runtime_config.root);
        let ctx = CommandContext::new(&vcs, &runtime_config);

        match &cli.action {
            Action::Init => commands::init::run(&ctx).await,
            Action::Sync => commands::sync::run(&ctx).await,
            Action::Desc { path, description } => {
                commands::desc::run(&ctx, path, description).await
            }
            Action::Commit { path } => commands::commit::run(&ctx, path.as_deref()).await,
            Action::Show => commands::show::run(&ctx).await,
            Action::Clean => commands::clean::run(&ctx).await,
        }
        .context(CommandSnafu {
            action: cli.action.name(),
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    SettingsError { source: SettingsError },
    #[snafu(display("`gittier {}` failed", action))]
    CommandError {
        action: &'static str,
        source: CommandError,
    },
}
