#![allow(clippy::enum_variant_names)]

use clap::Parser as _;
use supports_color::Stream;
use tracing::debug;

use crate::{
    application::{Application, ApplicationError},
    cli::Cli,
};

mod application;
mod branch;
mod cli;
mod commands;
mod config;
mod ext;
mod replay;
mod store;
mod sync;
mod traversal;
mod tree;
mod vcs;

#[compio::main]
#[snafu::report]
async fn main() -> Result<(), ApplicationError> {
    let cli_args = Cli::parse();
    setup_tracing(&cli_args);
    setup_colors();
    debug!("Parsed CLI arguments: {cli_args:?}");

    Application::run(cli_args).await?;

    Ok(())
}

fn setup_tracing(cli_args: &Cli) {
    if let Some(level) = cli_args.log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .without_time()
            .compact()
            .init();
    }
}

fn setup_colors() {
    colored::control::set_override(supports_color::on(Stream::Stdout).is_some());
}
