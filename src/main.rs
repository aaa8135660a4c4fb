use clap::Parser;
use log::*;

mod changelog;
mod cli;
mod command;
mod config;
mod error;
mod forge;
mod notify;
mod result;

use crate::{
    config::Config, forge::github::Github, notify::DiscordNotifier,
    result::Result,
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("changelog_herald")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    initialize_logger(cli_args.debug)?;

    let config = Config::from_env()?;

    let Some(webhook_url) = config.webhook_url.clone() else {
        info!("DISCORD_WEBHOOK_URL not set: nothing to do");
        return Ok(());
    };

    let forge = Github::new(&config)?;
    let notifier = DiscordNotifier::new(webhook_url);

    command::execute(&config, &forge, &notifier).await
}
