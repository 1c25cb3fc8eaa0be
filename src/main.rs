//! duebot - posts a per-board digest of ClickUp tasks due today to Telegram

use anyhow::Result;
use clap::Parser;
use duebot::cli::Cli;
use duebot::config::{Config, Settings};
use duebot::run;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "duebot=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Settings::default_path()?,
    };
    let settings = Settings::load(&config_path)?;
    let config = Config::resolve(settings)?;

    info!(
        boards = config.boards.len(),
        timezone = %config.timezone,
        "sending today's task summaries"
    );
    run::run(&config, cli.dry_run).await
}
