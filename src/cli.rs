//! Command-line definition

use clap::Parser;
use std::path::PathBuf;

/// Post a digest of the ClickUp tasks due today to Telegram, one message
/// per configured board. Intended to be run once a day from cron.
#[derive(Debug, Parser)]
#[command(name = "duebot", version, about)]
pub struct Cli {
    /// Path to the config file (defaults to <config dir>/duebot/config.toml)
    #[arg(long, env = "DUEBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the rendered digests to stdout instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}
