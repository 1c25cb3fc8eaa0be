//! Configuration: secrets from the environment, options from a TOML file.
//!
//! Environment variables (all required):
//! - `CLICKUP_API_KEY` - ClickUp personal token, sent as the Authorization header.
//! - `TELEGRAM_BOT_TOKEN` - Telegram bot credential.
//! - `TELEGRAM_CHAT_ID` - destination chat for the digests.
//!
//! Everything else lives in `config.toml` (default path
//! `<user config dir>/duebot/config.toml`, overridable with `--config`):
//!
//! ```toml
//! timezone = "Asia/Dhaka"
//!
//! [[boards]]
//! id = "901800830748"
//! title = "*Developer Task Board:*"
//! ```

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One ClickUp list to digest, with the heading used in its message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub title: String,
}

/// Non-secret options, as they appear in config.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub boards: Vec<Board>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            boards: Vec::new(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&content).context("Failed to parse config as TOML")
    }

    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not find user config directory")?;
        Ok(dir.join("duebot").join("config.toml"))
    }
}

/// Fully resolved, immutable runtime configuration. Passed explicitly into
/// the pipeline; nothing reads the environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub clickup_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub timezone: Tz,
    pub boards: Vec<Board>,
}

impl Config {
    /// Combine file settings with environment secrets.
    pub fn resolve(settings: Settings) -> Result<Self> {
        let timezone: Tz = settings
            .timezone
            .parse()
            .map_err(|_| anyhow!("Unknown timezone: {}", settings.timezone))?;

        Ok(Self {
            clickup_token: require_env("CLICKUP_API_KEY")?,
            telegram_token: require_env("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: require_env("TELEGRAM_CHAT_ID")?,
            timezone,
            boards: settings.boards,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| anyhow!("Missing required environment variable: {}", name))
}
