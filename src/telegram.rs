//! Telegram notification sink

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SEND_ATTEMPTS: u32 = 3;
const RETRY_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Telegram rejected the bot token (HTTP {status}); check TELEGRAM_BOT_TOKEN")]
    Auth { status: StatusCode },

    #[error("Telegram returned HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("Telegram request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl SendError {
    /// Transient failures worth another attempt. Auth and other 4xx
    /// responses will not change on retry.
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status, .. } => status.is_server_error(),
            Self::Auth { .. } => false,
        }
    }
}

/// Delivers digest messages to one Telegram chat via the Bot API.
pub struct Notifier {
    client: reqwest::Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl Notifier {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, SendError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("duebot/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: TELEGRAM_API_URL.to_string(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        })
    }

    /// Point the notifier at a different API root. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Deliver one message, retrying transient failures within a small
    /// fixed budget.
    pub async fn send(&self, text: &str) -> Result<(), SendError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_send(text).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < SEND_ATTEMPTS && e.is_retryable() => {
                    warn!(attempt, error = %e, "digest delivery failed, retrying");
                    tokio::time::sleep(RETRY_PAUSE).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_send(&self, text: &str) -> Result<(), SendError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let params = [
            ("chat_id", self.chat_id.as_str()),
            ("text", text),
            ("parse_mode", "Markdown"),
        ];

        let response = self.client.post(&url).form(&params).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SendError::Auth { status });
        }
        if !status.is_success() {
            return Err(SendError::Http { status, body });
        }

        debug!(%status, body = %body, "Telegram acknowledged message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_retryable() {
        let err = SendError::Http {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let err = SendError::Http {
            status: StatusCode::BAD_REQUEST,
            body: String::new(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_auth_errors_are_not_retryable() {
        let err = SendError::Auth {
            status: StatusCode::UNAUTHORIZED,
        };
        assert!(!err.is_retryable());
    }
}
