//! Per-board pipeline: fetch, filter, render, deliver.

use anyhow::Result;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};

use crate::clickup::{FetchError, TaskClient};
use crate::config::{Board, Config};
use crate::digest;
use crate::telegram::{Notifier, SendError};

#[derive(Debug, Error)]
enum BoardError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Send(#[from] SendError),
}

impl BoardError {
    /// Auth failures are configuration errors and would recur on every
    /// board and every scheduled run, so they abort instead of isolating.
    fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Fetch(FetchError::Auth { .. }) | Self::Send(SendError::Auth { .. })
        )
    }
}

/// Run the digest pipeline over every configured board.
pub async fn run(config: &Config, dry_run: bool) -> Result<()> {
    let tasks = TaskClient::new(&config.clickup_token)?;
    let notifier = Notifier::new(&config.telegram_token, &config.telegram_chat_id)?;
    run_with(config, &tasks, &notifier, dry_run).await
}

/// Pipeline entry with injectable clients; integration tests point these at
/// fixture servers.
pub async fn run_with(
    config: &Config,
    tasks: &TaskClient,
    notifier: &Notifier,
    dry_run: bool,
) -> Result<()> {
    if config.boards.is_empty() {
        info!("no boards configured, nothing to do");
        return Ok(());
    }

    let mut failed = 0;
    for board in &config.boards {
        match process_board(board, config, tasks, notifier, dry_run).await {
            Ok(()) => {}
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                error!(board = %board.id, error = %e, "board digest failed");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} board digests failed", failed, config.boards.len());
    }
    Ok(())
}

async fn process_board(
    board: &Board,
    config: &Config,
    tasks: &TaskClient,
    notifier: &Notifier,
    dry_run: bool,
) -> Result<(), BoardError> {
    // One "today" per pass so every task is judged against the same date.
    let today = Utc::now().with_timezone(&config.timezone).date_naive();

    let raw = tasks.fetch_tasks(&board.id).await?;
    let due = digest::due_today(raw, today, config.timezone);
    let message = digest::render_digest(&board.title, &due, today, config.timezone);
    info!(board = %board.id, due = due.len(), "rendered digest");

    if dry_run {
        println!("{}", message);
        return Ok(());
    }

    notifier.send(&message).await?;
    Ok(())
}
