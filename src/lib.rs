//! duebot library - daily due-task digests from ClickUp to Telegram

pub mod cli;
pub mod clickup;
pub mod config;
pub mod digest;
pub mod run;
pub mod telegram;
