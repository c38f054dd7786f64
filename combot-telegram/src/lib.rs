//! # combot-telegram
//!
//! Telegram connectivity for the moderation bot: teloxide → core conversions, the
//! [`combot_core::Bot`] implementation over teloxide, bot config, and the REPL runner that
//! hands every inbound message to the [`moderation::ModerationPipeline`].

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::TelegramConfig;
pub use runner::run_repl;
