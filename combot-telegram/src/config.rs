//! Telegram connection settings: token, moderated group, optional API url, log path.
//! Loaded from BOT_TOKEN, GROUP_CHAT_ID, TELEGRAM_API_URL (or TELOXIDE_API_URL), LOG_FILE.

use anyhow::{Context, Result};
use std::env;
use tracing::error;

/// Default log file when LOG_FILE is unset.
pub const DEFAULT_LOG_FILE: &str = "logs/combot.log";

pub struct TelegramConfig {
    pub bot_token: String,
    /// Target of scheduled broadcasts; required by `run`.
    pub group_chat_id: Option<i64>,
    pub telegram_api_url: Option<String>,
    pub log_file: String,
}

impl TelegramConfig {
    /// BOT_TOKEN is required (unless `token` overrides it); the rest are optional.
    pub fn from_env(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let group_chat_id = env::var("GROUP_CHAT_ID")
            .ok()
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .with_context(|| format!("GROUP_CHAT_ID is not a chat id: {}", raw))
            })
            .transpose()?;
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        Ok(Self {
            bot_token,
            group_chat_id,
            telegram_api_url,
            log_file,
        })
    }

    /// Uses the given token; everything else at defaults.
    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            group_chat_id: None,
            telegram_api_url: None,
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }

    /// Builds the teloxide Bot, pointing it at the custom API url when one is set.
    pub fn build_bot(&self) -> teloxide::Bot {
        let bot = teloxide::Bot::new(self.bot_token.clone());
        match &self.telegram_api_url {
            Some(url_str) => match reqwest::Url::parse(url_str) {
                Ok(url) => bot.set_api_url(url),
                Err(e) => {
                    error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                    bot
                }
            },
            None => bot,
        }
    }
}
