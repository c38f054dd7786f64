//! Wraps teloxide::Bot and implements [`combot_core::Bot`]. Production code talks to Telegram;
//! tests substitute another Bot impl.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use combot_core::{
    parse_message_id, Bot as CoreBot, Chat, CombotError, MediaKind, Message, Result, TextFormat,
};
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, ChatPermissions, InputFile, MessageId, ParseMode, ReplyParameters, UserId,
};
use tracing::debug;

/// Thin wrapper around teloxide::Bot that implements combot-core's Bot trait.
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

fn bot_error(e: teloxide::RequestError) -> CombotError {
    CombotError::Bot(e.to_string())
}

fn parse_mode(format: TextFormat) -> Option<ParseMode> {
    match format {
        TextFormat::Plain => None,
        TextFormat::Html => Some(ParseMode::Html),
        TextFormat::Markdown => Some(ParseMode::MarkdownV2),
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn get_administrators(&self, chat: &Chat) -> Result<HashSet<i64>> {
        let members = self
            .bot
            .get_chat_administrators(ChatId(chat.id))
            .await
            .map_err(bot_error)?;
        Ok(members.iter().map(|m| m.user.id.0 as i64).collect())
    }

    async fn delete_message(&self, chat: &Chat, message_id: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .delete_message(ChatId(chat.id), MessageId(id))
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn ban(&self, chat: &Chat, user_id: i64) -> Result<()> {
        self.bot
            .ban_chat_member(ChatId(chat.id), UserId(user_id as u64))
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn restrict(&self, chat: &Chat, user_id: i64, until: DateTime<Utc>) -> Result<()> {
        self.bot
            .restrict_chat_member(
                ChatId(chat.id),
                UserId(user_id as u64),
                ChatPermissions::empty(),
            )
            .until_date(until)
            .await
            .map_err(bot_error)?;
        Ok(())
    }

    async fn send_text(&self, chat: &Chat, text: &str, format: TextFormat) -> Result<String> {
        let mut request = self.bot.send_message(ChatId(chat.id), text);
        if let Some(mode) = parse_mode(format) {
            request = request.parse_mode(mode);
        }
        let sent = request.await.map_err(bot_error)?;
        Ok(sent.id.0.to_string())
    }

    async fn reply_to(&self, message: &Message, text: &str, format: TextFormat) -> Result<()> {
        let reply_to = MessageId(parse_message_id(&message.id)?);
        let mut request = self
            .bot
            .send_message(ChatId(message.chat.id), text)
            .reply_parameters(ReplyParameters::new(reply_to));
        if let Some(mode) = parse_mode(format) {
            request = request.parse_mode(mode);
        }
        request.await.map_err(bot_error)?;
        Ok(())
    }

    async fn send_media(
        &self,
        chat: &Chat,
        kind: MediaKind,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<String> {
        let chat_id = ChatId(chat.id);
        let file = InputFile::file(path.to_path_buf());
        let caption = caption.filter(|c| !c.is_empty());
        debug!(chat_id = chat.id, ?kind, path = %path.display(), "Sending media");

        let sent = match kind {
            MediaKind::Animation => {
                let mut request = self.bot.send_animation(chat_id, file);
                if let Some(caption) = caption {
                    request = request.caption(caption);
                }
                request.await
            }
            MediaKind::Image => {
                let mut request = self.bot.send_photo(chat_id, file);
                if let Some(caption) = caption {
                    request = request.caption(caption);
                }
                request.await
            }
            MediaKind::Video => {
                let mut request = self.bot.send_video(chat_id, file);
                if let Some(caption) = caption {
                    request = request.caption(caption);
                }
                request.await
            }
        }
        .map_err(bot_error)?;
        Ok(sent.id.0.to_string())
    }

    async fn pin(&self, chat: &Chat, message_id: &str, silent: bool) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .pin_chat_message(ChatId(chat.id), MessageId(id))
            .disable_notification(silent)
            .await
            .map_err(bot_error)?;
        Ok(())
    }
}
