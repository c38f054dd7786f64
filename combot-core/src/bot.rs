//! Platform abstraction for moderation primitives and outgoing messages.
//!
//! [`Bot`] is transport-agnostic; the Telegram implementation lives in combot-telegram.
//! Message ids are transport-specific strings (Telegram: numeric string).

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{CombotError, Result};
use crate::types::{Chat, MediaKind, Message, TextFormat};

/// Everything the moderation core needs from the chat platform.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Returns the user ids of the chat's administrators.
    async fn get_administrators(&self, chat: &Chat) -> Result<HashSet<i64>>;
    /// Deletes a message from the chat.
    async fn delete_message(&self, chat: &Chat, message_id: &str) -> Result<()>;
    /// Bans a user from the chat.
    async fn ban(&self, chat: &Chat, user_id: i64) -> Result<()>;
    /// Revokes a user's permission to send messages until `until`.
    async fn restrict(&self, chat: &Chat, user_id: i64, until: DateTime<Utc>) -> Result<()>;
    /// Sends a text message and returns its id.
    async fn send_text(&self, chat: &Chat, text: &str, format: TextFormat) -> Result<String>;
    /// Sends a reply to the given message (same chat).
    async fn reply_to(&self, message: &Message, text: &str, format: TextFormat) -> Result<()>;
    /// Sends a media file with an optional caption and returns its id.
    async fn send_media(
        &self,
        chat: &Chat,
        kind: MediaKind,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<String>;
    /// Pins a message; `silent` disables the notification.
    async fn pin(&self, chat: &Chat, message_id: &str, silent: bool) -> Result<()>;
}

/// Parses a message id string into an i32.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| CombotError::Bot(format!("Invalid message_id: {}", s)))
}
