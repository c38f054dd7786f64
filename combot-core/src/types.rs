//! Core types: user, chat, message, verdicts, and the Handler trait run by the chain.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identity (id, handle, names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// First and last name joined by a space; empty parts are skipped.
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Name used in notices: first name, then handle, then numeric id.
    pub fn display_name(&self) -> String {
        self.first_name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Chat (group, channel or private) identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}

/// A single inbound message. `content` is the raw text; `None` for non-text messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Lower-cased, trimmed text, or `None` when the message carries no text.
    pub fn normalized_text(&self) -> Option<String> {
        self.content.as_deref().map(normalize)
    }
}

/// Lower-cases and trims; the one normalization shared by messages, phrases and triggers.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Kind of media attached to a filter response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Animation,
    Image,
    Video,
}

/// Formatting applied to outgoing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Html,
    Markdown,
}

/// Media file sent as a filter response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    pub path: PathBuf,
}

/// What a matched filter sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterReply {
    pub trigger: String,
    pub text: Option<String>,
    pub media: Option<MediaAttachment>,
}

/// The single terminal outcome chosen for a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing to do.
    Allow,
    /// Message stays; a filter response is sent.
    Respond(FilterReply),
    /// Delete the message.
    Delete,
    /// Ban the sender; `notice` is replied to the message when present.
    Ban {
        user_id: i64,
        notice: Option<String>,
    },
    /// Mute the sender until `until`; `notice` is replied to the message.
    Mute {
        user_id: i64,
        until: DateTime<Utc>,
        notice: String,
    },
    /// Mute every flagged sender; one confirmation is sent per user.
    MuteMany {
        user_ids: Vec<i64>,
        until: DateTime<Utc>,
        notices: Vec<String>,
    },
}

impl Verdict {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Verdict::Allow => "allow",
            Verdict::Respond(_) => "respond",
            Verdict::Delete => "delete",
            Verdict::Ban { .. } => "ban",
            Verdict::Mute { .. } => "mute",
            Verdict::MuteMany { .. } => "mute_many",
        }
    }
}

/// Per-message state threaded through the chain.
#[derive(Debug, Clone)]
pub struct MessageContext {
    pub message: Message,
    /// Normalized text; empty string when the message has no text.
    pub text: String,
    pub is_admin: bool,
    /// Set once the message matched a filter trigger or the whitelist.
    pub spam_exempt: bool,
    /// Clock reading used by every time-dependent rule for this message.
    pub now: DateTime<Utc>,
}

impl MessageContext {
    /// Builds the context; `administrators` is the chat's admin id set.
    pub fn new(message: Message, administrators: &HashSet<i64>, now: DateTime<Utc>) -> Self {
        let text = message.normalized_text().unwrap_or_default();
        let is_admin = administrators.contains(&message.user.id);
        Self {
            message,
            text,
            is_admin,
            spam_exempt: false,
            now,
        }
    }
}

/// Handler result for the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Handler does not apply to this message, try next.
    Ignore,
    /// Stop the chain with a terminal verdict.
    Stop(Verdict),
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific message type to core [`Message`].
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}

/// One ordered rule of the moderation chain.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the rule also runs for chat administrators. Default: no.
    fn applies_to_admins(&self) -> bool {
        false
    }

    /// Evaluates the rule. Return `Stop` to end the chain with a verdict.
    async fn handle(&self, ctx: &mut MessageContext) -> crate::error::Result<HandlerResponse>;
}
