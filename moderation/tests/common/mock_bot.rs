//! Mock implementation of [`combot_core::Bot`] for integration tests.
//!
//! Records every platform call so tests can assert on exactly which moderation
//! primitives a message triggered, without talking to Telegram.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use combot_core::{Bot, Chat, CombotError, MediaKind, Message, Result, TextFormat};

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Delete { message_id: String },
    Ban { user_id: i64 },
    Restrict { user_id: i64, until: DateTime<Utc> },
    SendText { text: String, format: TextFormat },
    Reply { text: String, format: TextFormat },
    SendMedia { kind: MediaKind, caption: Option<String> },
    Pin { message_id: String, silent: bool },
}

pub struct MockBot {
    admins: HashSet<i64>,
    /// Users whose restrict call fails.
    failing_restrict: HashSet<i64>,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl MockBot {
    pub fn new() -> Self {
        Self::with_admins([])
    }

    pub fn with_admins(admins: impl IntoIterator<Item = i64>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
            failing_restrict: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_restrict_for(mut self, user_id: i64) -> Self {
        self.failing_restrict.insert(user_id);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn get_administrators(&self, _chat: &Chat) -> Result<HashSet<i64>> {
        Ok(self.admins.clone())
    }

    async fn delete_message(&self, _chat: &Chat, message_id: &str) -> Result<()> {
        self.record(Call::Delete {
            message_id: message_id.to_string(),
        });
        Ok(())
    }

    async fn ban(&self, _chat: &Chat, user_id: i64) -> Result<()> {
        self.record(Call::Ban { user_id });
        Ok(())
    }

    async fn restrict(&self, _chat: &Chat, user_id: i64, until: DateTime<Utc>) -> Result<()> {
        if self.failing_restrict.contains(&user_id) {
            return Err(CombotError::Bot(format!("cannot restrict {}", user_id)));
        }
        self.record(Call::Restrict { user_id, until });
        Ok(())
    }

    async fn send_text(&self, _chat: &Chat, text: &str, format: TextFormat) -> Result<String> {
        self.record(Call::SendText {
            text: text.to_string(),
            format,
        });
        Ok("1".to_string())
    }

    async fn reply_to(&self, _message: &Message, text: &str, format: TextFormat) -> Result<()> {
        self.record(Call::Reply {
            text: text.to_string(),
            format,
        });
        Ok(())
    }

    async fn send_media(
        &self,
        _chat: &Chat,
        kind: MediaKind,
        _path: &Path,
        caption: Option<&str>,
    ) -> Result<String> {
        self.record(Call::SendMedia {
            kind,
            caption: caption.map(str::to_string),
        });
        Ok("2".to_string())
    }

    async fn pin(&self, _chat: &Chat, message_id: &str, silent: bool) -> Result<()> {
        self.record(Call::Pin {
            message_id: message_id.to_string(),
            silent,
        });
        Ok(())
    }
}
