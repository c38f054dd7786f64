//! Recording [`combot_core::Bot`] for broadcast tests.
//!
//! Sent messages get sequential ids starting at 100. Sends of configured texts fail, and
//! pinning can be made to fail for every message. Sends can be slowed down to
//! overlap runs.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use combot_core::{Bot, Chat, CombotError, MediaKind, Message, Result, TextFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SendText { text: String, format: TextFormat },
    Pin { message_id: String, silent: bool },
}

#[derive(Default)]
pub struct MockBot {
    failing_sends: HashSet<String>,
    failing_pins: AtomicBool,
    send_delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_send_of(mut self, text: &str) -> Self {
        self.failing_sends.insert(text.to_string());
        self
    }

    /// Every send waits this long before completing.
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }

    pub fn fail_pins(&self, fail: bool) {
        self.failing_pins.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn pinned(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Pin { message_id, .. } => Some(message_id),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn get_administrators(&self, _chat: &Chat) -> Result<HashSet<i64>> {
        Ok(HashSet::new())
    }

    async fn delete_message(&self, _chat: &Chat, _message_id: &str) -> Result<()> {
        Ok(())
    }

    async fn ban(&self, _chat: &Chat, _user_id: i64) -> Result<()> {
        Ok(())
    }

    async fn restrict(&self, _chat: &Chat, _user_id: i64, _until: DateTime<Utc>) -> Result<()> {
        Ok(())
    }

    async fn send_text(&self, _chat: &Chat, text: &str, format: TextFormat) -> Result<String> {
        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_sends.contains(text) {
            return Err(CombotError::Bot(format!("cannot send '{}'", text)));
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push(Call::SendText {
            text: text.to_string(),
            format,
        });
        let sent = calls
            .iter()
            .filter(|c| matches!(c, Call::SendText { .. }))
            .count();
        Ok((99 + sent).to_string())
    }

    async fn reply_to(&self, _message: &Message, _text: &str, _format: TextFormat) -> Result<()> {
        Ok(())
    }

    async fn send_media(
        &self,
        _chat: &Chat,
        _kind: MediaKind,
        _path: &Path,
        _caption: Option<&str>,
    ) -> Result<String> {
        Ok("0".to_string())
    }

    async fn pin(&self, _chat: &Chat, message_id: &str, silent: bool) -> Result<()> {
        if self.failing_pins.load(Ordering::SeqCst) {
            return Err(CombotError::Bot("not enough rights to pin".into()));
        }
        self.calls.lock().unwrap().push(Call::Pin {
            message_id: message_id.to_string(),
            silent,
        });
        Ok(())
    }
}
