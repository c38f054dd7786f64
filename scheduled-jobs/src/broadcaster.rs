//! Scheduled broadcasts into the group chat: a rotating security announcement and the
//! brand-asset set. Every message is HTML-formatted and pinned without notification.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use combot_core::{Bot, Chat, CombotError, Result, TextFormat};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::job::Job;

/// Sends `text` as HTML and pins it silently. A pin failure is logged; the send still counts.
async fn send_and_pin(bot: &dyn Bot, chat: &Chat, text: &str) -> Result<String> {
    let message_id = bot.send_text(chat, text, TextFormat::Html).await?;
    if let Err(e) = bot.pin(chat, &message_id, true).await {
        warn!(error = %e, chat_id = chat.id, message_id = %message_id, "Failed to pin message");
    }
    Ok(message_id)
}

/// Posts the next announcement of a fixed rotation each time it runs.
pub struct SecurityBroadcaster {
    bot: Arc<dyn Bot>,
    chat: Chat,
    messages: Vec<String>,
    next_index: Mutex<usize>,
    running: tokio::sync::Mutex<()>,
}

impl SecurityBroadcaster {
    /// Fails when `messages` is empty.
    pub fn new(bot: Arc<dyn Bot>, chat: Chat, messages: Vec<String>) -> Result<Self> {
        if messages.is_empty() {
            return Err(CombotError::Config(
                "security announcement rotation is empty".into(),
            ));
        }
        Ok(Self {
            bot,
            chat,
            messages,
            next_index: Mutex::new(0),
            running: tokio::sync::Mutex::new(()),
        })
    }

    /// Index of the announcement the next run will post.
    pub fn next_index(&self) -> usize {
        *self.next_index.lock()
    }

    /// Posts the current announcement; the rotation advances only if the send succeeded.
    /// A call that overlaps a run still in progress is skipped.
    pub async fn post_next(&self) -> Result<()> {
        let Ok(_running) = self.running.try_lock() else {
            warn!("Security broadcast already running, skipping");
            return Ok(());
        };

        let index = *self.next_index.lock();
        let text = &self.messages[index];
        let message_id = send_and_pin(self.bot.as_ref(), &self.chat, text).await?;

        let mut next = self.next_index.lock();
        *next = (index + 1) % self.messages.len();
        info!(index, message_id = %message_id, "Security announcement posted");
        Ok(())
    }
}

#[async_trait]
impl Job for SecurityBroadcaster {
    fn name(&self) -> &'static str {
        "security_broadcast"
    }

    async fn run(&self, _now: DateTime<Utc>) -> Result<()> {
        self.post_next().await
    }
}

/// Posts every brand asset, in order, each pinned on its own.
pub struct BrandAssetsBroadcaster {
    bot: Arc<dyn Bot>,
    chat: Chat,
    messages: Vec<String>,
}

impl BrandAssetsBroadcaster {
    pub fn new(bot: Arc<dyn Bot>, chat: Chat, messages: Vec<String>) -> Self {
        Self {
            bot,
            chat,
            messages,
        }
    }

    /// Sends the whole set; returns how many were sent. Failures skip only that message.
    pub async fn post_all(&self) -> usize {
        let mut sent = 0;
        for (index, text) in self.messages.iter().enumerate() {
            match send_and_pin(self.bot.as_ref(), &self.chat, text).await {
                Ok(_) => sent += 1,
                Err(e) => warn!(error = %e, index, "Failed to post brand asset"),
            }
        }
        info!(sent, total = self.messages.len(), "Brand assets posted");
        sent
    }
}

#[async_trait]
impl Job for BrandAssetsBroadcaster {
    fn name(&self) -> &'static str {
        "brand_assets"
    }

    async fn run(&self, _now: DateTime<Utc>) -> Result<()> {
        self.post_all().await;
        Ok(())
    }
}
