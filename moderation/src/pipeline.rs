//! Classification pipeline: fetches the chat's administrators, runs the rule chain, and
//! applies the resulting verdict through the platform [`Bot`].
//!
//! No internal lock is held while a platform call is in flight: the spam detector's locks
//! are released inside `observe` / `recently_flagged` before the chain returns.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use combot_core::{Bot, FilterReply, Message, MessageContext, Result, TextFormat, Verdict};
use handler_chain::HandlerChain;
use tracing::{error, info, instrument, warn};

use crate::config::ModerationConfig;
use crate::listing::{filter_listing, is_filters_command};
use crate::rules::build_chain;
use crate::spam::SpamDetector;
use crate::store::PhraseStore;

pub struct ModerationPipeline {
    bot: Arc<dyn Bot>,
    chain: HandlerChain,
    store: Arc<PhraseStore>,
    detector: Arc<SpamDetector>,
}

impl ModerationPipeline {
    pub fn new(
        bot: Arc<dyn Bot>,
        store: Arc<PhraseStore>,
        detector: Arc<SpamDetector>,
        config: &ModerationConfig,
    ) -> Result<Self> {
        let chain = build_chain(store.clone(), detector.clone(), config)?;
        Ok(Self {
            bot,
            chain,
            store,
            detector,
        })
    }

    /// Shared detector, for the maintenance sweeper.
    pub fn detector(&self) -> Arc<SpamDetector> {
        self.detector.clone()
    }

    pub fn store(&self) -> &PhraseStore {
        &self.store
    }

    /// Entry point for every inbound message: answers `/filters`, moderates everything else.
    pub async fn dispatch(&self, message: &Message) -> Result<()> {
        if message.content.as_deref().is_some_and(is_filters_command) {
            return self.send_filter_listing(message).await;
        }
        self.process(message).await.map(|_| ())
    }

    /// Classifies and acts on one message using the current time.
    pub async fn process(&self, message: &Message) -> Result<Verdict> {
        self.process_at(message, Utc::now()).await
    }

    /// Classifies and acts on one message as of `now`.
    #[instrument(skip(self, message), fields(message_id = %message.id, user_id = message.user.id))]
    pub async fn process_at(&self, message: &Message, now: DateTime<Utc>) -> Result<Verdict> {
        if message.content.is_none() {
            return Ok(Verdict::Allow);
        }

        let administrators = self.bot.get_administrators(&message.chat).await?;
        let verdict = self.classify(message, &administrators, now).await?;
        info!(verdict = verdict.kind(), "Message classified");
        self.apply(message, &verdict).await;
        Ok(verdict)
    }

    /// Runs the rule chain without touching the platform.
    pub async fn classify(
        &self,
        message: &Message,
        administrators: &HashSet<i64>,
        now: DateTime<Utc>,
    ) -> Result<Verdict> {
        let mut ctx = MessageContext::new(message.clone(), administrators, now);
        self.chain.handle(&mut ctx).await
    }

    /// Applies a verdict. Platform failures are logged, never returned.
    pub async fn apply(&self, message: &Message, verdict: &Verdict) {
        let chat = &message.chat;
        match verdict {
            Verdict::Allow => {}
            Verdict::Respond(reply) => self.send_filter_reply(message, reply).await,
            Verdict::Delete => {
                if let Err(e) = self.bot.delete_message(chat, &message.id).await {
                    error!(error = %e, chat_id = chat.id, "Failed to delete message");
                }
            }
            Verdict::Ban { user_id, notice } => {
                if let Err(e) = self.bot.ban(chat, *user_id).await {
                    error!(error = %e, user_id, "Failed to ban user");
                    return;
                }
                if let Some(notice) = notice {
                    self.reply(message, notice).await;
                }
            }
            Verdict::Mute {
                user_id,
                until,
                notice,
            } => {
                if let Err(e) = self.bot.restrict(chat, *user_id, *until).await {
                    error!(error = %e, user_id, "Failed to mute user");
                    return;
                }
                self.reply(message, notice).await;
            }
            Verdict::MuteMany {
                user_ids,
                until,
                notices,
            } => {
                for (user_id, notice) in user_ids.iter().zip(notices) {
                    if let Err(e) = self.bot.restrict(chat, *user_id, *until).await {
                        warn!(error = %e, user_id, "Failed to mute spammer");
                        continue;
                    }
                    if let Err(e) = self.bot.send_text(chat, notice, TextFormat::Plain).await {
                        warn!(error = %e, user_id, "Failed to send mute confirmation");
                    }
                    info!(user_id, "Muted user for spam message");
                }
            }
        }
    }

    async fn send_filter_reply(&self, message: &Message, reply: &FilterReply) {
        if let Some(media) = &reply.media {
            let caption = reply.text.as_deref();
            if let Err(e) = self
                .bot
                .send_media(&message.chat, media.kind, &media.path, caption)
                .await
            {
                error!(error = %e, trigger = %reply.trigger, "Failed to send filter media");
            }
        } else if let Some(text) = &reply.text {
            self.reply(message, text).await;
        }
    }

    async fn reply(&self, message: &Message, text: &str) {
        if let Err(e) = self.bot.reply_to(message, text, TextFormat::Plain).await {
            error!(error = %e, chat_id = message.chat.id, "Failed to send reply");
        }
    }

    /// Sends the sorted trigger listing as one or more Markdown replies.
    pub async fn send_filter_listing(&self, message: &Message) -> Result<()> {
        let chunks = filter_listing(self.store.filters.triggers());
        info!(chunks = chunks.len(), "Sending filter listing");
        for chunk in chunks {
            self.bot
                .reply_to(message, &chunk, TextFormat::Markdown)
                .await?;
        }
        Ok(())
    }
}
