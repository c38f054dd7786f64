//! The moderation rules, one [`Handler`] each, and the fixed order they run in.
//!
//! Order: minimum length, suspicious identity, multiplication spam, spam exemption,
//! spam burst, ban phrase, mute phrase, delete phrase, filter response. Only the first and
//! the last apply to administrators.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use combot_core::{Handler, HandlerResponse, MessageContext, Result, Verdict};
use handler_chain::HandlerChain;
use regex::Regex;
use tracing::{debug, info};

use crate::config::{format_duration, ModerationConfig};
use crate::spam::SpamDetector;
use crate::store::PhraseStore;

/// Digits next to an `x` ("10x", "x 100"): crypto multiplier bait.
const MULTIPLICATION_PATTERN: &str = r"(?:\d\s*)+x|x\s*(?:\d\s*)+";

/// Builds the chain in its fixed order.
pub fn build_chain(
    store: Arc<PhraseStore>,
    detector: Arc<SpamDetector>,
    config: &ModerationConfig,
) -> Result<HandlerChain> {
    Ok(HandlerChain::new()
        .add_handler(Arc::new(MinimumLengthRule::new(config.min_text_chars)))
        .add_handler(Arc::new(SuspiciousIdentityRule::new(
            config.suspicious_names.clone(),
        )))
        .add_handler(Arc::new(MultiplicationRule::new()?))
        .add_handler(Arc::new(SpamExemptionRule::new(store.clone())))
        .add_handler(Arc::new(SpamRule::new(detector, config)))
        .add_handler(Arc::new(PhraseRule::new(PhraseKind::Ban, store.clone(), config)))
        .add_handler(Arc::new(PhraseRule::new(PhraseKind::Mute, store.clone(), config)))
        .add_handler(Arc::new(PhraseRule::new(PhraseKind::Delete, store.clone(), config)))
        .add_handler(Arc::new(FilterResponseRule::new(store))))
}

/// Deletes texts shorter than `min_chars` after trimming. Applies to everyone.
pub struct MinimumLengthRule {
    min_chars: usize,
}

impl MinimumLengthRule {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

#[async_trait]
impl Handler for MinimumLengthRule {
    fn name(&self) -> &'static str {
        "minimum_length"
    }

    fn applies_to_admins(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &mut MessageContext) -> Result<HandlerResponse> {
        if ctx.text.chars().count() < self.min_chars {
            debug!(user_id = ctx.message.user.id, "Message too short");
            return Ok(HandlerResponse::Stop(Verdict::Delete));
        }
        Ok(HandlerResponse::Continue)
    }
}

/// Bans senders whose name or handle contains an impersonation keyword.
pub struct SuspiciousIdentityRule {
    names: Vec<String>,
}

impl SuspiciousIdentityRule {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names: names.into_iter().map(|n| n.to_lowercase()).collect(),
        }
    }
}

#[async_trait]
impl Handler for SuspiciousIdentityRule {
    fn name(&self) -> &'static str {
        "suspicious_identity"
    }

    async fn handle(&self, ctx: &mut MessageContext) -> Result<HandlerResponse> {
        let user = &ctx.message.user;
        let identity = format!(
            "{} {}",
            user.full_name(),
            user.username.as_deref().unwrap_or_default()
        )
        .to_lowercase();

        match self.names.iter().find(|name| identity.contains(name.as_str())) {
            Some(keyword) => {
                info!(user_id = user.id, keyword = %keyword, "Suspicious identity");
                Ok(HandlerResponse::Stop(Verdict::Ban {
                    user_id: user.id,
                    notice: None,
                }))
            }
            None => Ok(HandlerResponse::Continue),
        }
    }
}

/// Deletes "10x your money" style texts.
pub struct MultiplicationRule {
    pattern: Regex,
}

impl MultiplicationRule {
    pub fn new() -> Result<Self> {
        let pattern =
            Regex::new(MULTIPLICATION_PATTERN).map_err(|source| combot_core::CombotError::Pattern {
                phrase: MULTIPLICATION_PATTERN.to_string(),
                source,
            })?;
        Ok(Self { pattern })
    }
}

#[async_trait]
impl Handler for MultiplicationRule {
    fn name(&self) -> &'static str {
        "multiplication"
    }

    async fn handle(&self, ctx: &mut MessageContext) -> Result<HandlerResponse> {
        if self.pattern.is_match(&ctx.text) {
            info!(user_id = ctx.message.user.id, "Multiplication pattern matched");
            return Ok(HandlerResponse::Stop(Verdict::Delete));
        }
        Ok(HandlerResponse::Continue)
    }
}

/// Marks messages that hit a filter trigger or the whitelist as exempt from spam tracking.
pub struct SpamExemptionRule {
    store: Arc<PhraseStore>,
}

impl SpamExemptionRule {
    pub fn new(store: Arc<PhraseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for SpamExemptionRule {
    fn name(&self) -> &'static str {
        "spam_exemption"
    }

    async fn handle(&self, ctx: &mut MessageContext) -> Result<HandlerResponse> {
        if let Some(entry) = self.store.lookup_filter(&ctx.text) {
            debug!(trigger = %entry.trigger, "Spam check skipped: filter trigger");
            ctx.spam_exempt = true;
        } else if self.store.is_whitelisted(&ctx.text) {
            debug!("Spam check skipped: whitelist");
            ctx.spam_exempt = true;
        }
        Ok(HandlerResponse::Continue)
    }
}

/// Mutes every sender of a text that is being flooded, or was flagged recently.
pub struct SpamRule {
    detector: Arc<SpamDetector>,
    mute_duration: Duration,
    notice: String,
}

impl SpamRule {
    pub fn new(detector: Arc<SpamDetector>, config: &ModerationConfig) -> Self {
        Self {
            detector,
            mute_duration: config.mute_duration,
            notice: config
                .spam_mute_notice
                .replace("{duration}", &format_duration(config.mute_duration)),
        }
    }
}

#[async_trait]
impl Handler for SpamRule {
    fn name(&self) -> &'static str {
        "spam"
    }

    async fn handle(&self, ctx: &mut MessageContext) -> Result<HandlerResponse> {
        if ctx.spam_exempt {
            return Ok(HandlerResponse::Ignore);
        }

        let sender = ctx.message.user.id;
        let mut flagged: BTreeSet<i64> = self.detector.observe(&ctx.text, sender, ctx.now);
        if self.detector.recently_flagged(&ctx.text, ctx.now) {
            flagged.insert(sender);
        }
        if flagged.is_empty() {
            return Ok(HandlerResponse::Continue);
        }

        let user_ids: Vec<i64> = flagged.into_iter().collect();
        let notices = user_ids
            .iter()
            .map(|id| self.notice.replace("{id}", &id.to_string()))
            .collect();
        info!(text = %ctx.text, users = ?user_ids, "Muting spammers");
        Ok(HandlerResponse::Stop(Verdict::MuteMany {
            user_ids,
            until: ctx.message.created_at + self.mute_duration,
            notices,
        }))
    }
}

/// Which block list a [`PhraseRule`] consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseKind {
    Ban,
    Mute,
    Delete,
}

/// Word-bounded block list check.
pub struct PhraseRule {
    kind: PhraseKind,
    store: Arc<PhraseStore>,
    mute_duration: Duration,
    ban_notice: String,
    mute_notice: String,
}

impl PhraseRule {
    pub fn new(kind: PhraseKind, store: Arc<PhraseStore>, config: &ModerationConfig) -> Self {
        Self {
            kind,
            store,
            mute_duration: config.mute_duration,
            ban_notice: config.ban_notice.clone(),
            mute_notice: config
                .mute_notice
                .replace("{duration}", &format_duration(config.mute_duration)),
        }
    }
}

#[async_trait]
impl Handler for PhraseRule {
    fn name(&self) -> &'static str {
        match self.kind {
            PhraseKind::Ban => "ban_phrase",
            PhraseKind::Mute => "mute_phrase",
            PhraseKind::Delete => "delete_phrase",
        }
    }

    async fn handle(&self, ctx: &mut MessageContext) -> Result<HandlerResponse> {
        let list = match self.kind {
            PhraseKind::Ban => &self.store.ban,
            PhraseKind::Mute => &self.store.mute,
            PhraseKind::Delete => &self.store.delete,
        };
        let Some(phrase) = list.first_match(&ctx.text) else {
            return Ok(HandlerResponse::Continue);
        };

        let user = &ctx.message.user;
        info!(
            rule = self.name(),
            phrase = %phrase,
            user_id = user.id,
            "Phrase matched"
        );
        let verdict = match self.kind {
            PhraseKind::Ban => Verdict::Ban {
                user_id: user.id,
                notice: Some(self.ban_notice.replace("{name}", &user.display_name())),
            },
            PhraseKind::Mute => Verdict::Mute {
                user_id: user.id,
                until: ctx.message.created_at + self.mute_duration,
                notice: self.mute_notice.replace("{name}", &user.display_name()),
            },
            PhraseKind::Delete => Verdict::Delete,
        };
        Ok(HandlerResponse::Stop(verdict))
    }
}

/// Answers the first matching filter trigger. Applies to everyone.
pub struct FilterResponseRule {
    store: Arc<PhraseStore>,
}

impl FilterResponseRule {
    pub fn new(store: Arc<PhraseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Handler for FilterResponseRule {
    fn name(&self) -> &'static str {
        "filter_response"
    }

    fn applies_to_admins(&self) -> bool {
        true
    }

    async fn handle(&self, ctx: &mut MessageContext) -> Result<HandlerResponse> {
        match self.store.lookup_filter(&ctx.text) {
            Some(entry) => {
                debug!(trigger = %entry.trigger, "Filter matched");
                Ok(HandlerResponse::Stop(Verdict::Respond(
                    entry.reply(&self.store.media_dir),
                )))
            }
            None => Ok(HandlerResponse::Continue),
        }
    }
}
