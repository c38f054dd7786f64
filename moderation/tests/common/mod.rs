//! Shared fixtures for moderation integration tests.

pub mod mock_bot;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use combot_core::{Chat, Message, User};
use moderation::{
    FilterEntry, FilterTable, ModerationConfig, ModerationPipeline, PhraseList, PhraseStore,
    SpamDetector, Whitelist,
};

use mock_bot::MockBot;

#[allow(dead_code)]
pub const CHAT_ID: i64 = -100_123;

/// Fixed clock origin so window arithmetic is exact.
#[allow(dead_code)]
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// Message from `user_id` named `first_name`, sent at `at(secs)`.
#[allow(dead_code)]
pub fn message(user_id: i64, first_name: &str, text: Option<&str>, secs: i64) -> Message {
    Message {
        id: format!("{}-{}", user_id, secs),
        user: User {
            id: user_id,
            username: Some(format!("{}_handle", first_name.to_lowercase())),
            first_name: Some(first_name.to_string()),
            last_name: None,
        },
        chat: Chat {
            id: CHAT_ID,
            chat_type: "supergroup".to_string(),
        },
        content: text.map(str::to_string),
        created_at: at(secs),
    }
}

/// Tables used across pipeline tests.
#[allow(dead_code)]
pub fn test_store() -> PhraseStore {
    PhraseStore {
        filters: FilterTable::new(vec![
            FilterEntry::new("rules", Some("See pinned message.".into()), None, None).unwrap(),
            FilterEntry::new("/ca", Some("Contract: 0xabc".into()), None, None).unwrap(),
        ])
        .unwrap(),
        ban: PhraseList::new(["scam", "wallet drainer"]).unwrap(),
        mute: PhraseList::new(["scam", "shill"]).unwrap(),
        delete: PhraseList::new(["pump"]).unwrap(),
        whitelist: Whitelist::new(["gm", "good morning"]),
        media_dir: "media".into(),
    }
}

/// Pipeline over [`test_store`] with default tunables.
#[allow(dead_code)]
pub fn pipeline(bot: Arc<MockBot>) -> ModerationPipeline {
    let config = ModerationConfig::default();
    let detector = Arc::new(SpamDetector::from_config(&config));
    ModerationPipeline::new(bot, Arc::new(test_store()), detector, &config).unwrap()
}
