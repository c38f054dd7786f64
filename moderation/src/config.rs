//! Moderation tunables and table locations, loaded from environment variables with defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;
use combot_core::{CombotError, Result};

/// Substrings that get an account banned on sight when found in its name or handle.
pub const DEFAULT_SUSPICIOUS_NAMES: &[&str] = &[
    "dev",
    "developer",
    "admin",
    "mod",
    "owner",
    "arc",
    "arc_agent",
    "arc agent",
    "arch_agent",
    "arch agent",
    "support",
    "helpdesk",
    "administrator",
    "arc admin",
    "arc_admin",
];

/// Tunables for the classification pipeline and spam detector.
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    /// Identical texts within `spam_window` that flag a burst.
    pub spam_threshold: usize,
    pub spam_window: Duration,
    /// How long a flagged text keeps catching new senders.
    pub flag_retention: Duration,
    pub mute_duration: Duration,
    /// Shorter trimmed texts are deleted.
    pub min_text_chars: usize,
    pub suspicious_names: Vec<String>,
    /// `{name}` is replaced with the sender's display name.
    pub ban_notice: String,
    /// `{name}` is replaced with the sender's display name, `{duration}` with the mute length.
    pub mute_notice: String,
    /// `{id}` is replaced with the muted user id, `{duration}` with the mute length.
    pub spam_mute_notice: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            spam_threshold: 3,
            spam_window: Duration::seconds(15),
            flag_retention: Duration::minutes(5),
            mute_duration: Duration::days(3),
            min_text_chars: 2,
            suspicious_names: DEFAULT_SUSPICIOUS_NAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ban_notice: "arc angel fallen. {name} has been banned.".to_string(),
            mute_notice: "{name} has been muted for {duration}.".to_string(),
            spam_mute_notice: "User {id} has been muted for {duration}.".to_string(),
        }
    }
}

impl ModerationConfig {
    /// Defaults overridden by `SPAM_THRESHOLD`, `SPAM_WINDOW_SECS`, `SPAM_FLAG_RETENTION_SECS`,
    /// `MUTE_DURATION_SECS`. A present but unparsable value is a config error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(threshold) = parse_env::<usize>("SPAM_THRESHOLD")? {
            if threshold == 0 {
                return Err(CombotError::Config("SPAM_THRESHOLD must be at least 1".into()));
            }
            config.spam_threshold = threshold;
        }
        if let Some(secs) = parse_env::<i64>("SPAM_WINDOW_SECS")? {
            config.spam_window = Duration::seconds(secs);
        }
        if let Some(secs) = parse_env::<i64>("SPAM_FLAG_RETENTION_SECS")? {
            config.flag_retention = Duration::seconds(secs);
        }
        if let Some(secs) = parse_env::<i64>("MUTE_DURATION_SECS")? {
            config.mute_duration = Duration::seconds(secs);
        }
        Ok(config)
    }
}

/// Mute length as written in notices: the largest whole unit ("3 days", "1 hour", "90 seconds").
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();
    let (count, unit) = [(86_400, "day"), (3_600, "hour"), (60, "minute")]
        .into_iter()
        .find(|(unit_secs, _)| secs >= *unit_secs && secs % unit_secs == 0)
        .map(|(unit_secs, unit)| (secs / unit_secs, unit))
        .unwrap_or((secs, "second"));
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Where the persisted moderation tables live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub filters_file: PathBuf,
    pub media_dir: PathBuf,
    pub ban_phrases_file: PathBuf,
    pub mute_phrases_file: PathBuf,
    pub delete_phrases_file: PathBuf,
    pub whitelist_file: PathBuf,
}

impl Default for StorePaths {
    fn default() -> Self {
        Self {
            filters_file: "filters/filters.json".into(),
            media_dir: "media".into(),
            ban_phrases_file: "blocklists/ban_phrases.txt".into(),
            mute_phrases_file: "blocklists/mute_phrases.txt".into(),
            delete_phrases_file: "blocklists/delete_phrases.txt".into(),
            whitelist_file: "whitelists/whitelist_phrases.txt".into(),
        }
    }
}

impl StorePaths {
    /// Defaults overridden by `FILTERS_FILE`, `MEDIA_DIR`, `BAN_PHRASES_FILE`,
    /// `MUTE_PHRASES_FILE`, `DELETE_PHRASES_FILE`, `WHITELIST_PHRASES_FILE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let path = |key: &str, default: PathBuf| env::var(key).map(PathBuf::from).unwrap_or(default);
        Self {
            filters_file: path("FILTERS_FILE", defaults.filters_file),
            media_dir: path("MEDIA_DIR", defaults.media_dir),
            ban_phrases_file: path("BAN_PHRASES_FILE", defaults.ban_phrases_file),
            mute_phrases_file: path("MUTE_PHRASES_FILE", defaults.mute_phrases_file),
            delete_phrases_file: path("DELETE_PHRASES_FILE", defaults.delete_phrases_file),
            whitelist_file: path("WHITELIST_PHRASES_FILE", defaults.whitelist_file),
        }
    }
}

fn parse_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CombotError::Config(format!("{} has invalid value '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}
