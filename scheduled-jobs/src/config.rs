//! Timer settings and broadcast content locations.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use combot_core::{CombotError, Result};
use tracing::info;

use crate::job::Schedule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub security_messages_file: PathBuf,
    pub brand_assets_file: PathBuf,
    pub security_interval: Duration,
    /// UTC times of day for the brand-asset run.
    pub brand_asset_times: Vec<NaiveTime>,
    pub sweep_interval: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            security_messages_file: "content/security_messages.json".into(),
            brand_assets_file: "content/brand_assets.json".into(),
            security_interval: Duration::from_secs(4 * 60 * 60),
            brand_asset_times: vec![
                NaiveTime::from_hms_opt(5, 0, 0).unwrap_or_default(),
                NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            ],
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl ScheduleConfig {
    /// Defaults overridden by `SECURITY_MESSAGES_FILE`, `BRAND_ASSETS_FILE`,
    /// `SECURITY_INTERVAL_SECS`, `BRAND_ASSET_TIMES` (`HH:MM,HH:MM`), `SWEEP_INTERVAL_SECS`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(path) = env::var("SECURITY_MESSAGES_FILE") {
            config.security_messages_file = path.into();
        }
        if let Ok(path) = env::var("BRAND_ASSETS_FILE") {
            config.brand_assets_file = path.into();
        }
        if let Some(secs) = secs_from_env("SECURITY_INTERVAL_SECS")? {
            config.security_interval = secs;
        }
        if let Ok(raw) = env::var("BRAND_ASSET_TIMES") {
            config.brand_asset_times = parse_times(&raw)?;
        }
        if let Some(secs) = secs_from_env("SWEEP_INTERVAL_SECS")? {
            config.sweep_interval = secs;
        }
        Ok(config)
    }

    /// Security announcements start immediately, then repeat.
    pub fn security_schedule(&self) -> Schedule {
        Schedule::Every {
            interval: self.security_interval,
            first_delay: Duration::ZERO,
        }
    }

    pub fn brand_assets_schedule(&self) -> Schedule {
        Schedule::DailyAt(self.brand_asset_times.clone())
    }

    /// The sweeper waits one interval before its first run.
    pub fn sweep_schedule(&self) -> Schedule {
        Schedule::Every {
            interval: self.sweep_interval,
            first_delay: self.sweep_interval,
        }
    }
}

/// Parses `HH:MM` times separated by commas.
pub fn parse_times(raw: &str) -> Result<Vec<NaiveTime>> {
    let times = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveTime::parse_from_str(s, "%H:%M")
                .map_err(|e| CombotError::Config(format!("invalid time of day '{}': {}", s, e)))
        })
        .collect::<Result<Vec<_>>>()?;
    if times.is_empty() {
        return Err(CombotError::Config("BRAND_ASSET_TIMES is empty".into()));
    }
    Ok(times)
}

fn secs_from_env(key: &str) -> Result<Option<Duration>> {
    let Ok(raw) = env::var(key) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(CombotError::Config(format!(
            "{} must be a positive number of seconds, got '{}'",
            key, raw
        ))),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
    }
}

/// Broadcast texts, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastContent {
    pub security_messages: Vec<String>,
    pub brand_assets: Vec<String>,
}

impl BroadcastContent {
    /// Loads both files; the rotation must not be empty.
    pub fn load(config: &ScheduleConfig) -> Result<Self> {
        let content = Self {
            security_messages: load_messages(&config.security_messages_file)?,
            brand_assets: load_messages(&config.brand_assets_file)?,
        };
        if content.security_messages.is_empty() {
            return Err(CombotError::load(
                &config.security_messages_file,
                "no messages to rotate",
            ));
        }
        info!(
            security_messages = content.security_messages.len(),
            brand_assets = content.brand_assets.len(),
            "Broadcast content loaded"
        );
        Ok(content)
    }
}

/// Reads a JSON array of message strings.
pub fn load_messages(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path).map_err(|e| CombotError::load(path, e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| CombotError::load(path, e.to_string()))
}
