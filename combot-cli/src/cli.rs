//! CLI parser and loading of every persisted input.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moderation::{PhraseStore, StorePaths};
use scheduled_jobs::{BroadcastContent, ScheduleConfig};

#[derive(Parser)]
#[command(name = "combot")]
#[command(about = "Telegram group moderation bot", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Load and validate filters, phrase lists and broadcast content, then exit.
    Check,
}

/// Everything read from disk at startup.
pub struct Inputs {
    pub store: PhraseStore,
    pub content: BroadcastContent,
}

impl Inputs {
    /// Any missing or malformed file fails the whole load.
    pub fn load(paths: &StorePaths, schedule: &ScheduleConfig) -> Result<Self> {
        let store = PhraseStore::load(paths).context("Load filters and phrase lists")?;
        let content = BroadcastContent::load(schedule).context("Load broadcast content")?;
        Ok(Self { store, content })
    }

    /// One line per table, for `check`.
    pub fn summary(&self) -> Vec<String> {
        vec![
            format!("filters: {}", self.store.filters.len()),
            format!("ban phrases: {}", self.store.ban.len()),
            format!("mute phrases: {}", self.store.mute.len()),
            format!("delete phrases: {}", self.store.delete.len()),
            format!("whitelist phrases: {}", self.store.whitelist.len()),
            format!("security messages: {}", self.content.security_messages.len()),
            format!("brand assets: {}", self.content.brand_assets.len()),
        ]
    }
}
