//! Maintenance sweeper: bounds spam-detector memory between messages.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use combot_core::Result;
use moderation::SpamDetector;
use tracing::debug;

use crate::job::Job;

/// Drops expired flag records and idle live windows from the spam detector.
pub struct Sweeper {
    detector: Arc<SpamDetector>,
}

impl Sweeper {
    pub fn new(detector: Arc<SpamDetector>) -> Self {
        Self { detector }
    }
}

#[async_trait]
impl Job for Sweeper {
    fn name(&self) -> &'static str {
        "spam_sweeper"
    }

    async fn run(&self, now: DateTime<Utc>) -> Result<()> {
        let flags = self.detector.sweep(now);
        let windows = self.detector.evict_idle_windows(now);
        debug!(flags, windows, "Spam state swept");
        Ok(())
    }
}
