//! Burst detector for identical texts posted by many senders.
//!
//! Two key-spaces, each behind its own lock held only for one read-modify-write:
//! - live windows: normalized text → the last `threshold` (sender, time) observations
//! - flag records: normalized text → time it was last confirmed as spam
//!
//! A flag record outlives the window that produced it, so a sender who repeats a flagged
//! text after the burst has ended is still caught until the record expires.

use std::collections::{BTreeSet, HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::ModerationConfig;

type Window = VecDeque<(i64, DateTime<Utc>)>;

#[derive(Debug)]
pub struct SpamDetector {
    threshold: usize,
    window: Duration,
    flag_retention: Duration,
    windows: Mutex<HashMap<String, Window>>,
    flags: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl SpamDetector {
    /// `threshold` is clamped to at least 1.
    pub fn new(threshold: usize, window: Duration, flag_retention: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            window,
            flag_retention,
            windows: Mutex::new(HashMap::new()),
            flags: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &ModerationConfig) -> Self {
        Self::new(
            config.spam_threshold,
            config.spam_window,
            config.flag_retention,
        )
    }

    /// Records `sender` posting `text` at `now`.
    ///
    /// Returns the distinct senders in the window when it reaches the threshold (and flags
    /// `text`), otherwise an empty set. Observations older than the time window are pruned
    /// first; the current one always survives. Idle windows are dropped by
    /// [`SpamDetector::evict_idle_windows`].
    pub fn observe(&self, text: &str, sender: i64, now: DateTime<Utc>) -> BTreeSet<i64> {
        let flagged = {
            let mut windows = self.windows.lock();
            let window = windows.entry(text.to_string()).or_default();

            window.push_back((sender, now));
            while window.len() > self.threshold {
                window.pop_front();
            }

            window.retain(|(_, seen)| now - *seen <= self.window);

            if window.len() >= self.threshold {
                Some(window.iter().map(|(id, _)| *id).collect::<BTreeSet<_>>())
            } else {
                debug!(text = %text, pending = window.len(), "Below spam threshold");
                None
            }
        };

        match flagged {
            Some(senders) => {
                self.flags.lock().insert(text.to_string(), now);
                info!(text = %text, senders = ?senders, "Spam burst detected");
                senders
            }
            None => BTreeSet::new(),
        }
    }

    /// Whether `text` was flagged no longer than the retention period before `now`.
    pub fn recently_flagged(&self, text: &str, now: DateTime<Utc>) -> bool {
        self.flags
            .lock()
            .get(text)
            .is_some_and(|flagged_at| now - *flagged_at <= self.flag_retention)
    }

    /// Removes flag records older than the retention period. Returns how many were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut flags = self.flags.lock();
        let before = flags.len();
        flags.retain(|text, flagged_at| {
            let keep = now - *flagged_at <= self.flag_retention;
            if !keep {
                debug!(text = %text, "Removed expired spam record");
            }
            keep
        });
        before - flags.len()
    }

    /// Drops live windows whose newest observation is outside the time window.
    pub fn evict_idle_windows(&self, now: DateTime<Utc>) -> usize {
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, window| {
            window
                .back()
                .is_some_and(|(_, seen)| now - *seen <= self.window)
        });
        before - windows.len()
    }

    /// Observations currently held for `text`.
    pub fn window_len(&self, text: &str) -> usize {
        self.windows.lock().get(text).map_or(0, |w| w.len())
    }

    pub fn flag_count(&self) -> usize {
        self.flags.lock().len()
    }
}
