//! Phrase and filter tables.
//!
//! Loaded once at startup and read-only afterwards. Every phrase and trigger is compiled to
//! a word-bounded pattern at load time with its literal text escaped; a pattern that fails to
//! compile, a missing file, or a malformed filter table aborts the load.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use combot_core::{normalize, CombotError, FilterReply, MediaAttachment, MediaKind, Result};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::config::StorePaths;

/// A phrase list matched on word boundaries (ban / mute / delete).
#[derive(Debug, Clone, Default)]
pub struct PhraseList {
    phrases: Vec<(String, Regex)>,
}

impl PhraseList {
    /// Compiles every phrase; phrases are normalized and blank ones dropped.
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for phrase in phrases {
            let phrase = normalize(phrase.as_ref());
            if phrase.is_empty() {
                continue;
            }
            let regex = word_bounded(&phrase)?;
            compiled.push((phrase, regex));
        }
        Ok(Self { phrases: compiled })
    }

    /// Reads a newline-delimited list.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = read_file(path)?;
        Self::new(raw.lines())
    }

    /// First phrase that occurs in `text` as a whole word sequence.
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.phrases
            .iter()
            .find(|(_, regex)| regex.is_match(text))
            .map(|(phrase, _)| phrase.as_str())
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// Exact-text whitelist.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    phrases: HashSet<String>,
}

impl Whitelist {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| normalize(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = read_file(path)?;
        Ok(Self::new(raw.lines()))
    }

    pub fn contains(&self, text: &str) -> bool {
        self.phrases.contains(text.trim())
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

/// On-disk shape of one filter value.
#[derive(Debug, Deserialize)]
struct RawFilter {
    #[serde(default)]
    response_text: Option<String>,
    #[serde(default)]
    media: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// One configured filter.
#[derive(Debug, Clone)]
pub struct FilterEntry {
    /// Trigger as written in the table (used for listing).
    pub trigger: String,
    pub response_text: Option<String>,
    pub media: Option<String>,
    pub media_kind: MediaKind,
    pattern: Regex,
}

impl FilterEntry {
    /// Builds an entry; `kind` accepts `gif`/`animation`, `image`, `video` (default `gif`).
    pub fn new(
        trigger: &str,
        response_text: Option<String>,
        media: Option<String>,
        kind: Option<&str>,
    ) -> Result<Self> {
        let media_kind = parse_media_kind(kind.unwrap_or("gif")).ok_or_else(|| {
            CombotError::Config(format!(
                "filter '{}' has unknown media type '{}'",
                trigger,
                kind.unwrap_or_default()
            ))
        })?;
        Ok(Self {
            trigger: trigger.to_string(),
            response_text: response_text.filter(|t| !t.is_empty()),
            media: media.filter(|m| !m.is_empty()),
            media_kind,
            pattern: trigger_pattern(trigger)?,
        })
    }

    /// Matches the trigger with an optional leading `/` and optional `_suffix`, word-bounded.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// The reply to send; media is resolved under `media_dir` and dropped when the file is missing.
    pub fn reply(&self, media_dir: &Path) -> FilterReply {
        let media = self
            .media
            .as_ref()
            .map(|file| media_dir.join(file))
            .filter(|path| path.exists())
            .map(|path| MediaAttachment {
                kind: self.media_kind,
                path,
            });
        FilterReply {
            trigger: self.trigger.clone(),
            text: self.response_text.clone(),
            media,
        }
    }
}

/// Filter table in file order.
#[derive(Debug, Clone, Default)]
pub struct FilterTable {
    entries: Vec<FilterEntry>,
}

impl FilterTable {
    /// Builds a table; normalized triggers must be unique.
    pub fn new(entries: Vec<FilterEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(normalize(&entry.trigger)) {
                return Err(CombotError::Config(format!(
                    "duplicate filter trigger '{}'",
                    entry.trigger
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Parses a JSON object `{ trigger: { response_text?, media?, type? } }`, keeping key order.
    pub fn from_json(raw: &str) -> Result<Self> {
        let map: Map<String, Value> = serde_json::from_str(raw)?;
        let mut entries = Vec::with_capacity(map.len());
        for (trigger, value) in map {
            let filter: RawFilter = serde_json::from_value(value)?;
            entries.push(FilterEntry::new(
                &trigger,
                filter.response_text,
                filter.media,
                filter.kind.as_deref(),
            )?);
        }
        Self::new(entries)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = read_file(path)?;
        Self::from_json(&raw).map_err(|e| CombotError::load(path, e.to_string()))
    }

    /// First entry (in table order) whose trigger matches `text`.
    pub fn lookup(&self, text: &str) -> Option<&FilterEntry> {
        self.entries.iter().find(|entry| entry.matches(text))
    }

    /// Triggers in table order.
    pub fn triggers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.trigger.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All tables consulted by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct PhraseStore {
    pub filters: FilterTable,
    pub ban: PhraseList,
    pub mute: PhraseList,
    pub delete: PhraseList,
    pub whitelist: Whitelist,
    pub media_dir: PathBuf,
}

impl PhraseStore {
    /// Loads every table; any failure aborts the whole load.
    pub fn load(paths: &StorePaths) -> Result<Self> {
        let store = Self {
            filters: FilterTable::load(&paths.filters_file)?,
            ban: PhraseList::load(&paths.ban_phrases_file)?,
            mute: PhraseList::load(&paths.mute_phrases_file)?,
            delete: PhraseList::load(&paths.delete_phrases_file)?,
            whitelist: Whitelist::load(&paths.whitelist_file)?,
            media_dir: paths.media_dir.clone(),
        };
        info!(
            filters = store.filters.len(),
            ban = store.ban.len(),
            mute = store.mute.len(),
            delete = store.delete.len(),
            whitelist = store.whitelist.len(),
            "Moderation tables loaded"
        );
        Ok(store)
    }

    pub fn lookup_filter(&self, text: &str) -> Option<&FilterEntry> {
        self.filters.lookup(text)
    }

    pub fn is_banned(&self, text: &str) -> bool {
        self.ban.first_match(text).is_some()
    }

    pub fn is_muted(&self, text: &str) -> bool {
        self.mute.first_match(text).is_some()
    }

    pub fn is_delete_worthy(&self, text: &str) -> bool {
        self.delete.first_match(text).is_some()
    }

    pub fn is_whitelisted(&self, text: &str) -> bool {
        self.whitelist.contains(text)
    }
}

fn parse_media_kind(raw: &str) -> Option<MediaKind> {
    match raw.trim().to_lowercase().as_str() {
        "gif" | "animation" => Some(MediaKind::Animation),
        "image" => Some(MediaKind::Image),
        "video" => Some(MediaKind::Video),
        _ => None,
    }
}

fn word_bounded(phrase: &str) -> Result<Regex> {
    compile(phrase, format!(r"\b{}\b", regex::escape(phrase)))
}

/// No lookaround in `regex`: the boundaries consume a non-word char or hit the text edge,
/// which is equivalent for a yes/no match.
fn trigger_pattern(trigger: &str) -> Result<Regex> {
    let normalized = normalize(trigger);
    compile(
        trigger,
        format!(r"(?:^|\W)/?{}(?:_\w+)?(?:\W|$)", regex::escape(&normalized)),
    )
}

fn compile(phrase: &str, pattern: String) -> Result<Regex> {
    Regex::new(&pattern).map_err(|source| CombotError::Pattern {
        phrase: phrase.to_string(),
        source,
    })
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CombotError::load(path, e.to_string()))
}
