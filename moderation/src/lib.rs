//! # moderation
//!
//! Classifies every inbound group message into exactly one verdict (allow, respond, delete,
//! mute, ban) by running a fixed, ordered rule chain over immutable phrase/filter tables and
//! a shared spam detector.

pub mod config;
pub mod listing;
pub mod pipeline;
pub mod rules;
pub mod spam;
pub mod store;

pub use config::{ModerationConfig, StorePaths, DEFAULT_SUSPICIOUS_NAMES};
pub use listing::{filter_listing, is_filters_command, sorted_triggers};
pub use pipeline::ModerationPipeline;
pub use rules::build_chain;
pub use spam::SpamDetector;
pub use store::{FilterEntry, FilterTable, PhraseList, PhraseStore, Whitelist};
