//! # combot-core
//!
//! Core types and traits for the moderation bot: [`Bot`] (platform primitives), [`Handler`]
//! (one ordered moderation rule), message, context and verdict types, and tracing
//! initialization. Transport-agnostic; used by handler-chain, moderation, scheduled-jobs
//! and combot-telegram.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{parse_message_id, Bot};
pub use error::{CombotError, HandlerError, Result};
pub use logger::{init_tracing, open_log_file, DEFAULT_LOG_FILTER};
pub use types::{
    normalize, Chat, FilterReply, Handler, HandlerResponse, MediaAttachment, MediaKind, Message,
    MessageContext, TextFormat, ToCoreMessage, ToCoreUser, User, Verdict,
};
