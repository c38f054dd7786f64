//! # combot-cli
//!
//! Argument parsing, startup loading of persisted inputs, and wiring of the pipeline,
//! scheduled jobs and Telegram runner.

pub mod app;
pub mod cli;

pub use app::{check, run};
pub use cli::{Cli, Commands, Inputs};
