//! # scheduled-jobs
//!
//! Timer-driven work running beside message handling: the rotating security announcement,
//! the twice-daily brand-asset set, and the spam-state sweeper. Each job runs on its own
//! timer loop ([`spawn_job`]) and never overlaps itself.

pub mod broadcaster;
pub mod config;
pub mod job;
pub mod sweeper;

pub use broadcaster::{BrandAssetsBroadcaster, SecurityBroadcaster};
pub use config::{load_messages, parse_times, BroadcastContent, ScheduleConfig};
pub use job::{next_daily_run, spawn_job, Job, JobRunner, Schedule};
pub use sweeper::Sweeper;
