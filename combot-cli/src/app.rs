//! `run` and `check` commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use combot_core::{init_tracing, Bot, Chat};
use combot_telegram::{run_repl, TelegramBotAdapter, TelegramConfig};
use moderation::{ModerationConfig, ModerationPipeline, SpamDetector, StorePaths};
use scheduled_jobs::{BrandAssetsBroadcaster, JobRunner, ScheduleConfig, SecurityBroadcaster, Sweeper};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cli::Inputs;

/// Loads every input, starts the scheduled jobs and serves messages until Ctrl-C.
pub async fn run(token: Option<String>) -> Result<()> {
    let telegram = TelegramConfig::from_env(token)?;
    init_tracing(&telegram.log_file)?;

    let group_chat_id = telegram
        .group_chat_id
        .context("GROUP_CHAT_ID not set")?;
    let moderation_config = ModerationConfig::from_env()?;
    let schedule_config = ScheduleConfig::from_env()?;
    let inputs = Inputs::load(&StorePaths::from_env(), &schedule_config).map_err(|e| {
        error!(error = %e, "Refusing to start with incomplete tables");
        e
    })?;

    let teloxide_bot = telegram.build_bot();
    let bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let detector = Arc::new(SpamDetector::from_config(&moderation_config));
    let pipeline = Arc::new(ModerationPipeline::new(
        bot.clone(),
        Arc::new(inputs.store),
        detector.clone(),
        &moderation_config,
    )?);

    let group = Chat {
        id: group_chat_id,
        chat_type: "supergroup".to_string(),
    };
    let security = SecurityBroadcaster::new(
        bot.clone(),
        group.clone(),
        inputs.content.security_messages,
    )?;
    let brand_assets = BrandAssetsBroadcaster::new(bot, group, inputs.content.brand_assets);

    let shutdown = CancellationToken::new();
    let mut jobs = JobRunner::new(shutdown.clone());
    jobs.spawn(Arc::new(security), schedule_config.security_schedule())
        .spawn(
            Arc::new(brand_assets),
            schedule_config.brand_assets_schedule(),
        )
        .spawn(
            Arc::new(Sweeper::new(detector)),
            schedule_config.sweep_schedule(),
        );
    info!(jobs = jobs.len(), group_chat_id, "Scheduled jobs started");

    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping scheduled jobs");
            ctrl_c_token.cancel();
        }
    });

    run_repl(teloxide_bot, pipeline).await?;
    jobs.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

/// Loads every persisted input and prints table sizes. Fails on the first bad file.
pub fn check() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .with_target(false)
        .init();

    let schedule_config = ScheduleConfig::from_env()?;
    ModerationConfig::from_env()?;
    let inputs = Inputs::load(&StorePaths::from_env(), &schedule_config)?;

    println!("All inputs loaded.");
    for line in inputs.summary() {
        println!("  {}", line);
    }
    Ok(())
}
