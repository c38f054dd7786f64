//! REPL runner: converts each teloxide message to a core Message and hands it to the
//! moderation pipeline on its own task.

use std::sync::Arc;

use anyhow::Result;
use combot_core::ToCoreMessage;
use moderation::ModerationPipeline;
use teloxide::prelude::*;
use tracing::{debug, error, info, instrument};

use super::adapters::TelegramMessageWrapper;

/// Runs the teloxide REPL until Ctrl-C. One spawned task per inbound message, so a slow
/// platform call for one message never delays classification of the next.
#[instrument(skip(bot, pipeline))]
pub async fn run_repl(bot: teloxide::Bot, pipeline: Arc<ModerationPipeline>) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        info!(username = ?me.user.username, "Connected to Telegram");
    }

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let pipeline = pipeline.clone();

        async move {
            let core_msg = TelegramMessageWrapper(&msg).to_core();
            debug!(
                user_id = core_msg.user.id,
                chat_id = core_msg.chat.id,
                has_text = core_msg.content.is_some(),
                "Received message"
            );

            tokio::spawn(async move {
                if let Err(e) = pipeline.dispatch(&core_msg).await {
                    error!(
                        error = %e,
                        user_id = core_msg.user.id,
                        message_id = %core_msg.id,
                        "Moderation failed"
                    );
                }
            });

            Ok(())
        }
    })
    .await;

    info!("Telegram REPL stopped");
    Ok(())
}
