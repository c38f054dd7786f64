//! # Handler chain
//!
//! Runs an ordered sequence of handlers for each message. The first handler that returns
//! `Stop` ends the chain with its verdict; if none does, the message is allowed.
//! Handlers that do not apply to administrators are skipped for admin messages.

use std::sync::Arc;

use combot_core::{Handler, HandlerResponse, MessageContext, Result, Verdict};
use tracing::{debug, info, instrument};

/// Ordered list of handlers evaluated by a single dispatch loop.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a handler (runs in insertion order; first `Stop` ends the chain).
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Handler names in evaluation order.
    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Runs handlers in order and returns the first terminal verdict, or `Allow`.
    #[instrument(skip(self, ctx), fields(message_id = %ctx.message.id))]
    pub async fn handle(&self, ctx: &mut MessageContext) -> Result<Verdict> {
        info!(
            user_id = ctx.message.user.id,
            chat_id = ctx.message.chat.id,
            is_admin = ctx.is_admin,
            "step: handler_chain started"
        );

        for handler in &self.handlers {
            let name = handler.name();
            if ctx.is_admin && !handler.applies_to_admins() {
                debug!(handler = %name, "step: skipped for administrator");
                continue;
            }

            let response = handler.handle(ctx).await?;
            debug!(handler = %name, response = ?response, "Handler processed");

            match response {
                HandlerResponse::Stop(verdict) => {
                    info!(
                        user_id = ctx.message.user.id,
                        handler = %name,
                        verdict = verdict.kind(),
                        "step: handler chain stopped by handler"
                    );
                    return Ok(verdict);
                }
                HandlerResponse::Continue | HandlerResponse::Ignore => continue,
            }
        }

        info!(
            user_id = ctx.message.user.id,
            chat_id = ctx.message.chat.id,
            "step: handler_chain finished without verdict"
        );
        Ok(Verdict::Allow)
    }
}

// Tests live in tests/handler_chain_test.rs
