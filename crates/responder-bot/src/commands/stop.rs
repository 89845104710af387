//! Stop command - ends the session.

use crate::commands::{CommandContext, CommandHandler};
use crate::dispatcher::{Dispatch, Flow};
use crate::error::AppResult;
use async_trait::async_trait;
use tracing::info;

pub struct StopHandler;

impl StopHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StopHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for StopHandler {
    fn name(&self) -> &str {
        "stop"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> AppResult<Dispatch> {
        info!(admin = %ctx.message.source, "Stop requested");
        Ok(Dispatch {
            reply: Some("Shutting down.".into()),
            flow: Flow::Stop,
        })
    }
}
