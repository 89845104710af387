//! Whoami command - tells users how the bot sees them.

use crate::commands::{CommandContext, CommandHandler};
use crate::dispatcher::Dispatch;
use crate::error::AppResult;
use async_trait::async_trait;

pub struct WhoamiHandler;

impl WhoamiHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WhoamiHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for WhoamiHandler {
    fn name(&self) -> &str {
        "whoami"
    }

    fn admin_only(&self) -> bool {
        false
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> AppResult<Dispatch> {
        Ok(Dispatch::reply(format!(
            "Your name is {} and your id is {}",
            ctx.message.source_name, ctx.message.source
        )))
    }
}
