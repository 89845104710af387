//! Reload command - re-reads the rules file.

use crate::commands::{CommandContext, CommandHandler};
use crate::dispatcher::Dispatch;
use crate::error::AppResult;
use async_trait::async_trait;
use command_table::RulesStore;
use tracing::info;

pub struct ReloadHandler {
    rules: RulesStore,
}

impl ReloadHandler {
    pub fn new(rules: RulesStore) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl CommandHandler for ReloadHandler {
    fn name(&self) -> &str {
        "reload"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> AppResult<Dispatch> {
        info!(admin = %ctx.message.source, "Reload requested");

        // A rejected reload keeps the previous rules live.
        match self.rules.reload().await {
            Ok(_) => Ok(Dispatch::reply("Reloaded!")),
            Err(e) => Ok(Dispatch::reply(format!("Reload failed: {}", e))),
        }
    }
}
