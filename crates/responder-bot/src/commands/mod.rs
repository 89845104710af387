//! System command handlers (`!!whoami`, `!!reload`, `!!stop`, `!!channels`).

mod channels;
mod reload;
mod stop;
mod whoami;

pub use channels::ChannelsHandler;
pub use reload::ReloadHandler;
pub use stop::StopHandler;
pub use whoami::WhoamiHandler;

use crate::dispatcher::Dispatch;
use crate::error::AppResult;
use async_trait::async_trait;
use command_table::RulesSnapshot;
use signal_client::BotMessage;

/// What a system command gets to work with.
pub struct CommandContext<'a> {
    pub message: &'a BotMessage,
    /// Rules that were live when the message arrived.
    pub rules: &'a RulesSnapshot,
}

/// System command handler trait.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Command name (e.g., "reload"), matched case-insensitively.
    fn name(&self) -> &str;

    /// Whether only admins may run this command.
    fn admin_only(&self) -> bool {
        true
    }

    /// Check if this handler answers to `command`.
    fn matches(&self, command: &str) -> bool {
        command.eq_ignore_ascii_case(self.name())
    }

    /// Execute the command.
    async fn execute(&self, ctx: &CommandContext<'_>) -> AppResult<Dispatch>;
}
