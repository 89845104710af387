//! Channels command - shows which channels use which command groups.

use crate::commands::{CommandContext, CommandHandler};
use crate::dispatcher::Dispatch;
use crate::error::AppResult;
use crate::gateway::ChatGateway;
use async_trait::async_trait;
use command_table::RulesSnapshot;
use std::collections::HashSet;
use std::fmt::Write;
use std::sync::Arc;

pub struct ChannelsHandler {
    gateway: Arc<dyn ChatGateway>,
}

impl ChannelsHandler {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self { gateway }
    }
}

fn describe_groups(rules: &RulesSnapshot, channel: &str) -> String {
    let groups = rules.channels.groups_for(channel);
    if groups.is_empty() {
        "not monitored".into()
    } else {
        format!("in groups {}", groups.join(", "))
    }
}

#[async_trait]
impl CommandHandler for ChannelsHandler {
    fn name(&self) -> &str {
        "channels"
    }

    async fn execute(&self, ctx: &CommandContext<'_>) -> AppResult<Dispatch> {
        let visible = self.gateway.list_channels().await?;

        let mut report =
            String::from("Here are the channels I can currently see, and the command groups they are in:");
        for channel in &visible {
            let _ = write!(
                report,
                "\n-- {} ({}) - {}",
                channel.name,
                channel.id,
                describe_groups(ctx.rules, &channel.id)
            );
        }

        // Channels from the rules file that aren't groups, e.g. direct chats.
        let seen: HashSet<&str> = visible.iter().map(|c| c.id.as_str()).collect();
        let mut others = ctx
            .rules
            .channels
            .iter()
            .filter(|(id, _)| !seen.contains(id))
            .peekable();
        if others.peek().is_some() {
            report.push_str("\nOther configured channels:");
            for (id, groups) in others {
                let _ = write!(report, "\n-- {} - in groups {}", id, groups.join(", "));
            }
        }

        Ok(Dispatch::reply(report))
    }
}
