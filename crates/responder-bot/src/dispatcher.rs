//! Message routing: user commands, system commands, replies.

use crate::commands::{CommandContext, CommandHandler};
use crate::outbox::Outbox;
use command_table::{tokenize, RulesSnapshot, RulesStore};
use response_macros::{ResponseSynthesizer, Sender};
use signal_client::BotMessage;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Whether the event loop should keep going after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Outcome of handling one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub reply: Option<String>,
    pub flow: Flow,
}

impl Dispatch {
    /// Nothing to say.
    pub fn none() -> Self {
        Self {
            reply: None,
            flow: Flow::Continue,
        }
    }

    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            flow: Flow::Continue,
        }
    }
}

/// Routes inbound messages to the command matcher or the system commands.
pub struct Dispatcher {
    rules: RulesStore,
    synthesizer: Arc<ResponseSynthesizer>,
    handlers: Vec<Box<dyn CommandHandler>>,
    outbox: Arc<Outbox>,
}

impl Dispatcher {
    pub fn new(
        rules: RulesStore,
        synthesizer: Arc<ResponseSynthesizer>,
        handlers: Vec<Box<dyn CommandHandler>>,
        outbox: Arc<Outbox>,
    ) -> Self {
        Self {
            rules,
            synthesizer,
            handlers,
            outbox,
        }
    }

    /// Handle a message and queue its reply, if any.
    pub async fn on_message(&self, message: &BotMessage) -> Flow {
        let dispatch = self.handle(message).await;
        if let Some(text) = dispatch.reply {
            self.outbox.send(&message.reply_target(), text).await;
        }
        dispatch.flow
    }

    /// Decide what to answer to `message` without sending anything.
    #[instrument(skip_all, fields(channel = %message.channel_id(), sender = %message.source))]
    pub async fn handle(&self, message: &BotMessage) -> Dispatch {
        if message.is_from_self() {
            return Dispatch::none();
        }

        let rules = self.rules.snapshot().await;
        if rules.is_ignored(&message.source) {
            debug!("Ignoring message from ignored sender");
            return Dispatch::none();
        }

        let prefix = rules.command_prefix.as_str();
        let Some(body) = message.text.strip_prefix(prefix) else {
            return Dispatch::none();
        };

        match body.strip_prefix(prefix) {
            Some(system) => self.handle_system(message, system, &rules).await,
            None => self.handle_user(message, body, &rules).await,
        }
    }

    async fn handle_user(&self, message: &BotMessage, body: &str, rules: &RulesSnapshot) -> Dispatch {
        let tokens = tokenize(body);
        let Some(matched) = rules.match_command(message.channel_id(), &tokens) else {
            debug!("No matching command");
            return Dispatch::none();
        };
        debug!(group = %matched.group, trigger = %matched.trigger, "Matched command");

        let sender = Sender::new(&message.source, &message.source_name);
        match self
            .synthesizer
            .synthesize(message.channel_id(), matched.templates, &sender, &matched.params)
            .await
        {
            Ok(text) if text.is_empty() => Dispatch::none(),
            Ok(text) => Dispatch::reply(text),
            Err(e) => {
                debug!(error = %e, "Replying with macro failure");
                Dispatch::reply(e.to_string())
            }
        }
    }

    async fn handle_system(
        &self,
        message: &BotMessage,
        body: &str,
        rules: &RulesSnapshot,
    ) -> Dispatch {
        if !message.is_private() {
            debug!("System command outside a direct message, ignoring");
            return Dispatch::none();
        }

        let tokens = tokenize(body);
        let Some(command) = tokens.first() else {
            return Dispatch::none();
        };

        let Some(handler) = self.handlers.iter().find(|h| h.matches(command)) else {
            debug!(command = %command, "Unknown system command");
            return Dispatch::none();
        };

        if handler.admin_only() && !rules.is_admin(&message.source) {
            info!(command = %command, "Non-admin tried a system command");
            return Dispatch::none();
        }

        let ctx = CommandContext { message, rules };
        match handler.execute(&ctx).await {
            Ok(dispatch) => dispatch,
            Err(e) => {
                error!(command = %command, error = %e, "System command failed");
                Dispatch::reply("Sorry, something went wrong.")
            }
        }
    }
}
