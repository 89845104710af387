//! Per-channel message handling.

use crate::dispatcher::{Dispatcher, Flow};
use crate::lanes::{LaneWorker, Lanes};
use async_trait::async_trait;
use signal_client::BotMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

const LANE_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

struct ChannelWorker {
    dispatcher: Arc<Dispatcher>,
    stop: mpsc::UnboundedSender<()>,
}

#[async_trait]
impl LaneWorker<BotMessage> for ChannelWorker {
    async fn process(&self, _channel: &str, message: BotMessage) {
        if self.dispatcher.on_message(&message).await == Flow::Stop {
            info!(admin = %message.source, "Stop command received");
            if self.stop.send(()).is_err() {
                debug!("Already shutting down");
            }
        }
    }
}

/// Feeds messages to the dispatcher, one channel lane at a time.
///
/// Messages in the same channel are handled in arrival order. A slow lookup
/// only holds up its own channel.
pub struct Inbox {
    lanes: Lanes<BotMessage, ChannelWorker>,
}

impl Inbox {
    /// Returns the inbox and a receiver that fires when a stop command ran.
    pub fn new(dispatcher: Arc<Dispatcher>) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (stop, stopped) = mpsc::unbounded_channel();
        let worker = Arc::new(ChannelWorker { dispatcher, stop });
        let inbox = Self {
            lanes: Lanes::new(worker, LANE_IDLE_TIMEOUT),
        };
        (inbox, stopped)
    }

    /// Queue a message on its channel's lane.
    pub async fn submit(&self, message: BotMessage) {
        let channel = message.channel_id().to_string();
        self.lanes.push(&channel, message).await;
    }

    /// Wait until every submitted message has been handled.
    pub async fn flush(&self) {
        self.lanes.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{CommandHandler, StopHandler};
    use crate::gateway::testing::RecordingGateway;
    use crate::outbox::Outbox;
    use command_table::{RulesSnapshot, RulesStore};
    use response_macros::{Macro, MacroContext, MacroError, MacroRegistry, ResponseSynthesizer};
    use signal_client::group_recipient;
    use tokio::time::{sleep, Instant};

    const BOT: &str = "+10000000000";
    const ADMIN: &str = "+15550000002";
    const SLOW: Duration = Duration::from_millis(500);

    struct SlowMacro;

    #[async_trait]
    impl Macro for SlowMacro {
        fn token(&self) -> &str {
            "%SLOW%"
        }

        async fn expand(&self, _ctx: MacroContext<'_>) -> Result<String, MacroError> {
            sleep(SLOW).await;
            Ok("finally".into())
        }
    }

    fn setup() -> (Inbox, mpsc::UnboundedReceiver<()>, Arc<RecordingGateway>, Arc<Outbox>) {
        let rules = RulesSnapshot::from_json(&format!(
            r#"{{
                "commands": {{ "g": {{ "slow": ["%SLOW%"], "hi": ["Hello %SENDER%"] }} }},
                "channels": {{ "g": ["chan-a", "chan-b"] }},
                "permissions": {{ "admin": ["{ADMIN}"] }}
            }}"#
        ))
        .unwrap();

        let mut registry = MacroRegistry::with_local_builtins().unwrap();
        registry.register(Arc::new(SlowMacro)).unwrap();

        let gateway = Arc::new(RecordingGateway::default());
        let outbox = Arc::new(Outbox::new(gateway.clone(), Duration::from_millis(1)));
        let handlers: Vec<Box<dyn CommandHandler>> = vec![Box::new(StopHandler::new())];
        let dispatcher = Arc::new(Dispatcher::new(
            RulesStore::with_snapshot(rules, "unused.json"),
            Arc::new(ResponseSynthesizer::new(Arc::new(registry))),
            handlers,
            outbox.clone(),
        ));

        let (inbox, stopped) = Inbox::new(dispatcher);
        (inbox, stopped, gateway, outbox)
    }

    fn message(text: &str, group: Option<&str>, source: &str) -> BotMessage {
        BotMessage {
            source: source.into(),
            source_name: "Alex".into(),
            text: text.into(),
            timestamp: 0,
            group_id: group.map(String::from),
            receiving_account: BOT.into(),
        }
    }

    #[tokio::test]
    async fn test_slow_lookup_does_not_delay_other_channels() {
        let (inbox, _stopped, gateway, outbox) = setup();
        let started = Instant::now();

        inbox.submit(message("!slow", Some("chan-a"), "+1")).await;
        inbox.submit(message("!hi", Some("chan-b"), "+1")).await;

        sleep(SLOW / 2).await;
        let early = gateway.sent();
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].text, "Hello Alex");
        assert_eq!(early[0].recipient, group_recipient("chan-b"));
        assert!(early[0].at.duration_since(started) < SLOW);

        inbox.flush().await;
        outbox.flush().await;
        assert!(gateway.sent_at("finally").unwrap() > gateway.sent_at("Hello Alex").unwrap());
    }

    #[tokio::test]
    async fn test_same_channel_keeps_order() {
        let (inbox, _stopped, gateway, outbox) = setup();

        inbox.submit(message("!slow", Some("chan-a"), "+1")).await;
        inbox.submit(message("!hi", Some("chan-a"), "+1")).await;
        inbox.flush().await;
        outbox.flush().await;

        let texts: Vec<String> = gateway.sent().into_iter().map(|s| s.text).collect();
        assert_eq!(texts, vec!["finally", "Hello Alex"]);
    }

    #[tokio::test]
    async fn test_stop_is_reported() {
        let (inbox, mut stopped, gateway, outbox) = setup();

        inbox.submit(message("!!stop", None, ADMIN)).await;
        tokio::time::timeout(Duration::from_secs(1), stopped.recv())
            .await
            .unwrap()
            .unwrap();

        inbox.flush().await;
        outbox.flush().await;
        assert!(gateway.sent_at("Shutting down.").is_some());
    }
}
