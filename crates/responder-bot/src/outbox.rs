//! Rate-limited reply delivery.

use crate::gateway::ChatGateway;
use crate::lanes::{LaneWorker, Lanes};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error};

const LANE_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

struct Delivery {
    gateway: Arc<dyn ChatGateway>,
    cooldown: Duration,
}

#[async_trait]
impl LaneWorker<String> for Delivery {
    async fn process(&self, recipient: &str, text: String) {
        match self.gateway.send(recipient, &text).await {
            Ok(()) => debug!(recipient = %recipient, "Reply sent"),
            Err(e) => error!(recipient = %recipient, error = %e, "Failed to send reply"),
        }
        sleep(self.cooldown).await;
    }
}

/// Queues replies per recipient and applies a cooldown after each send.
///
/// Sends to one recipient happen in order with the cooldown between them,
/// while other recipients proceed independently. Queuing never waits for a
/// send to finish. A recipient's lane closes once it has been quiet for a
/// while, after its last cooldown has run out.
pub struct Outbox {
    lanes: Lanes<String, Delivery>,
}

impl Outbox {
    pub fn new(gateway: Arc<dyn ChatGateway>, cooldown: Duration) -> Self {
        Self::with_idle_timeout(gateway, cooldown, LANE_IDLE_TIMEOUT)
    }

    /// Like [`Outbox::new`], closing quiet lanes after `idle_timeout`.
    pub fn with_idle_timeout(
        gateway: Arc<dyn ChatGateway>,
        cooldown: Duration,
        idle_timeout: Duration,
    ) -> Self {
        let delivery = Arc::new(Delivery { gateway, cooldown });
        Self {
            lanes: Lanes::new(delivery, idle_timeout),
        }
    }

    /// Queue `text` for `recipient`.
    pub async fn send(&self, recipient: &str, text: String) {
        self.lanes.push(recipient, text).await;
    }

    /// Recipients with an open lane.
    pub async fn open_lanes(&self) -> usize {
        self.lanes.len().await
    }

    /// Wait for every queued reply to be sent.
    pub async fn flush(&self) {
        self.lanes.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::RecordingGateway;
    use crate::gateway::ChannelInfo;
    use signal_client::SignalError;
    use std::sync::Mutex as StdMutex;

    #[tokio::test]
    async fn test_same_recipient_is_serialized_with_cooldown() {
        let gateway = Arc::new(RecordingGateway::default());
        let outbox = Outbox::new(gateway.clone(), Duration::from_millis(100));

        outbox.send("a", "one".into()).await;
        outbox.send("a", "two".into()).await;
        outbox.flush().await;

        let sent = gateway.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].text, "one");
        assert_eq!(sent[1].text, "two");
        assert!(sent[1].at.duration_since(sent[0].at) >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_other_recipients_are_not_held_up() {
        let gateway = Arc::new(RecordingGateway::default());
        let outbox = Outbox::new(gateway.clone(), Duration::from_millis(500));

        outbox.send("a", "first".into()).await;
        outbox.send("a", "second".into()).await;
        outbox.send("b", "other".into()).await;
        outbox.flush().await;

        let first = gateway.sent_at("first").unwrap();
        let second = gateway.sent_at("second").unwrap();
        let other = gateway.sent_at("other").unwrap();
        assert!(other < second);
        assert!(other.duration_since(first) < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_quiet_recipients_are_released() {
        let gateway = Arc::new(RecordingGateway::default());
        let outbox = Outbox::with_idle_timeout(
            gateway.clone(),
            Duration::from_millis(5),
            Duration::from_millis(20),
        );

        for i in 0..200 {
            outbox.send(&format!("+1555{i:07}"), "Your name is ...".into()).await;
        }
        assert_eq!(outbox.open_lanes().await, 200);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(outbox.open_lanes().await, 0);
        assert_eq!(gateway.sent().len(), 200);

        outbox.send("+15550000000", "again".into()).await;
        outbox.flush().await;
        assert_eq!(gateway.sent().len(), 201);
    }

    #[tokio::test]
    async fn test_send_failure_does_not_stop_lane() {
        struct FlakyGateway {
            calls: StdMutex<usize>,
        }

        #[async_trait]
        impl ChatGateway for FlakyGateway {
            async fn send(&self, _recipient: &str, _text: &str) -> Result<(), SignalError> {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                if *calls == 1 {
                    Err(SignalError::SendFailed("nope".into()))
                } else {
                    Ok(())
                }
            }

            async fn list_channels(&self) -> Result<Vec<ChannelInfo>, SignalError> {
                Ok(Vec::new())
            }
        }

        let gateway = Arc::new(FlakyGateway {
            calls: StdMutex::new(0),
        });
        let outbox = Outbox::new(gateway.clone(), Duration::from_millis(1));
        outbox.send("a", "lost".into()).await;
        outbox.send("a", "delivered".into()).await;
        outbox.flush().await;

        assert_eq!(*gateway.calls.lock().unwrap(), 2);
    }
}
