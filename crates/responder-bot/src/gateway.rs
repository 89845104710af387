//! The chat service as seen by the dispatcher.

use async_trait::async_trait;
use signal_client::{SignalClient, SignalError};

/// A channel the bot can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Id as used in the rules file and on incoming messages.
    pub id: String,
    pub name: String,
}

/// Outbound side of the chat service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send `text` to a recipient.
    async fn send(&self, recipient: &str, text: &str) -> Result<(), SignalError>;

    /// Every channel the bot is currently a member of.
    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, SignalError>;
}

#[async_trait]
impl ChatGateway for SignalClient {
    async fn send(&self, recipient: &str, text: &str) -> Result<(), SignalError> {
        SignalClient::send(self, recipient, text).await
    }

    async fn list_channels(&self) -> Result<Vec<ChannelInfo>, SignalError> {
        let groups = self.list_groups().await?;
        Ok(groups
            .into_iter()
            .filter(|g| !g.blocked)
            .map(|g| ChannelInfo {
                id: g.internal_id,
                name: g.name,
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;
    use tokio::time::Instant;

    #[derive(Debug, Clone)]
    pub struct SentReply {
        pub recipient: String,
        pub text: String,
        pub at: Instant,
    }

    /// Accepts every send and remembers when it happened.
    #[derive(Default)]
    pub struct RecordingGateway {
        sent: Mutex<Vec<SentReply>>,
    }

    impl RecordingGateway {
        pub fn sent(&self) -> Vec<SentReply> {
            self.sent.lock().unwrap().clone()
        }

        pub fn sent_at(&self, text: &str) -> Option<Instant> {
            self.sent().into_iter().find(|s| s.text == text).map(|s| s.at)
        }
    }

    #[async_trait]
    impl ChatGateway for RecordingGateway {
        async fn send(&self, recipient: &str, text: &str) -> Result<(), SignalError> {
            self.sent.lock().unwrap().push(SentReply {
                recipient: recipient.into(),
                text: text.into(),
                at: Instant::now(),
            });
            Ok(())
        }

        async fn list_channels(&self) -> Result<Vec<ChannelInfo>, SignalError> {
            Ok(Vec::new())
        }
    }
}
