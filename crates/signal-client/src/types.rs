//! Signal API types.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Incoming Signal message.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub envelope: Envelope,
    pub account: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub source: String,
    #[serde(rename = "sourceNumber")]
    pub source_number: Option<String>,
    #[serde(rename = "sourceName")]
    pub source_name: Option<String>,
    pub timestamp: i64,
    #[serde(rename = "dataMessage")]
    pub data_message: Option<DataMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataMessage {
    pub message: Option<String>,
    pub timestamp: i64,
    #[serde(rename = "groupInfo")]
    pub group_info: Option<GroupInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    /// Internal (base64) group id.
    #[serde(rename = "groupId")]
    pub group_id: String,
}

/// Outgoing message request.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub number: Option<String>,
    pub recipients: Option<Vec<String>>,
}

/// A group the account belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub name: String,
    /// Recipient id used when sending (`group.<...>`).
    pub id: String,
    /// Same id as carried by incoming messages.
    pub internal_id: String,
    #[serde(default)]
    pub blocked: bool,
}

/// Convert an internal group id into the recipient id the send API expects.
pub fn group_recipient(internal_id: &str) -> String {
    format!("group.{}", STANDARD.encode(internal_id))
}

/// Parsed message for bot processing.
#[derive(Debug, Clone)]
pub struct BotMessage {
    /// The phone number that sent the message.
    pub source: String,
    /// Sender display name, falling back to the number.
    pub source_name: String,
    /// The message text.
    pub text: String,
    /// Message timestamp.
    pub timestamp: i64,
    /// Internal group id if this is a group message.
    pub group_id: Option<String>,
    /// The bot's phone number that received this message.
    pub receiving_account: String,
}

impl BotMessage {
    /// Extract bot message from incoming envelope.
    pub fn from_incoming(msg: &IncomingMessage) -> Option<Self> {
        let data = msg.envelope.data_message.as_ref()?;
        let text = data.message.clone()?;
        let source = msg
            .envelope
            .source_number
            .clone()
            .unwrap_or_else(|| msg.envelope.source.clone());
        let source_name = msg
            .envelope
            .source_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| source.clone());

        Some(Self {
            source,
            source_name,
            text,
            timestamp: msg.envelope.timestamp,
            group_id: data.group_info.as_ref().map(|g| g.group_id.clone()),
            receiving_account: msg.account.clone(),
        })
    }

    /// Direct messages are the private context admin commands run in.
    pub fn is_private(&self) -> bool {
        self.group_id.is_none()
    }

    /// Channel the message arrived in: the group, or the sender for DMs.
    pub fn channel_id(&self) -> &str {
        self.group_id.as_deref().unwrap_or(&self.source)
    }

    /// Recipient to send replies to.
    pub fn reply_target(&self) -> String {
        match &self.group_id {
            Some(internal_id) => group_recipient(internal_id),
            None => self.source.clone(),
        }
    }

    /// Whether the bot's own account sent this.
    pub fn is_from_self(&self) -> bool {
        self.source == self.receiving_account
    }
}
