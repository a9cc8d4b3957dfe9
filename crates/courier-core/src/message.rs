use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "discord").
    pub channel: String,
    /// Platform-specific user ID.
    pub sender_id: String,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    /// Message text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Platform-specific target for routing the response (e.g. Discord channel id).
    #[serde(default)]
    pub reply_target: Option<String>,
    /// Guild the message was posted in. `None` for direct messages.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Role ids the sender holds in the guild.
    #[serde(default)]
    pub sender_roles: Vec<String>,
}

impl IncomingMessage {
    /// Mention string that pings the sender.
    pub fn sender_mention(&self) -> String {
        format!("<@{}>", self.sender_id)
    }
}

/// An outgoing message to send back through a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    /// Platform-specific target for routing (e.g. Discord channel id).
    #[serde(default)]
    pub reply_target: Option<String>,
}

/// Handle to a message that has already been posted, so it can be edited later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}
