use crate::{
    error::CourierError,
    message::{IncomingMessage, MessageRef, OutgoingMessage},
};
use async_trait::async_trait;

/// Where tracking notices go.
///
/// `publish` appends a new message to a channel; `update` rewrites the
/// content of a message that was published earlier.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Post a new message into `channel_id`.
    async fn publish(&self, channel_id: &str, text: &str) -> Result<MessageRef, CourierError>;

    /// Replace the content of an existing message.
    async fn update(&self, message: &MessageRef, text: &str) -> Result<(), CourierError>;
}

/// Messaging Channel trait.
///
/// Every messaging platform implements this trait to receive commands,
/// answer them, and perform the few moderation actions the bot needs.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, CourierError>;

    /// Send a response back through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), CourierError>;

    /// Rename a channel. Unknown channels yield `ChannelNotFound`,
    /// any other refusal yields `RenameFailed`.
    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), CourierError>;

    /// Whether any of `role_ids` carries the administrator permission in `guild_id`.
    async fn is_administrator(
        &self,
        _guild_id: &str,
        _role_ids: &[String],
    ) -> Result<bool, CourierError> {
        Ok(false)
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), CourierError>;
}
