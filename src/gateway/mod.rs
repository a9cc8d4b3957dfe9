//! Gateway: the event loop connecting the Discord channel to commands,
//! the order tracker, and the payment store.

mod auth;

pub use auth::Caller;

use crate::commands::{self, Command, CommandContext};
use courier_core::{
    config::Config,
    message::{IncomingMessage, OutgoingMessage},
    traits::{Channel, NotificationSink},
};
use courier_memory::PaymentStore;
use courier_tracker::{ActiveSessions, StatusProvider};
use std::sync::Arc;
use tracing::{debug, error, info};

/// The central gateway that routes commands from the channel to their handlers.
pub struct Gateway {
    pub(super) channel: Arc<dyn Channel>,
    pub(super) sink: Arc<dyn NotificationSink>,
    pub(super) provider: Arc<dyn StatusProvider>,
    pub(super) store: PaymentStore,
    pub(super) sessions: ActiveSessions,
    pub(super) config: Config,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        channel: Arc<dyn Channel>,
        sink: Arc<dyn NotificationSink>,
        provider: Arc<dyn StatusProvider>,
        store: PaymentStore,
        config: Config,
    ) -> Self {
        Self {
            channel,
            sink,
            provider,
            store,
            sessions: ActiveSessions::new(),
            config,
        }
    }

    /// Run the main event loop until Ctrl-C or the channel closes.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "{} gateway running | channel: {} | prefix: {} | shop channel: {}",
            self.config.courier.name,
            self.channel.name(),
            self.config.discord.command_prefix,
            if self.config.shop.channel_id.is_empty() {
                "not configured"
            } else {
                self.config.shop.channel_id.as_str()
            },
        );

        let mut rx = self
            .channel
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start channel {}: {e}", self.channel.name()))?;

        loop {
            tokio::select! {
                incoming = rx.recv() => {
                    let Some(incoming) = incoming else {
                        info!("channel closed, shutting down");
                        break;
                    };
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.handle_message(incoming).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Parse, authorize, and run one command, then reply.
    pub(crate) async fn handle_message(&self, incoming: IncomingMessage) {
        let Some((cmd, args)) = Command::parse(&incoming.text, &self.config.discord.command_prefix)
        else {
            debug!("ignoring non-command from {}", incoming.sender_id);
            return;
        };

        info!(
            "command {cmd:?} from {} ({})",
            incoming.sender_name.as_deref().unwrap_or("unknown"),
            incoming.sender_id
        );

        let caller = self.resolve_caller(&incoming).await;
        let ctx = CommandContext {
            channel: self.channel.as_ref(),
            sink: self.sink.clone(),
            provider: self.provider.clone(),
            sessions: &self.sessions,
            store: &self.store,
            config: &self.config,
            caller: &caller,
            incoming: &incoming,
            args,
        };

        if let Some(reply) = commands::handle(cmd, &ctx).await {
            self.send_text(&incoming, &reply).await;
        }
    }

    async fn shutdown(&self) {
        info!(
            "Shutting down: cancelling {} tracking session(s)",
            self.sessions.len()
        );
        self.sessions.cancel_all();
        if let Err(e) = self.channel.stop().await {
            error!("failed to stop channel {}: {e}", self.channel.name());
        }
        info!("Shutdown complete.");
    }

    /// Send a plain text reply to wherever `incoming` came from.
    async fn send_text(&self, incoming: &IncomingMessage, text: &str) {
        let msg = OutgoingMessage {
            text: text.to_string(),
            reply_target: incoming.reply_target.clone(),
        };
        if let Err(e) = self.channel.send(msg).await {
            error!("failed to send message: {e}");
        }
    }
}
