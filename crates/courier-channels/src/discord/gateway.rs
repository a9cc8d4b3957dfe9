//! Gateway websocket listener and Channel trait implementation.

use super::send::{split_message, MAX_MESSAGE_LEN};
use super::types::{
    op, DcMessage, GatewayPayload, Hello, Identify, IdentifyProperties, Ready, INTENTS,
};
use super::DiscordChannel;
use async_trait::async_trait;
use courier_core::{
    error::CourierError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Why a gateway connection ended.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    /// Discord asked us to reconnect, or the socket closed.
    Reconnect,
    /// Nobody is listening anymore.
    ReceiverDropped,
}

#[async_trait]
impl Channel for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, CourierError> {
        let (tx, rx) = mpsc::channel(64);
        let gateway_url = self.gateway_url.clone();
        let token = self.token.clone();
        let prefix = self.config.command_prefix.clone();

        info!("Discord channel connecting to gateway...");

        let handle = tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                match connect_and_listen(&gateway_url, &token, &prefix, &tx).await {
                    Ok(Flow::ReceiverDropped) => {
                        info!("discord channel receiver dropped, stopping gateway");
                        return;
                    }
                    Ok(Flow::Reconnect) => {
                        backoff_secs = 1;
                        info!("discord: gateway asked to reconnect");
                    }
                    Err(e) => {
                        error!("discord gateway error (retry in {backoff_secs}s): {e}");
                    }
                }

                if tx.is_closed() {
                    return;
                }
                tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                backoff_secs = (backoff_secs * 2).min(60);
            }
        });

        *self.listener.lock().await = Some(handle);
        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), CourierError> {
        let channel_id = message
            .reply_target
            .as_deref()
            .ok_or_else(|| CourierError::Channel("no reply_target on outgoing message".into()))?;

        for chunk in split_message(&message.text, MAX_MESSAGE_LEN) {
            self.create_message(channel_id, chunk).await?;
        }
        Ok(())
    }

    async fn rename_channel(&self, channel_id: &str, name: &str) -> Result<(), CourierError> {
        self.patch_channel_name(channel_id, name).await
    }

    async fn is_administrator(
        &self,
        guild_id: &str,
        role_ids: &[String],
    ) -> Result<bool, CourierError> {
        self.roles_grant_admin(guild_id, role_ids).await
    }

    async fn stop(&self) -> Result<(), CourierError> {
        if let Some(handle) = self.listener.lock().await.take() {
            handle.abort();
        }
        info!("Discord channel stopped");
        Ok(())
    }
}

/// One gateway connection: Hello, Identify, then heartbeat and dispatch until it ends.
async fn connect_and_listen(
    gateway_url: &str,
    token: &str,
    prefix: &str,
    tx: &mpsc::Sender<IncomingMessage>,
) -> Result<Flow, CourierError> {
    let (ws, _) = connect_async(gateway_url)
        .await
        .map_err(|e| CourierError::Channel(format!("gateway connect failed: {e}")))?;
    let (mut write, mut read) = ws.split();

    let hello = loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => {
                let payload: GatewayPayload = serde_json::from_str(&text)?;
                if payload.op == op::HELLO {
                    break serde_json::from_value::<Hello>(payload.d)?;
                }
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                return Err(CourierError::Channel(format!("gateway read failed: {e}")));
            }
            None => return Err(CourierError::Channel("gateway closed before hello".into())),
        }
    };

    let identify = serde_json::json!({
        "op": op::IDENTIFY,
        "d": Identify {
            token,
            intents: INTENTS,
            properties: IdentifyProperties {
                os: std::env::consts::OS,
                browser: "courier",
                device: "courier",
            },
        },
    });
    write
        .send(Message::Text(identify.to_string()))
        .await
        .map_err(|e| CourierError::Channel(format!("gateway identify failed: {e}")))?;

    let mut heartbeat = tokio::time::interval(heartbeat_period(&hello));
    heartbeat.tick().await;
    let mut last_seq: Option<u64> = None;
    let mut bot_user_id: Option<String> = None;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let beat = serde_json::json!({ "op": op::HEARTBEAT, "d": last_seq });
                write
                    .send(Message::Text(beat.to_string()))
                    .await
                    .map_err(|e| CourierError::Channel(format!("gateway heartbeat failed: {e}")))?;
            }
            frame = read.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(reason))) => {
                        warn!("discord: gateway closed: {reason:?}");
                        return Ok(Flow::Reconnect);
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        return Err(CourierError::Channel(format!("gateway read failed: {e}")));
                    }
                    None => return Ok(Flow::Reconnect),
                };

                let payload: GatewayPayload = match serde_json::from_str(&text) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("discord: unparseable gateway frame: {e}");
                        continue;
                    }
                };
                if payload.s.is_some() {
                    last_seq = payload.s;
                }

                match payload.op {
                    op::DISPATCH => {
                        match payload.t.as_deref() {
                            Some("READY") => {
                                if let Ok(ready) = serde_json::from_value::<Ready>(payload.d) {
                                    info!("discord: connected as {}", ready.user.username);
                                    bot_user_id = Some(ready.user.id);
                                }
                            }
                            Some("MESSAGE_CREATE") => {
                                let msg: DcMessage = match serde_json::from_value(payload.d) {
                                    Ok(m) => m,
                                    Err(e) => {
                                        warn!("discord: bad MESSAGE_CREATE payload: {e}");
                                        continue;
                                    }
                                };
                                if let Some(incoming) = to_incoming(msg, bot_user_id.as_deref(), prefix) {
                                    if tx.send(incoming).await.is_err() {
                                        return Ok(Flow::ReceiverDropped);
                                    }
                                }
                            }
                            _ => {}
                        }
                    }
                    op::HEARTBEAT => {
                        let beat = serde_json::json!({ "op": op::HEARTBEAT, "d": last_seq });
                        write
                            .send(Message::Text(beat.to_string()))
                            .await
                            .map_err(|e| CourierError::Channel(format!("gateway heartbeat failed: {e}")))?;
                    }
                    op::RECONNECT | op::INVALID_SESSION => return Ok(Flow::Reconnect),
                    op::HEARTBEAT_ACK => {}
                    other => debug!("discord: ignoring gateway op {other}"),
                }
            }
        }
    }
}

/// Heartbeat period advertised in Hello, never zero.
pub(crate) fn heartbeat_period(hello: &Hello) -> Duration {
    Duration::from_millis(hello.heartbeat_interval.max(1))
}

/// Convert a gateway message into a command candidate.
///
/// Drops messages from bots (including ourselves), empty messages, and
/// anything that does not start with the command prefix.
pub(crate) fn to_incoming(
    msg: DcMessage,
    bot_user_id: Option<&str>,
    prefix: &str,
) -> Option<IncomingMessage> {
    let author = msg.author?;
    if author.bot || bot_user_id == Some(author.id.as_str()) {
        return None;
    }

    let text = msg.content.trim_start();
    if text.trim_end().is_empty() || !text.starts_with(prefix) {
        return None;
    }

    Some(IncomingMessage {
        id: Uuid::new_v4(),
        channel: "discord".to_string(),
        sender_id: author.id,
        sender_name: Some(author.global_name.unwrap_or(author.username)),
        text: text.to_string(),
        timestamp: chrono::Utc::now(),
        reply_target: Some(msg.channel_id),
        guild_id: msg.guild_id,
        sender_roles: msg.member.map(|m| m.roles).unwrap_or_default(),
    })
}
