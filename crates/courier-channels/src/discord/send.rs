//! REST calls: create/edit messages, rename channels, role lookup.

use super::types::{DcMessage, DcRole, RateLimited, ADMINISTRATOR};
use super::DiscordChannel;
use async_trait::async_trait;
use courier_core::{error::CourierError, message::MessageRef, traits::NotificationSink};
use reqwest::{Method, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Discord's message content limit.
pub(crate) const MAX_MESSAGE_LEN: usize = 2000;

/// How many times a rate-limited request is retried.
const MAX_RATE_LIMIT_RETRIES: u32 = 2;

impl DiscordChannel {
    /// Send a request, waiting out `429 Too Many Requests` a bounded number of times.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, CourierError> {
        let url = format!("{}{path}", self.api_base);
        let mut attempt = 0;

        loop {
            let mut req = self
                .client
                .request(method.clone(), &url)
                .header("Authorization", self.auth_header());
            if let Some(body) = body {
                req = req.json(body);
            }

            let resp = req
                .send()
                .await
                .map_err(|e| CourierError::Channel(format!("discord {method} {path} failed: {e}")))?;

            if resp.status() != StatusCode::TOO_MANY_REQUESTS || attempt >= MAX_RATE_LIMIT_RETRIES {
                return Ok(resp);
            }

            let wait = retry_delay(resp.json::<RateLimited>().await.ok());
            attempt += 1;
            warn!(
                "discord: rate limited on {path}, retrying in {:.2}s ({attempt}/{MAX_RATE_LIMIT_RETRIES})",
                wait.as_secs_f64()
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Post a message and return a handle to it.
    pub(crate) async fn create_message(
        &self,
        channel_id: &str,
        text: &str,
    ) -> Result<MessageRef, CourierError> {
        let body = serde_json::json!({ "content": truncate_message(text, MAX_MESSAGE_LEN) });
        let resp = self
            .request(
                Method::POST,
                &format!("/channels/{channel_id}/messages"),
                Some(&body),
            )
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(CourierError::Channel(format!(
                "discord send got {status}: {error_text}"
            )));
        }

        let message: DcMessage = resp
            .json()
            .await
            .map_err(|e| CourierError::Channel(format!("discord send parse failed: {e}")))?;

        debug!("discord: posted message {} in {}", message.id, message.channel_id);
        Ok(MessageRef {
            channel_id: message.channel_id,
            message_id: message.id,
        })
    }

    /// Replace a message's content.
    pub(crate) async fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
    ) -> Result<(), CourierError> {
        let body = serde_json::json!({ "content": truncate_message(text, MAX_MESSAGE_LEN) });
        let resp = self
            .request(
                Method::PATCH,
                &format!(
                    "/channels/{}/messages/{}",
                    message.channel_id, message.message_id
                ),
                Some(&body),
            )
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(CourierError::Channel(format!(
                "discord edit got {status}: {error_text}"
            )));
        }
        Ok(())
    }

    /// Set a channel's name.
    pub(crate) async fn patch_channel_name(
        &self,
        channel_id: &str,
        name: &str,
    ) -> Result<(), CourierError> {
        let body = serde_json::json!({ "name": name });
        let resp = self
            .request(Method::PATCH, &format!("/channels/{channel_id}"), Some(&body))
            .await
            .map_err(|e| CourierError::RenameFailed(e.to_string()))?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(CourierError::ChannelNotFound(channel_id.to_string())),
            s => {
                let error_text = resp.text().await.unwrap_or_default();
                Err(CourierError::RenameFailed(format!("{s}: {error_text}")))
            }
        }
    }

    /// Whether any of `role_ids` grants ADMINISTRATOR in `guild_id`.
    pub(crate) async fn roles_grant_admin(
        &self,
        guild_id: &str,
        role_ids: &[String],
    ) -> Result<bool, CourierError> {
        let resp = self
            .request(Method::GET, &format!("/guilds/{guild_id}/roles"), None)
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(CourierError::Channel(format!(
                "discord roles got {status}: {error_text}"
            )));
        }

        let roles: Vec<DcRole> = resp
            .json()
            .await
            .map_err(|e| CourierError::Channel(format!("discord roles parse failed: {e}")))?;

        Ok(roles_grant_admin(&roles, guild_id, role_ids))
    }
}

/// How long a 429 asks us to wait. Missing, negative, or absurd values fall back to one second.
pub(crate) fn retry_delay(limited: Option<RateLimited>) -> Duration {
    limited
        .and_then(|r| Duration::try_from_secs_f64(r.retry_after).ok())
        .unwrap_or(Duration::from_secs(1))
}

/// Every member implicitly holds the `@everyone` role, whose id equals the guild id.
pub(crate) fn roles_grant_admin(roles: &[DcRole], guild_id: &str, role_ids: &[String]) -> bool {
    roles
        .iter()
        .filter(|r| r.id == guild_id || role_ids.contains(&r.id))
        .any(|r| {
            r.permissions
                .parse::<u64>()
                .map(|bits| bits & ADMINISTRATOR != 0)
                .unwrap_or(false)
        })
}

#[async_trait]
impl NotificationSink for DiscordChannel {
    async fn publish(&self, channel_id: &str, text: &str) -> Result<MessageRef, CourierError> {
        self.create_message(channel_id, text).await
    }

    async fn update(&self, message: &MessageRef, text: &str) -> Result<(), CourierError> {
        self.edit_message(message, text).await
    }
}

/// Split a message into chunks of at most `max_len` bytes, preferring newlines.
pub(crate) fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    if text.len() <= max_len {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let break_at = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .map(|i| start + i + 1)
                .unwrap_or(end)
        } else {
            end
        };
        chunks.push(&text[start..break_at]);
        start = break_at;
    }

    chunks
}

/// Cut a message down to `max_len` bytes on a char boundary.
pub(crate) fn truncate_message(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
