use super::CommandContext;
use crate::gateway::Caller;
use courier_core::{config::ShopConfig, error::CourierError, traits::Channel};
use tracing::info;

/// The two states the shop channel name can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopStatus {
    Open,
    Closed,
}

impl ShopStatus {
    /// Case-insensitive `open` / `closed`.
    pub fn parse(raw: &str) -> Result<Self, CourierError> {
        match raw.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(CourierError::InvalidInput(format!(
                "Unknown status '{other}'. Use `open` or `closed`."
            ))),
        }
    }

    pub fn label<'a>(&self, shop: &'a ShopConfig) -> &'a str {
        match self {
            Self::Open => &shop.open_label,
            Self::Closed => &shop.closed_label,
        }
    }
}

/// Rename the shop channel to reflect `requested`.
///
/// Checks run in order: caller, requested state, configured channel, rename.
/// Returns the new channel name.
pub async fn set_shop_status(
    channel: &dyn Channel,
    shop: &ShopConfig,
    requested: &str,
    caller: &Caller,
) -> Result<String, CourierError> {
    if !caller.can_manage() {
        return Err(CourierError::Unauthorized(
            "You are not allowed to change the shop status.".into(),
        ));
    }

    let status = ShopStatus::parse(requested)?;

    if shop.channel_id.is_empty() {
        return Err(CourierError::ChannelNotFound(
            "no shop channel configured".into(),
        ));
    }

    let label = status.label(shop);
    channel
        .rename_channel(&shop.channel_id, label)
        .await
        .map_err(|e| match e {
            CourierError::ChannelNotFound(id) => CourierError::ChannelNotFound(id),
            CourierError::RenameFailed(msg) => CourierError::RenameFailed(msg),
            other => CourierError::RenameFailed(other.to_string()),
        })?;

    info!("shop: channel {} renamed to {label}", shop.channel_id);
    Ok(label.to_string())
}

/// `status <open|closed>`.
pub(super) async fn handle_status(ctx: &CommandContext<'_>) -> Result<Option<String>, CourierError> {
    let label = set_shop_status(ctx.channel, &ctx.config.shop, ctx.args, ctx.caller).await?;
    Ok(Some(format!("✅ Shop status set to **{label}**.")))
}
