//! Discord API deserialization types.

use serde::{Deserialize, Serialize};

/// Gateway opcodes the listener reacts to.
pub(crate) mod op {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT.
pub(crate) const INTENTS: u64 = (1 << 0) | (1 << 9) | (1 << 12) | (1 << 15);

/// ADMINISTRATOR permission bit.
pub(crate) const ADMINISTRATOR: u64 = 1 << 3;

/// Envelope of every gateway frame.
#[derive(Debug, Deserialize)]
pub(crate) struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: serde_json::Value,
    pub s: Option<u64>,
    pub t: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Hello {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Ready {
    pub user: DcUser,
}

#[derive(Debug, Serialize)]
pub(crate) struct Identify<'a> {
    pub token: &'a str,
    pub intents: u64,
    pub properties: IdentifyProperties,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdentifyProperties {
    pub os: &'static str,
    pub browser: &'static str,
    pub device: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcMessage {
    pub id: String,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub author: Option<DcUser>,
    pub member: Option<DcMember>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcUser {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcMember {
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcRole {
    pub id: String,
    /// Permission bitset as a decimal string.
    pub permissions: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateLimited {
    pub retry_after: f64,
}
