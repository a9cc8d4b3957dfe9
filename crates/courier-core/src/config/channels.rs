use super::defaults::*;
use serde::{Deserialize, Serialize};

/// Discord bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token. Falls back to the `DISCORD_TOKEN` env var when empty.
    #[serde(default)]
    pub bot_token: String,
    /// Prefix that marks a message as a command (e.g. `!order ...`).
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// User ids allowed to run every command, including `info`.
    #[serde(default)]
    pub owners: Vec<String>,
    /// Role ids allowed to run `order` and `status`.
    #[serde(default)]
    pub staff_roles: Vec<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            command_prefix: default_command_prefix(),
            owners: Vec::new(),
            staff_roles: Vec::new(),
        }
    }
}

impl DiscordConfig {
    /// Resolve the bot token, preferring the config value over `DISCORD_TOKEN`.
    pub fn resolved_token(&self) -> Option<String> {
        if !self.bot_token.is_empty() {
            return Some(self.bot_token.clone());
        }
        std::env::var("DISCORD_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Shop status toggle config.
///
/// The shop is "open" or "closed" depending on the name of `channel_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Channel whose name reflects the shop status. Empty = not configured.
    #[serde(default)]
    pub channel_id: String,
    #[serde(default = "default_open_label")]
    pub open_label: String,
    #[serde(default = "default_closed_label")]
    pub closed_label: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            open_label: default_open_label(),
            closed_label: default_closed_label(),
        }
    }
}
