//! Discord bot channel.
//!
//! Receives commands over the gateway websocket (`MESSAGE_CREATE`) and
//! answers, publishes, edits, and renames through the REST API.
//! Docs: <https://discord.com/developers/docs/reference>

mod gateway;
pub(crate) mod send;
pub(crate) mod types;


use courier_core::config::DiscordConfig;
use std::sync::Arc;
use tokio::sync::Mutex;

const API_BASE: &str = "https://discord.com/api/v10";
const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Discord channel using the REST API and the gateway websocket.
pub struct DiscordChannel {
    config: DiscordConfig,
    token: String,
    client: reqwest::Client,
    api_base: String,
    gateway_url: String,
    /// Listener task, aborted on `stop`.
    listener: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
}

impl DiscordChannel {
    /// Create a new Discord channel from config and a resolved bot token.
    pub fn new(config: DiscordConfig, token: String) -> Self {
        Self {
            config,
            token,
            client: reqwest::Client::new(),
            api_base: API_BASE.to_string(),
            gateway_url: GATEWAY_URL.to_string(),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Point REST calls at a different base URL (used by tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Point the gateway listener at a different websocket URL.
    pub fn with_gateway_url(mut self, gateway_url: impl Into<String>) -> Self {
        self.gateway_url = gateway_url.into();
        self
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }
}
