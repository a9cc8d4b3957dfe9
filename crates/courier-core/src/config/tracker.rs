use super::defaults::*;
use serde::{Deserialize, Serialize};

/// How a tracking session publishes its notices.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationMode {
    /// Post a new message for every notice.
    #[default]
    Append,
    /// Edit the announcement message in place.
    Edit,
}

/// Who gets pinged when a command does not name a target.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PingDefault {
    /// `@everyone`.
    #[default]
    Everyone,
    /// The user who started tracking.
    Requester,
}

/// Order tracker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Order status endpoint (POST).
    #[serde(default = "default_tracker_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Pause between polls, also used as the retry delay.
    #[serde(default = "default_tracker_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub destination: DestinationMode,
    #[serde(default)]
    pub default_ping: PingDefault,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_tracker_endpoint(),
            timezone: default_timezone(),
            poll_interval_secs: default_tracker_interval(),
            request_timeout_secs: default_request_timeout(),
            destination: DestinationMode::default(),
            default_ping: PingDefault::default(),
        }
    }
}
