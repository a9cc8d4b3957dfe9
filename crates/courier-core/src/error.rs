use thiserror::Error;

/// Top-level error type for Courier.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Unparseable order identifier, bad state keyword, or malformed command.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Caller is not allowed to run the requested command.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Destination channel is not configured or no longer exists.
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// The platform refused to rename a channel.
    #[error("rename failed: {0}")]
    RenameFailed(String),

    /// A tracking session is already running in this channel.
    #[error("already tracking an order in channel {0}")]
    AlreadyTracking(String),

    /// Error from the order status provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Payment store error.
    #[error("store error: {0}")]
    Store(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
