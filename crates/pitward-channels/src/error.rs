use thiserror::Error;

/// Errors that can occur while talking to the chat platform.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The channel no longer exists (or never did).
    #[error("Channel not found: {channel_id}")]
    NotFound { channel_id: u64 },

    /// The bot lacks the rights to read or edit the channel.
    #[error("Permission denied for channel {channel_id}")]
    PermissionDenied { channel_id: u64 },

    /// Any other transport-level failure (rate limit, network, 5xx, …).
    #[error("HTTP error: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
