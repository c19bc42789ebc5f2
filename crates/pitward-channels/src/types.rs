use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of a live guild channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// Platform-native channel id.
    pub channel_id: u64,

    /// When the channel was created. Used as the activity anchor for pits
    /// that have never seen a message.
    pub created_at: DateTime<Utc>,
}
