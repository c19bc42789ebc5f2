use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{error::GatewayError, types::ChannelSnapshot};

/// The narrow view of the chat platform the archival subsystem needs.
///
/// Implementations must be `Send + Sync` so a single gateway can be shared
/// between the archival engine and the management service.
#[async_trait]
pub trait ChannelGateway: Send + Sync {
    /// Resolve a channel id to a live snapshot.
    ///
    /// Returns `Ok(None)` when the channel no longer exists — a missing
    /// channel is an answer, not an error.
    async fn channel(&self, channel_id: u64) -> Result<Option<ChannelSnapshot>, GatewayError>;

    /// Timestamp of the most recent message in the channel, or `Ok(None)`
    /// when the channel has never seen one.
    async fn latest_message_at(
        &self,
        channel_id: u64,
    ) -> Result<Option<DateTime<Utc>>, GatewayError>;

    /// Move the channel into the archive category and restrict visibility to
    /// the owning role and administrators.
    async fn archive_channel(&self, channel_id: u64) -> Result<(), GatewayError>;

    /// Move the channel back into the pits category and restore its default
    /// visibility.
    async fn unarchive_channel(&self, channel_id: u64) -> Result<(), GatewayError>;
}
