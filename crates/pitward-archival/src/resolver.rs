use chrono::{DateTime, Utc};

use pitward_channels::{ChannelGateway, GatewayError};
use pitward_pits::PitRecord;

use crate::error::Result;

/// Outcome of resolving a single pit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The instant at which the pit becomes eligible for archival. May be in
    /// the past — the selector treats that as "fire immediately".
    Deadline(DateTime<Utc>),

    /// The record cannot be scheduled: it is already archived, or its channel
    /// no longer exists.
    Invalid,
}

/// Compute the archival deadline for `record`.
///
/// The anchor is the cached `last_message_sent_at`; when absent, the channel's
/// most recent message is looked up live, falling back to the channel's
/// creation time for channels that have never seen a message. The live result
/// is used for this resolution pass only — it is never written back to the
/// store.
///
/// Transport-level gateway failures propagate; a missing channel does not
/// (it resolves to [`Resolution::Invalid`] so the caller can prune).
pub async fn resolve<G>(gateway: &G, record: &PitRecord) -> Result<Resolution>
where
    G: ChannelGateway + ?Sized,
{
    if record.archive_mode.is_some() {
        return Ok(Resolution::Invalid);
    }

    let Some(channel) = gateway.channel(record.pit_id).await? else {
        return Ok(Resolution::Invalid);
    };

    let anchor = match record.last_message_sent_at {
        Some(at) => at,
        None => match gateway.latest_message_at(record.pit_id).await {
            Ok(Some(at)) => at,
            Ok(None) => channel.created_at,
            // The channel vanished between the two lookups.
            Err(GatewayError::NotFound { .. }) => return Ok(Resolution::Invalid),
            Err(e) => return Err(e.into()),
        },
    };

    Ok(Resolution::Deadline(
        anchor + record.archive_duration.as_duration(),
    ))
}
