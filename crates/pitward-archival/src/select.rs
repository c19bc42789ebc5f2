use chrono::{DateTime, Utc};
use tracing::warn;

use pitward_channels::ChannelGateway;
use pitward_pits::{PitRecord, PitStore};

use crate::{
    error::Result,
    resolver::{resolve, Resolution},
};

/// The record the engine will wait on, with its resolved deadline.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub record: PitRecord,
    pub deadline: DateTime<Utc>,
}

/// Result of one selection pass.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Record with the soonest deadline among all valid records, if any.
    pub candidate: Option<Candidate>,
    /// Ids deleted from the store during this pass.
    pub pruned: Vec<u64>,
}

/// Scan all records, prune the unresolvable, and pick the record with the
/// earliest deadline. Ties break by ascending pit id.
///
/// Archived records (non-null archive mode) are skipped but kept — they stay
/// in the store until explicitly unarchived or torn down. Records whose
/// channel is gone are deleted before this function returns, whether or not a
/// candidate was found.
pub async fn select_candidate<G>(gateway: &G, store: &PitStore) -> Result<Selection>
where
    G: ChannelGateway + ?Sized,
{
    let records = store.list()?;
    let mut pruned = Vec::new();
    let mut best: Option<Candidate> = None;

    for record in records {
        if !record.is_active() {
            continue;
        }

        match resolve(gateway, &record).await? {
            Resolution::Invalid => pruned.push(record.pit_id),
            Resolution::Deadline(deadline) => {
                let earlier = match &best {
                    None => true,
                    Some(current) => {
                        deadline < current.deadline
                            || (deadline == current.deadline
                                && record.pit_id < current.record.pit_id)
                    }
                };
                if earlier {
                    best = Some(Candidate { record, deadline });
                }
            }
        }
    }

    if !pruned.is_empty() {
        let count = store.remove_many(&pruned)?;
        warn!(count, "pruned pits whose channel no longer resolves");
    }

    Ok(Selection {
        candidate: best,
        pruned,
    })
}
