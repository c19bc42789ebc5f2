use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use pitward_channels::ChannelGateway;
use pitward_pits::{ArchiveDuration, ArchiveMode, PitError, PitRecord, PitStore};

use crate::{engine::RestartHandle, error::Result};

/// Store-side operations behind the owner/counselor actions.
///
/// Command parsing and permission checks live elsewhere; this is what those
/// commands do once allowed. Every mutation that changes a pit's duration or
/// archive mode ends by poking the restart handle so the engine re-selects
/// against fresh state.
pub struct PitService<G> {
    store: PitStore,
    gateway: Arc<G>,
    restart: RestartHandle,
}

impl<G: ChannelGateway> PitService<G> {
    pub fn new(store: PitStore, gateway: Arc<G>, restart: RestartHandle) -> Self {
        Self {
            store,
            gateway,
            restart,
        }
    }

    /// Register an existing channel as `owner`'s pit, seeding the activity
    /// cache from the channel's latest message (if any).
    pub async fn adopt(&self, pit_id: u64, owner: u64) -> Result<PitRecord> {
        let latest = self.gateway.latest_message_at(pit_id).await?;
        let record = self
            .store
            .adopt(pit_id, owner, ArchiveDuration::default(), latest)?;
        self.restart.restart();
        Ok(record)
    }

    /// Owner changed the inactivity window.
    pub fn set_duration(&self, pit_id: u64, duration: ArchiveDuration) -> Result<()> {
        self.store.set_duration(pit_id, duration)?;
        self.restart.restart();
        Ok(())
    }

    /// Archive a pit on behalf of a manual or event trigger.
    pub async fn archive(&self, pit_id: u64, mode: ArchiveMode) -> Result<()> {
        if self.store.get(pit_id)?.is_none() {
            return Err(PitError::PitNotFound { id: pit_id }.into());
        }
        self.gateway.archive_channel(pit_id).await?;
        self.store.set_archive_mode(pit_id, Some(mode))?;
        self.restart.restart();
        info!(pit_id, %mode, "pit archived");
        Ok(())
    }

    /// Restore the channel and clear the archive mode.
    pub async fn unarchive(&self, pit_id: u64) -> Result<()> {
        if self.store.get(pit_id)?.is_none() {
            return Err(PitError::PitNotFound { id: pit_id }.into());
        }
        self.gateway.unarchive_channel(pit_id).await?;
        self.store.set_archive_mode(pit_id, None)?;
        self.restart.restart();
        info!(pit_id, "pit un-archived");
        Ok(())
    }

    /// The owning member left the server — park their pit.
    pub async fn owner_left(&self, owner: u64) -> Result<()> {
        let Some(record) = self.store.get_by_owner(owner)? else {
            debug!(owner, "member left without a pit");
            return Ok(());
        };
        if !record.is_active() {
            return Ok(());
        }
        self.archive(record.pit_id, ArchiveMode::Leave).await
    }

    /// The owning member came back — restore their pit, but only if it was
    /// archived because they left.
    pub async fn owner_returned(&self, owner: u64) -> Result<()> {
        let Some(record) = self.store.get_by_owner(owner)? else {
            return Ok(());
        };
        if record.archive_mode != Some(ArchiveMode::Leave) {
            return Ok(());
        }
        self.unarchive(record.pit_id).await
    }

    /// Message-event hook: keep the cached activity timestamp fresh.
    pub fn record_activity(&self, pit_id: u64, at: DateTime<Utc>) -> Result<()> {
        self.store.record_activity(pit_id, at)?;
        Ok(())
    }

    /// Tear the record down. The channel itself is deleted by the caller.
    pub fn release(&self, pit_id: u64) -> Result<()> {
        self.store.remove(pit_id)?;
        self.restart.restart();
        Ok(())
    }
}
