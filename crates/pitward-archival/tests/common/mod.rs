#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pitward_channels::{ChannelGateway, ChannelSnapshot, GatewayError};
use pitward_pits::PitStore;

/// In-memory stand-in for the chat platform.
#[derive(Default)]
pub struct MockGateway {
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    channels: HashMap<u64, MockChannel>,
    archived: Vec<u64>,
    unarchived: Vec<u64>,
}

struct MockChannel {
    created_at: DateTime<Utc>,
    latest_message_at: Option<DateTime<Utc>>,
    deny_edit: bool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_channel(&self, id: u64, created_at: DateTime<Utc>) {
        self.inner.lock().unwrap().channels.insert(
            id,
            MockChannel {
                created_at,
                latest_message_at: None,
                deny_edit: false,
            },
        );
    }

    pub fn set_latest_message(&self, id: u64, at: DateTime<Utc>) {
        if let Some(channel) = self.inner.lock().unwrap().channels.get_mut(&id) {
            channel.latest_message_at = Some(at);
        }
    }

    pub fn deny_edit(&self, id: u64) {
        if let Some(channel) = self.inner.lock().unwrap().channels.get_mut(&id) {
            channel.deny_edit = true;
        }
    }

    pub fn allow_edit(&self, id: u64) {
        if let Some(channel) = self.inner.lock().unwrap().channels.get_mut(&id) {
            channel.deny_edit = false;
        }
    }

    pub fn remove_channel(&self, id: u64) {
        self.inner.lock().unwrap().channels.remove(&id);
    }

    /// Channels archived so far, in firing order.
    pub fn archived(&self) -> Vec<u64> {
        self.inner.lock().unwrap().archived.clone()
    }

    pub fn unarchived(&self) -> Vec<u64> {
        self.inner.lock().unwrap().unarchived.clone()
    }
}

#[async_trait]
impl ChannelGateway for MockGateway {
    async fn channel(&self, channel_id: u64) -> Result<Option<ChannelSnapshot>, GatewayError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.channels.get(&channel_id).map(|c| ChannelSnapshot {
            channel_id,
            created_at: c.created_at,
        }))
    }

    async fn latest_message_at(
        &self,
        channel_id: u64,
    ) -> Result<Option<DateTime<Utc>>, GatewayError> {
        let inner = self.inner.lock().unwrap();
        match inner.channels.get(&channel_id) {
            Some(c) => Ok(c.latest_message_at),
            None => Err(GatewayError::NotFound { channel_id }),
        }
    }

    async fn archive_channel(&self, channel_id: u64) -> Result<(), GatewayError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(channel) = inner.channels.get(&channel_id) else {
            return Err(GatewayError::NotFound { channel_id });
        };
        if channel.deny_edit {
            return Err(GatewayError::PermissionDenied { channel_id });
        }
        inner.archived.push(channel_id);
        Ok(())
    }

    async fn unarchive_channel(&self, channel_id: u64) -> Result<(), GatewayError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(channel) = inner.channels.get(&channel_id) else {
            return Err(GatewayError::NotFound { channel_id });
        };
        if channel.deny_edit {
            return Err(GatewayError::PermissionDenied { channel_id });
        }
        inner.unarchived.push(channel_id);
        Ok(())
    }
}

pub fn mem_store() -> PitStore {
    PitStore::new(rusqlite::Connection::open_in_memory().expect("open in-memory db"))
        .expect("init store")
}

/// Poll `cond` once per (virtual) second until it holds or `max_steps` runs out.
pub async fn wait_until(mut cond: impl FnMut() -> bool, max_steps: u32) -> bool {
    for _ in 0..max_steps {
        if cond() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }
    cond()
}
