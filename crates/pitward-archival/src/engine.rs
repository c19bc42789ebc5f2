use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use pitward_channels::{ChannelGateway, GatewayError};
use pitward_core::config::ArchivalConfig;
use pitward_pits::{ArchiveMode, PitRecord, PitStore};

use crate::{error::Result, select::select_candidate};

/// Pacing knobs for the engine loop.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Sleep between selection passes while no pit is eligible.
    pub idle_backoff: Duration,
    /// Sleep before re-selecting after a failed pass.
    pub retry_backoff: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            idle_backoff: Duration::from_secs(pitward_core::config::DEFAULT_IDLE_BACKOFF_SECS),
            retry_backoff: Duration::from_secs(pitward_core::config::DEFAULT_RETRY_BACKOFF_SECS),
        }
    }
}

impl From<&ArchivalConfig> for EngineOptions {
    fn from(config: &ArchivalConfig) -> Self {
        Self {
            idle_backoff: Duration::from_secs(config.idle_backoff_secs),
            retry_backoff: Duration::from_secs(config.retry_backoff_secs),
        }
    }
}

/// Requests a re-selection after a pit's duration or archive mode changed.
///
/// Cloneable; every clone points at the same pass token. A restart cancels
/// whatever the engine is doing — a timed wait or an in-flight store call —
/// and the next pass starts from a clean read of the store.
#[derive(Clone)]
pub struct RestartHandle {
    token: Arc<Mutex<CancellationToken>>,
}

impl RestartHandle {
    pub fn new() -> Self {
        Self {
            token: Arc::new(Mutex::new(CancellationToken::new())),
        }
    }

    /// Cancel the in-flight pass and arm a fresh token for the next one.
    /// Safe to call repeatedly in quick succession — each call is one more
    /// cancel-and-relaunch, and only the latest relaunch's selection matters.
    pub fn restart(&self) {
        let mut token = self.token.lock().unwrap();
        token.cancel();
        *token = CancellationToken::new();
        info!("archival restart requested");
    }

    /// Token the current pass races against. Cancelled exactly when a restart
    /// is requested.
    pub fn pass_token(&self) -> CancellationToken {
        self.token.lock().unwrap().clone()
    }
}

impl Default for RestartHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Long-lived auto-archival loop: select the pit with the soonest deadline,
/// wait it out, archive it, repeat.
///
/// The loop holds no cross-iteration state beyond the pass it is currently
/// racing, which is what makes "cancel and relaunch" a complete restart.
pub struct ArchivalEngine<G> {
    store: PitStore,
    gateway: Arc<G>,
    options: EngineOptions,
    handle: RestartHandle,
}

impl<G: ChannelGateway> ArchivalEngine<G> {
    pub fn new(store: PitStore, gateway: Arc<G>, options: EngineOptions) -> Self {
        Self {
            store,
            gateway,
            options,
            handle: RestartHandle::new(),
        }
    }

    /// Handle other components use to request a re-selection.
    pub fn handle(&self) -> RestartHandle {
        self.handle.clone()
    }

    /// Main loop. Runs until `shutdown` broadcasts `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("auto-archival engine started");
        loop {
            let pass = self.handle.pass_token();
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("auto-archival engine shutting down");
                        break;
                    }
                }
                _ = pass.cancelled() => {
                    debug!("pass cancelled, re-selecting");
                }
                outcome = self.pass() => {
                    if let Err(e) = outcome {
                        error!("archival pass failed: {e}");
                        tokio::select! {
                            _ = shutdown.changed() => {
                                if *shutdown.borrow() {
                                    info!("auto-archival engine shutting down");
                                    break;
                                }
                            }
                            _ = pass.cancelled() => {}
                            _ = tokio::time::sleep(self.options.retry_backoff) => {}
                        }
                    }
                }
            }
        }
    }

    /// One full pass: select a candidate, wait out its deadline, archive it.
    async fn pass(&self) -> Result<()> {
        let selection = select_candidate(self.gateway.as_ref(), &self.store).await?;
        let Some(candidate) = selection.candidate else {
            tokio::time::sleep(self.options.idle_backoff).await;
            return Ok(());
        };

        // Negative remainder means the deadline already passed: fire now.
        let wait = (candidate.deadline - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        debug!(
            pit_id = candidate.record.pit_id,
            deadline = %candidate.deadline,
            wait_secs = wait.as_secs(),
            "waiting on next archival deadline"
        );
        tokio::time::sleep(wait).await;

        self.fire(&candidate.record).await
    }

    /// Archive `record` and persist the automatic mode.
    ///
    /// Gateway refusals are logged and skipped — the record is re-evaluated
    /// (and pruned, if the channel is gone) on the next pass. A refused
    /// candidate stays the soonest deadline, so the skip holds off for the
    /// retry interval rather than re-selecting it in a tight loop.
    async fn fire(&self, record: &PitRecord) -> Result<()> {
        match self.gateway.archive_channel(record.pit_id).await {
            Ok(()) => {
                self.store
                    .set_archive_mode(record.pit_id, Some(ArchiveMode::Automatic))?;
                info!(pit_id = record.pit_id, "pit archived for inactivity");
                return Ok(());
            }
            Err(GatewayError::PermissionDenied { channel_id }) => {
                warn!(pit_id = channel_id, "no permission to edit pit channel, skipping");
            }
            Err(GatewayError::NotFound { channel_id }) => {
                warn!(pit_id = channel_id, "pit channel vanished before archival");
            }
            Err(e) => {
                warn!(pit_id = record.pit_id, error = %e, "archival attempt failed");
            }
        }
        tokio::time::sleep(self.options.retry_backoff).await;
        Ok(())
    }
}
