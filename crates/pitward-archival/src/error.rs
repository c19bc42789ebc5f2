use thiserror::Error;

/// Errors that abort an archival pass.
///
/// Gateway refusals on individual records (`NotFound`, `PermissionDenied`
/// while firing) are handled in place and never surface here.
#[derive(Debug, Error)]
pub enum ArchivalError {
    /// Persistent store failure — the engine backs off before re-selecting.
    #[error("Store error: {0}")]
    Store(#[from] pitward_pits::PitError),

    /// Transport-level gateway failure during resolution.
    #[error("Gateway error: {0}")]
    Gateway(#[from] pitward_channels::GatewayError),
}

pub type Result<T> = std::result::Result<T, ArchivalError>;
