use thiserror::Error;

/// Errors that can occur within the pit store.
#[derive(Debug, Error)]
pub enum PitError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No pit with the given channel id exists in the store.
    #[error("Pit not found: {id}")]
    PitNotFound { id: u64 },

    /// The member already owns an active pit (pit_owner is unique).
    #[error("Member {owner} already owns a pit")]
    OwnerHasPit { owner: u64 },
}

pub type Result<T> = std::result::Result<T, PitError>;
