//! `pitward-pits` — pit records and their SQLite persistence.
//!
//! A *pit* is a per-member managed channel with its own archival policy. One
//! row exists per managed channel while it is active; the row survives
//! archival (with `archive_mode` set) until the pit is unarchived or torn
//! down.

pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::{PitError, Result};
pub use store::PitStore;
pub use types::{ArchiveDuration, ArchiveMode, PitRecord};
