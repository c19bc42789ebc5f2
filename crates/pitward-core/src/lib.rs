//! `pitward-core` — shared configuration for the pitward workspace.

pub mod config;
pub mod error;

pub use config::PitwardConfig;
pub use error::{CoreError, Result};
