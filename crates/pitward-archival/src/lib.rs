//! `pitward-archival` — the channel auto-archival scheduler.
//!
//! # Overview
//!
//! A single cooperative background task ([`engine::ArchivalEngine`]) tracks
//! every active pit and guarantees that exactly one archival action — the pit
//! whose deadline is soonest — is pending at any time. Each pass loops through
//! three states:
//!
//! | State       | Behaviour                                                         |
//! |-------------|-------------------------------------------------------------------|
//! | `SELECTING` | Resolve every record, prune the unresolvable, pick the soonest deadline |
//! | `WAITING`   | Sleep until that deadline, or a fixed back-off when nothing is eligible |
//! | `FIRING`    | Move the channel to the archive category, persist `automatic` mode |
//!
//! A [`engine::RestartHandle`] cancels the in-flight pass wholesale, so a
//! configuration change shortens (or lengthens) the effective wait on the very
//! next pass instead of after the stale sleep completes. Deadlines already in
//! the past fire immediately — that is how deadlines missed while the bot was
//! offline are honoured after a restart.

pub mod engine;
pub mod error;
pub mod resolver;
pub mod select;
pub mod service;

pub use engine::{ArchivalEngine, EngineOptions, RestartHandle};
pub use error::{ArchivalError, Result};
pub use resolver::{resolve, Resolution};
pub use select::{select_candidate, Candidate, Selection};
pub use service::PitService;
