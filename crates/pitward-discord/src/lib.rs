//! `pitward-discord` — Discord implementation of the channel gateway.
//!
//! REST-only: the archival subsystem never needs a gateway websocket, just
//! channel lookups, one-message history reads, and channel edits.

pub mod gateway;

pub use gateway::DiscordGateway;
