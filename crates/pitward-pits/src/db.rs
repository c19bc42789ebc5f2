use rusqlite::Connection;

use crate::error::Result;

/// Initialise the pits schema in `conn`.
///
/// Safe to call on every startup — uses `IF NOT EXISTS` throughout.
/// `pit_owner` is UNIQUE: one active pit per member.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pits (
            pit_id               INTEGER NOT NULL PRIMARY KEY,
            pit_owner            INTEGER NOT NULL UNIQUE,
            archive_duration     INTEGER NOT NULL,   -- seconds, closed set
            archive_mode         TEXT,               -- NULL while the pit is active
            last_message_sent_at TEXT                -- ISO-8601 or NULL
        ) STRICT;
        ",
    )?;
    Ok(())
}
