use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::{
    db::init_db,
    error::{PitError, Result},
    types::{ArchiveDuration, ArchiveMode, PitRecord},
};

/// Shared handle over the pits table.
///
/// Wraps its `Connection` in a mutex so command handlers and the archival
/// engine can read and mutate records without conflicting.
#[derive(Clone)]
pub struct PitStore {
    conn: Arc<Mutex<Connection>>,
}

impl PitStore {
    /// Create a new store, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Return all known pit records ordered by pit id.
    pub fn list(&self) -> Result<Vec<PitRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT pit_id, pit_owner, archive_duration, archive_mode, last_message_sent_at
             FROM pits ORDER BY pit_id",
        )?;
        let records = stmt
            .query_map([], scan_row)?
            .filter_map(|r| r.ok().and_then(decode))
            .collect();
        Ok(records)
    }

    /// Look up a record by channel id.
    pub fn get(&self, pit_id: u64) -> Result<Option<PitRecord>> {
        let conn = self.conn.lock().unwrap();
        let raw = conn
            .query_row(
                "SELECT pit_id, pit_owner, archive_duration, archive_mode, last_message_sent_at
                 FROM pits WHERE pit_id = ?1",
                [pit_id as i64],
                scan_row,
            )
            .optional()?;
        Ok(raw.and_then(decode))
    }

    /// Look up a record by owning member id.
    pub fn get_by_owner(&self, owner: u64) -> Result<Option<PitRecord>> {
        let conn = self.conn.lock().unwrap();
        let raw = conn
            .query_row(
                "SELECT pit_id, pit_owner, archive_duration, archive_mode, last_message_sent_at
                 FROM pits WHERE pit_owner = ?1",
                [owner as i64],
                scan_row,
            )
            .optional()?;
        Ok(raw.and_then(decode))
    }

    /// Register `pit_id` as a pit owned by `owner`, or re-claim an existing
    /// record for a new owner. Existing rows keep their duration and activity
    /// cache; the seed timestamp only applies on first insert.
    pub fn adopt(
        &self,
        pit_id: u64,
        owner: u64,
        duration: ArchiveDuration,
        last_message_sent_at: Option<DateTime<Utc>>,
    ) -> Result<PitRecord> {
        let conn = self.conn.lock().unwrap();
        let last = last_message_sent_at.map(|dt| dt.to_rfc3339());
        let res = conn.execute(
            "INSERT INTO pits (pit_id, pit_owner, archive_duration, archive_mode, last_message_sent_at)
             VALUES (?1, ?2, ?3, NULL, ?4)
             ON CONFLICT (pit_id) DO UPDATE SET pit_owner = ?2",
            rusqlite::params![pit_id as i64, owner as i64, duration.as_secs(), last],
        );
        match res {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(PitError::OwnerHasPit { owner });
            }
            Err(e) => return Err(e.into()),
        }
        info!(pit_id, owner, "pit adopted");

        let raw = conn.query_row(
            "SELECT pit_id, pit_owner, archive_duration, archive_mode, last_message_sent_at
             FROM pits WHERE pit_id = ?1",
            [pit_id as i64],
            scan_row,
        )?;
        decode(raw).ok_or(PitError::PitNotFound { id: pit_id })
    }

    /// Change the inactivity window of an existing pit.
    pub fn set_duration(&self, pit_id: u64, duration: ArchiveDuration) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE pits SET archive_duration = ?1 WHERE pit_id = ?2",
            rusqlite::params![duration.as_secs(), pit_id as i64],
        )?;
        if n == 0 {
            return Err(PitError::PitNotFound { id: pit_id });
        }
        info!(pit_id, %duration, "archive duration changed");
        Ok(())
    }

    /// Set or clear the archive mode of an existing pit.
    pub fn set_archive_mode(&self, pit_id: u64, mode: Option<ArchiveMode>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE pits SET archive_mode = ?1 WHERE pit_id = ?2",
            rusqlite::params![mode.map(|m| m.to_string()), pit_id as i64],
        )?;
        if n == 0 {
            return Err(PitError::PitNotFound { id: pit_id });
        }
        debug!(pit_id, mode = %mode.map(|m| m.to_string()).unwrap_or_else(|| "none".into()), "archive mode updated");
        Ok(())
    }

    /// Advance the cached activity timestamp, never moving it backwards.
    ///
    /// Unknown ids are ignored — most guild channels are not pits, and the
    /// message-event hook calls this for every channel it sees.
    pub fn record_activity(&self, pit_id: u64, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE pits SET last_message_sent_at = ?2
             WHERE pit_id = ?1
               AND (last_message_sent_at IS NULL OR last_message_sent_at <= ?2)",
            rusqlite::params![pit_id as i64, at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Delete a record by channel id.
    pub fn remove(&self, pit_id: u64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM pits WHERE pit_id = ?1", [pit_id as i64])?;
        if n == 0 {
            return Err(PitError::PitNotFound { id: pit_id });
        }
        info!(pit_id, "pit removed");
        Ok(())
    }

    /// Delete the given records. Used by the selector to prune pits whose
    /// channel no longer resolves.
    pub fn remove_many(&self, pit_ids: &[u64]) -> Result<usize> {
        if pit_ids.is_empty() {
            return Ok(0);
        }
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("DELETE FROM pits WHERE pit_id = ?1")?;
        let mut deleted = 0;
        for id in pit_ids {
            deleted += stmt.execute([*id as i64])?;
        }
        debug!(count = deleted, "pruned pit records");
        Ok(deleted)
    }
}

type RawPit = (i64, i64, i64, Option<String>, Option<String>);

fn scan_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPit> {
    Ok((
        row.get(0)?, // pit_id
        row.get(1)?, // pit_owner
        row.get(2)?, // archive_duration (seconds)
        row.get(3)?, // archive_mode
        row.get(4)?, // last_message_sent_at
    ))
}

fn decode(raw: RawPit) -> Option<PitRecord> {
    let (pit_id, pit_owner, duration_secs, mode, last) = raw;
    let archive_duration = ArchiveDuration::from_secs(duration_secs)?;
    let archive_mode = match mode {
        Some(s) => Some(s.parse().ok()?),
        None => None,
    };
    let last_message_sent_at = match last {
        Some(s) => Some(DateTime::parse_from_rfc3339(&s).ok()?.with_timezone(&Utc)),
        None => None,
    };
    Some(PitRecord {
        pit_id: pit_id as u64,
        pit_owner: pit_owner as u64,
        archive_duration,
        archive_mode,
        last_message_sent_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn mem_store() -> PitStore {
        PitStore::new(Connection::open_in_memory().expect("open in-memory db")).expect("init store")
    }

    #[test]
    fn adopt_then_get_roundtrip() {
        let store = mem_store();
        let seeded = Utc::now();
        store
            .adopt(100, 1, ArchiveDuration::OneWeek, Some(seeded))
            .unwrap();

        let record = store.get(100).unwrap().expect("record exists");
        assert_eq!(record.pit_owner, 1);
        assert_eq!(record.archive_duration, ArchiveDuration::OneWeek);
        assert!(record.is_active());
        assert_eq!(
            record.last_message_sent_at.map(|dt| dt.timestamp()),
            Some(seeded.timestamp())
        );
    }

    #[test]
    fn one_pit_per_owner() {
        let store = mem_store();
        store
            .adopt(100, 1, ArchiveDuration::ThreeDays, None)
            .unwrap();
        let err = store
            .adopt(200, 1, ArchiveDuration::ThreeDays, None)
            .unwrap_err();
        assert!(matches!(err, PitError::OwnerHasPit { owner: 1 }));
    }

    #[test]
    fn adopt_reclaims_existing_channel() {
        let store = mem_store();
        store
            .adopt(100, 1, ArchiveDuration::OneDay, Some(Utc::now()))
            .unwrap();
        let record = store
            .adopt(100, 2, ArchiveDuration::ThreeDays, None)
            .unwrap();
        assert_eq!(record.pit_owner, 2);
        // The existing row keeps its duration and activity cache.
        assert_eq!(record.archive_duration, ArchiveDuration::OneDay);
        assert!(record.last_message_sent_at.is_some());
    }

    #[test]
    fn set_duration_unknown_pit_errors() {
        let store = mem_store();
        let err = store
            .set_duration(42, ArchiveDuration::OneDay)
            .unwrap_err();
        assert!(matches!(err, PitError::PitNotFound { id: 42 }));
    }

    #[test]
    fn archive_mode_set_and_clear() {
        let store = mem_store();
        store
            .adopt(100, 1, ArchiveDuration::ThreeDays, None)
            .unwrap();

        store
            .set_archive_mode(100, Some(ArchiveMode::Manual))
            .unwrap();
        let record = store.get(100).unwrap().unwrap();
        assert_eq!(record.archive_mode, Some(ArchiveMode::Manual));
        assert!(!record.is_active());

        store.set_archive_mode(100, None).unwrap();
        assert!(store.get(100).unwrap().unwrap().is_active());
    }

    #[test]
    fn record_activity_is_monotonic() {
        let store = mem_store();
        let t0 = Utc::now();
        store
            .adopt(100, 1, ArchiveDuration::ThreeDays, None)
            .unwrap();

        store.record_activity(100, t0).unwrap();
        // An older timestamp must not rewind the cache.
        store.record_activity(100, t0 - Duration::hours(1)).unwrap();
        let record = store.get(100).unwrap().unwrap();
        assert_eq!(
            record.last_message_sent_at.map(|dt| dt.timestamp()),
            Some(t0.timestamp())
        );

        let t1 = t0 + Duration::minutes(5);
        store.record_activity(100, t1).unwrap();
        let record = store.get(100).unwrap().unwrap();
        assert_eq!(
            record.last_message_sent_at.map(|dt| dt.timestamp()),
            Some(t1.timestamp())
        );
    }

    #[test]
    fn record_activity_ignores_unknown_channel() {
        let store = mem_store();
        store.record_activity(999, Utc::now()).unwrap();
    }

    #[test]
    fn remove_many_only_deletes_listed_ids() {
        let store = mem_store();
        store
            .adopt(100, 1, ArchiveDuration::ThreeDays, None)
            .unwrap();
        store
            .adopt(200, 2, ArchiveDuration::ThreeDays, None)
            .unwrap();
        store
            .adopt(300, 3, ArchiveDuration::ThreeDays, None)
            .unwrap();

        let deleted = store.remove_many(&[100, 300, 999]).unwrap();
        assert_eq!(deleted, 2);
        assert!(store.get(100).unwrap().is_none());
        assert!(store.get(200).unwrap().is_some());
        assert!(store.get(300).unwrap().is_none());
    }

    #[test]
    fn get_by_owner_finds_record() {
        let store = mem_store();
        store
            .adopt(100, 7, ArchiveDuration::ThreeDays, None)
            .unwrap();
        let record = store.get_by_owner(7).unwrap().expect("record exists");
        assert_eq!(record.pit_id, 100);
        assert!(store.get_by_owner(8).unwrap().is_none());
    }
}
