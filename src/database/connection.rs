//! The SQLite file behind the persistent store.
//!
//! [`Database`] brings the schema up to date when it opens and owns every
//! statement that touches `storage_items`. Callers deal in raw JSON text;
//! parsing and change tracking stay with the store.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};

use super::migrations;

/// How long a write waits on a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One stored item: key and JSON-encoded value.
pub type StoredRow = (String, String);

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens or creates the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        Self::prepare(Connection::open(path)?)
    }

    /// Opens a database that lives until it is dropped.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn schema_version(&self) -> i32 {
        migrations::get_schema_version(&self.conn)
    }

    /// Every row stored under `area`, ordered by key.
    pub fn load_area(&self, area: &str) -> Result<Vec<StoredRow>, rusqlite::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM storage_items WHERE area = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![area], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let loaded = rows.collect::<Result<Vec<StoredRow>, _>>()?;
        Ok(loaded)
    }

    /// Upserts `rows` into `area` atomically.
    ///
    /// Returns the value each key held before the write, in input order,
    /// with `None` for keys that were not stored yet.
    pub fn store_rows(
        &mut self,
        area: &str,
        rows: &[(&str, String)],
    ) -> Result<Vec<Option<String>>, rusqlite::Error> {
        let stamp = unix_seconds();
        let tx = self.conn.transaction()?;
        let mut previous = Vec::with_capacity(rows.len());
        for (key, value) in rows {
            let before: Option<String> = tx
                .query_row(
                    "SELECT value FROM storage_items WHERE area = ?1 AND key = ?2",
                    params![area, key],
                    |row| row.get(0),
                )
                .optional()?;
            tx.execute(
                "INSERT INTO storage_items (area, key, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(area, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![area, key, value, stamp],
            )?;
            previous.push(before);
        }
        tx.commit()?;
        Ok(previous)
    }
}

pub(crate) fn unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
