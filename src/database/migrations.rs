//! Schema versioning for the store database.
//!
//! Migrations are listed in [`MIGRATIONS`] in ascending order. `run_all`
//! applies every entry above the recorded version, each inside its own
//! transaction together with its `schema_version` row.

use rusqlite::{params, Connection};

use super::connection::unix_seconds;

struct Migration {
    version: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Storage items keyed by area and key",
    sql: "CREATE TABLE IF NOT EXISTS storage_items (
              area TEXT NOT NULL,
              key TEXT NOT NULL,
              value TEXT NOT NULL,
              updated_at INTEGER NOT NULL,
              PRIMARY KEY (area, key)
          );
          CREATE INDEX IF NOT EXISTS idx_storage_items_area ON storage_items(area);",
}];

/// Version of the newest entry in [`MIGRATIONS`].
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Highest applied version, or 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Applies pending migrations. Already-current databases are left untouched.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let applied = get_schema_version(conn);
    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
            params![migration.version, unix_seconds(), migration.description],
        )?;
        tx.commit()?;
        tracing::info!(
            "Applied schema migration v{}: {}",
            migration.version,
            migration.description
        );
    }
    Ok(())
}
