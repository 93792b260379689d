//! PageShade database layer.
//!
//! SQLite access for [`SqliteStore`](crate::services::sqlite_store::SqliteStore):
//! row reads and writes on `storage_items` plus versioned migrations.
//!
//! ```no_run
//! use pageshade::database::Database;
//!
//! let db = Database::open("pageshade.db").expect("failed to open database");
//! let rows = db.load_area("sync").expect("failed to read rows");
//! ```

pub mod connection;
pub mod migrations;

pub use connection::{Database, StoredRow};
