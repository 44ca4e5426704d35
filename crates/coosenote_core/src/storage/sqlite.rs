//! SQLite-backed key-value adapter.
//!
//! # Responsibility
//! - Persist collection blobs in the `kv_blobs` table.
//! - Verify connection readiness before accepting reads/writes.
//!
//! # Invariants
//! - Construction rejects connections whose schema version or `kv_blobs`
//!   shape does not match this binary's migrations.
//! - `set` is an upsert; the previous value for a key is fully replaced.

use super::{PersistenceAdapter, StorageError, StorageResult};
use crate::db::migrations::latest_version;
use rusqlite::{params, Connection, OptionalExtension};

/// Adapter over a migrated SQLite connection.
pub struct SqliteAdapter<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAdapter<'conn> {
    /// Constructs an adapter from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> StorageResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PersistenceAdapter for SqliteAdapter<'_> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_blobs WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_blobs (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

fn ensure_connection_ready(conn: &Connection) -> StorageResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 =
        conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StorageError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "kv_blobs")? {
        return Err(StorageError::MissingRequiredTable("kv_blobs"));
    }

    for column in ["key", "value", "updated_at"] {
        if !table_has_column(conn, "kv_blobs", column)? {
            return Err(StorageError::MissingRequiredColumn {
                table: "kv_blobs",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StorageResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StorageResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
