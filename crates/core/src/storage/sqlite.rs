//! # SQLite Store
//!
//! Durable key-value slots in `.storefront/storefront.db`.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{KeyValueStore, SlotUpdate};
use crate::error::StorageError;

/// Schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// Database file name inside the runtime directory
pub const DATABASE_FILE: &str = "storefront.db";

/// How long a writer waits for another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const UPSERT_SLOT: &str = r#"
    INSERT INTO slots (key, value, updated_at)
    VALUES (?1, ?2, datetime('now'))
    ON CONFLICT(key) DO UPDATE SET
        value = ?2,
        updated_at = datetime('now')
"#;

/// SQLite-backed slot store
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at `path`
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("Failed to open storefront database: {:?}", path.as_ref()))?;

        Self::with_connection(conn)
    }

    /// Database that lives only as long as this value
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
            [],
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_version < 1 {
            Self::migrate_v1(&conn)?;
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                [1],
            )?;
        }

        Ok(())
    }

    /// Migration to version 1 - slot table
    fn migrate_v1(conn: &Connection) -> Result<()> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            "#,
            [],
        )?;

        tracing::info!("Storefront database initialized with schema version {}", SCHEMA_VERSION);

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM slots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(UPSERT_SLOT, params![key, value])?;
        Ok(())
    }

    /// Runs inside `BEGIN IMMEDIATE`, so the read and the write hold the
    /// database write lock together.
    fn update(&self, key: &str, apply: &mut SlotUpdate<'_>) -> Result<String, StorageError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<String> = tx
            .query_row(
                "SELECT value FROM slots WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        // Dropping `tx` on error rolls back
        let next = apply(current.as_deref())?;
        tx.execute(UPSERT_SLOT, params![key, next])?;
        tx.commit()?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_open_creates_slot_table() {
        let store = SqliteStore::open_in_memory().unwrap();
        let conn = store.conn.lock().unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"slots".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));
    }

    #[test]
    fn test_slot_upsert() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("installedApps").unwrap(), None);

        store.set("installedApps", "[]").unwrap();
        store.set("installedApps", r#"["Calculator"]"#).unwrap();
        assert_eq!(
            store.get("installedApps").unwrap().as_deref(),
            Some(r#"["Calculator"]"#)
        );
    }

    #[test]
    fn test_update_sees_other_connection_writes() {
        let path = ".storefront/test_storefront_update.db";
        let _ = fs::remove_file(path);

        let first = SqliteStore::open_at(path).unwrap();
        let second = SqliteStore::open_at(path).unwrap();

        first.set("counter", "1").unwrap();
        let written = second
            .update("counter", &mut |current| {
                assert_eq!(current, Some("1"));
                Ok("2".to_string())
            })
            .unwrap();
        assert_eq!(written, "2");
        assert_eq!(first.get("counter").unwrap().as_deref(), Some("2"));

        drop(first);
        drop(second);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_failed_update_rolls_back() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("installedApps", r#"["Paint"]"#).unwrap();

        let result = store.update("installedApps", &mut |_| {
            Err(StorageError::Lock("rejected".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(
            store.get("installedApps").unwrap().as_deref(),
            Some(r#"["Paint"]"#)
        );

        // The connection is usable again after the rollback
        store.set("installedApps", "[]").unwrap();
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = ".storefront/test_storefront_reopen.db";
        let _ = fs::remove_file(path);

        {
            let store = SqliteStore::open_at(path).unwrap();
            store.set("installedApps", r#"["Paint"]"#).unwrap();
        }

        let store = SqliteStore::open_at(path).unwrap();
        assert_eq!(
            store.get("installedApps").unwrap().as_deref(),
            Some(r#"["Paint"]"#)
        );

        let conn = store.conn.lock().unwrap();
        let version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        drop(conn);
        drop(store);
        let _ = fs::remove_file(path);
    }
}
