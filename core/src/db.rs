use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use rusqlite::{Connection, params};
use tracing::{debug, error, warn};

use crate::models::{Entry, STORAGE_KEY, seed_entries, validate_stored_entries};

/// SQLite file holding a single-table key-value store.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS kv_store (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Raw key-value access ---

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv_store WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    // --- Entries ---

    /// Load the stored entry list.
    ///
    /// Missing, unreadable, or invalid data yields the seed list; the failure
    /// is logged and never returned to the caller.
    #[must_use]
    pub fn load_entries(&self) -> Vec<Entry> {
        let raw = match self.get_value(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return seed_entries(),
            Err(err) => {
                warn!("failed to read stored entries: {err:#}");
                return seed_entries();
            }
        };

        match parse_entries(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse stored entries: {err:#}");
                seed_entries()
            }
        }
    }

    /// Overwrite the stored entry list.
    ///
    /// An empty list is not written: the previous contents stay in place, so
    /// removing the last entry is undone on the next load.
    pub fn save_entries(&self, entries: &[Entry]) -> Result<()> {
        if entries.is_empty() {
            debug!("entry list is empty; leaving stored data untouched");
            return Ok(());
        }
        let payload = serde_json::to_string(entries).context("Failed to serialize entries")?;
        self.set_value(STORAGE_KEY, &payload)
            .context("Failed to write entries")?;
        debug!(count = entries.len(), "saved entries");
        Ok(())
    }

    /// Reject every later write on this connection.
    #[cfg(test)]
    pub(crate) fn make_read_only(&self) {
        self.conn
            .pragma_update(None, "query_only", true)
            .unwrap();
    }
}

fn parse_entries(raw: &str) -> Result<Vec<Entry>> {
    let entries: Vec<Entry> = serde_json::from_str(raw)?;
    validate_stored_entries(&entries)?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewEntry;
    use chrono::{TimeZone, Utc};

    fn sample_entries() -> Vec<Entry> {
        let a = Entry::create(NewEntry {
            timestamp: Utc.with_ymd_and_hms(2025, 12, 12, 7, 15, 0).unwrap(),
            user_id: "Theresa".to_string(),
            is_fasted: false,
            glucose: 101.0,
            ketones: 0.8,
            weight: 142.4,
            body_fat_percentage: Some(24.1),
            blood_pressure: Some("118/76".to_string()),
        });
        let b = Entry::create(NewEntry {
            timestamp: Utc.with_ymd_and_hms(2025, 12, 11, 6, 45, 0).unwrap(),
            user_id: "TC".to_string(),
            is_fasted: true,
            glucose: 88.0,
            ketones: 0.0,
            weight: 196.2,
            body_fat_percentage: None,
            blood_pressure: None,
        });
        vec![a, b]
    }

    #[test]
    fn test_kv_set_get() {
        let db = Database::open_in_memory().unwrap();
        db.set_value("k", "v").unwrap();
        assert_eq!(db.get_value("k").unwrap().as_deref(), Some("v"));
        assert!(db.get_value("missing").unwrap().is_none());
    }

    #[test]
    fn test_kv_upsert() {
        let db = Database::open_in_memory().unwrap();
        db.set_value("k", "v1").unwrap();
        db.set_value("k", "v2").unwrap();
        assert_eq!(db.get_value("k").unwrap().as_deref(), Some("v2"));
        let rows: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM kv_store WHERE key = 'k'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_load_empty_store_returns_seed() {
        let db = Database::open_in_memory().unwrap();
        let entries = db.load_entries();
        assert_eq!(entries, seed_entries());
        assert_eq!(entries[0].id, "seed-1");
    }

    #[test]
    fn test_load_corrupt_store_returns_seed() {
        let db = Database::open_in_memory().unwrap();
        for raw in [
            "not json",
            "{\"id\":\"x\"}",
            "[{\"id\":\"x\"}]",
            "[1, 2, 3]",
            "",
        ] {
            db.set_value(STORAGE_KEY, raw).unwrap();
            assert_eq!(db.load_entries(), seed_entries(), "input: {raw}");
        }
    }

    #[test]
    fn test_load_empty_array_stays_empty() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(STORAGE_KEY, "[]").unwrap();
        assert!(db.load_entries().is_empty());
    }

    #[test]
    fn test_read_only_store_rejects_save() {
        let db = Database::open_in_memory().unwrap();
        db.make_read_only();
        assert!(db.save_entries(&sample_entries()).is_err());
        assert!(db.get_value(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_load_wrong_field_type_returns_seed() {
        let db = Database::open_in_memory().unwrap();
        let raw = r#"[{"id":"a","timestamp":"2025-12-10T08:00:00.000Z","userId":"TC",
            "isFasted":"yes","glucose":93,"ketones":1.2,"ratio":77.5,"weight":197}]"#;
        db.set_value(STORAGE_KEY, raw).unwrap();
        assert_eq!(db.load_entries(), seed_entries());
    }

    #[test]
    fn test_load_duplicate_ids_returns_seed() {
        let db = Database::open_in_memory().unwrap();
        let mut entries = sample_entries();
        entries[1].id = entries[0].id.clone();
        let raw = serde_json::to_string(&entries).unwrap();
        db.set_value(STORAGE_KEY, &raw).unwrap();
        assert_eq!(db.load_entries(), seed_entries());
    }

    #[test]
    fn test_load_accepts_hand_written_blob() {
        let db = Database::open_in_memory().unwrap();
        let raw = r#"[{"id":"abc1234","timestamp":"2025-12-10T08:00:00Z","userId":"Guest",
            "isFasted":false,"glucose":110,"ketones":0.5,"ratio":220,"weight":170,
            "bloodPressure":"130/85"}]"#;
        db.set_value(STORAGE_KEY, raw).unwrap();
        let entries = db.load_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "abc1234");
        assert_eq!(entries[0].user_id, "Guest");
        assert_eq!(entries[0].blood_pressure.as_deref(), Some("130/85"));
        assert!(entries[0].body_fat_percentage.is_none());
    }

    #[test]
    fn test_save_load_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let entries = sample_entries();
        db.save_entries(&entries).unwrap();
        assert_eq!(db.load_entries(), entries);
    }

    #[test]
    fn test_save_writes_camel_case_blob() {
        let db = Database::open_in_memory().unwrap();
        db.save_entries(&seed_entries()).unwrap();
        let raw = db.get_value(STORAGE_KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["id"], "seed-1");
        assert_eq!(json[0]["timestamp"], "2025-12-10T08:00:00.000Z");
        assert_eq!(json[0]["ratio"], 77.5);
    }

    #[test]
    fn test_save_empty_list_is_skipped() {
        let db = Database::open_in_memory().unwrap();
        let entries = sample_entries();
        db.save_entries(&entries).unwrap();
        db.save_entries(&[]).unwrap();
        assert_eq!(db.load_entries(), entries);
    }

    #[test]
    fn test_save_empty_on_fresh_store_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        db.save_entries(&[]).unwrap();
        assert!(db.get_value(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_round_trip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metabolic.db");
        let entries = sample_entries();
        {
            let db = Database::open(&path).unwrap();
            db.save_entries(&entries).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.load_entries(), entries);
    }

    #[test]
    fn test_migration_creates_kv_store_table() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
