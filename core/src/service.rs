use std::path::Path;

use anyhow::Result;
use chrono::Local;

use crate::db::Database;
use crate::export::{CsvExport, export_csv};
use crate::models::{DashboardStats, Entry, NewEntry, TrendPoint, validate_new_entry};
use crate::stats::{get_stats, sorted_newest_first, trend_series};

/// Owns the in-memory entry list and writes it back after every change.
pub struct MetabolicService {
    db: Database,
    entries: Vec<Entry>,
}

impl MetabolicService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self::with_database(db))
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self::with_database(db))
    }

    #[must_use]
    pub fn with_database(db: Database) -> Self {
        let entries = db.load_entries();
        Self { db, entries }
    }

    /// Discard the in-memory list and read the store again.
    pub fn reload(&mut self) {
        self.entries = self.db.load_entries();
    }

    /// All entries, newest added first.
    #[must_use]
    pub fn list(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn entries_for_user(&self, user: &str) -> Vec<Entry> {
        self.entries
            .iter()
            .filter(|e| e.user_id == user)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Prepend a new entry. The in-memory list only changes once the store
    /// write succeeds.
    pub fn add(&mut self, new: NewEntry) -> Result<Entry> {
        validate_new_entry(&new)?;
        let entry = Entry::create(new);
        let mut next = Vec::with_capacity(self.entries.len() + 1);
        next.push(entry.clone());
        next.extend(self.entries.iter().cloned());
        self.commit(next)?;
        Ok(entry)
    }

    /// Remove an entry by id. Returns false when no entry matched.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next: Vec<Entry> = self
            .entries
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect();
        self.commit(next)?;
        Ok(true)
    }

    fn commit(&mut self, next: Vec<Entry>) -> Result<()> {
        self.db.save_entries(&next)?;
        self.entries = next;
        Ok(())
    }

    #[must_use]
    pub fn stats_for_user(&self, user: &str) -> DashboardStats {
        get_stats(&self.entries_for_user(user))
    }

    #[must_use]
    pub fn history_for_user(&self, user: &str) -> Vec<Entry> {
        sorted_newest_first(&self.entries_for_user(user))
    }

    #[must_use]
    pub fn trend_for_user(&self, user: &str) -> Vec<TrendPoint> {
        trend_series(&self.entries_for_user(user), &Local)
    }

    pub fn export_for_user(&self, user: &str) -> Result<CsvExport> {
        export_csv(&self.entries_for_user(user))
    }
}
