//! Persisted mapping from content hash to mod record.
//!
//! The on-disk form is one JSON array at a fixed per-user location, loaded
//! wholesale at startup and overwritten wholesale at teardown. Mutation only
//! ever happens in memory. Single-process by design: concurrent processes
//! sharing the same snapshot file can lose each other's updates.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{CoreError, CoreResult, ModRecord};

pub struct ModStore {
    records: HashMap<String, ModRecord>,
    path: PathBuf,
}

impl ModStore {
    /// Default snapshot location under the per-user data directory.
    pub fn default_path() -> CoreResult<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| CoreError::InvalidArgument("No user data directory".to_string()))?;
        Ok(base.join("modpacker").join("mods_db.json"))
    }

    /// Load the snapshot at `path`, or start empty when none exists yet.
    pub fn load(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let mut records = HashMap::new();
        if path.exists() {
            let text = fs::read_to_string(&path)?;
            let snapshot: Vec<ModRecord> = serde_json::from_str(&text)?;
            log::debug!("Loaded {} records from {}", snapshot.len(), path.display());
            for record in snapshot {
                records.insert(record.content_hash.clone(), record);
            }
        }
        Ok(Self { records, path })
    }

    pub fn find(&self, content_hash: &str) -> Option<&ModRecord> {
        self.records.get(content_hash)
    }

    /// Replace any entry sharing the record's content hash. Replace, not
    /// merge: the incoming record wins wholesale.
    pub fn replace(&mut self, record: ModRecord) {
        self.records.remove(&record.content_hash);
        self.records.insert(record.content_hash.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &ModRecord> {
        self.records.values()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full snapshot. The write goes to a sibling temp file first
    /// and is renamed into place, so a crash mid-save cannot truncate the
    /// previous snapshot.
    pub fn save(&self) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut snapshot: Vec<&ModRecord> = self.records.values().collect();
        snapshot.sort_by(|a, b| a.content_hash.cmp(&b.content_hash));
        let json = serde_json::to_string_pretty(&snapshot)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Saved {} records to {}", self.records.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
