//! Harvest record storage.
//!
//! Records are created by user submission, never mutated, and deleted
//! only by explicit action. Storage uses one canonical layout: a flat
//! list of records, each carrying its owner.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// A logged harvest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    /// Quantity harvested, in the operator's unit of choice.
    pub quantity: f64,
    pub quality: String,
    pub notes: String,
    /// Opaque URL of an uploaded photo, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub recorded_by: String,
    pub created_at: DateTime<Utc>,
}

/// A harvest submission before it is stored.
#[derive(Debug, Clone, Default)]
pub struct NewHarvest {
    pub date: String,
    pub quantity: String,
    pub quality: String,
    pub notes: String,
    pub photo: Option<String>,
}

impl NewHarvest {
    /// Validate the submission into a record for the given user.
    ///
    /// The date is required (ISO `YYYY-MM-DD`) and the quantity must be a
    /// finite non-negative number.
    pub fn into_record(self, user: &str) -> Result<HarvestRecord> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid harvest date: {:?}", self.date))?;

        let quantity: f64 = self
            .quantity
            .trim()
            .parse()
            .with_context(|| format!("Invalid quantity: {:?}", self.quantity))?;
        if !quantity.is_finite() || quantity < 0.0 {
            bail!("Quantity must be a non-negative number");
        }

        Ok(HarvestRecord {
            id: Uuid::new_v4(),
            date,
            quantity,
            quality: self.quality.trim().to_string(),
            notes: self.notes.trim().to_string(),
            photo: self.photo,
            recorded_by: user.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Write path for harvest records.
///
/// Calls are fire-and-forget from the caller's point of view: the store
/// reports success or failure and implements no retries.
pub trait RecordStore: Send {
    /// Validate and persist a submission; returns the stored record.
    fn add(&mut self, submission: NewHarvest, user: &str) -> Result<HarvestRecord>;

    /// All records, newest harvest date first.
    fn list(&self) -> Result<Vec<HarvestRecord>>;

    /// Delete a record by id. Returns false if no such record existed.
    fn delete(&mut self, id: Uuid) -> Result<bool>;

    /// Human-readable description for the status bar.
    fn description(&self) -> &str;
}

/// File-backed record store holding a JSON array of records.
#[derive(Debug)]
pub struct JsonRecordStore {
    path: PathBuf,
    description: String,
    records: Vec<HarvestRecord>,
}

impl JsonRecordStore {
    /// Open the store, creating an empty one if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Vec::new()
        };
        let description = format!("records: {}", path.display());
        Ok(Self {
            path,
            description,
            records,
        })
    }

    fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl RecordStore for JsonRecordStore {
    fn add(&mut self, submission: NewHarvest, user: &str) -> Result<HarvestRecord> {
        let record = submission.into_record(user)?;
        self.records.push(record.clone());
        self.flush()?;
        debug!(id = %record.id, user, "stored harvest record");
        Ok(record)
    }

    fn list(&self) -> Result<Vec<HarvestRecord>> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        Ok(records)
    }

    fn delete(&mut self, id: Uuid) -> Result<bool> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.flush()?;
            debug!(%id, "deleted harvest record");
        }
        Ok(removed)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// In-memory record store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Vec<HarvestRecord>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn add(&mut self, submission: NewHarvest, user: &str) -> Result<HarvestRecord> {
        let record = submission.into_record(user)?;
        self.records.push(record.clone());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<HarvestRecord>> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        Ok(records)
    }

    fn delete(&mut self, id: Uuid) -> Result<bool> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        Ok(self.records.len() != before)
    }

    fn description(&self) -> &str {
        "records: in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn submission(date: &str, quantity: &str) -> NewHarvest {
        NewHarvest {
            date: date.to_string(),
            quantity: quantity.to_string(),
            quality: "good".to_string(),
            notes: String::new(),
            photo: None,
        }
    }

    #[test]
    fn test_validation_accepts_well_formed() {
        let record = submission("2025-07-14", "12.5").into_record("alex").unwrap();
        assert_eq!(record.quantity, 12.5);
        assert_eq!(record.recorded_by, "alex");
        assert_eq!(
            record.date,
            NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()
        );
    }

    #[test]
    fn test_validation_rejects_bad_date() {
        assert!(submission("", "5").into_record("alex").is_err());
        assert!(submission("14/07/2025", "5").into_record("alex").is_err());
    }

    #[test]
    fn test_validation_rejects_bad_quantity() {
        assert!(submission("2025-07-14", "-1").into_record("alex").is_err());
        assert!(submission("2025-07-14", "lots").into_record("alex").is_err());
        assert!(submission("2025-07-14", "").into_record("alex").is_err());
    }

    #[test]
    fn test_zero_quantity_is_allowed() {
        assert!(submission("2025-07-14", "0").into_record("alex").is_ok());
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("harvest.json");

        let id = {
            let mut store = JsonRecordStore::open(&path).unwrap();
            let record = store.add(submission("2025-07-14", "3"), "alex").unwrap();
            store.add(submission("2025-07-20", "5"), "sam").unwrap();
            record.id
        };

        // Reopen and verify persistence plus newest-first ordering
        let mut store = JsonRecordStore::open(&path).unwrap();
        let records = store.list().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].recorded_by, "sam");
        assert_eq!(records[1].id, id);

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryRecordStore::new();
        let record = store.add(submission("2025-07-14", "3"), "anonymous").unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
        assert!(store.delete(record.id).unwrap());
        assert!(store.list().unwrap().is_empty());
    }
}
