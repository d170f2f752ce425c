//! In-memory seen store, mainly for tests and embedding.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::models::SeenRecord;
use super::{prune_expired, SeenStore, StoreError};

pub struct InMemorySeenStore {
    retention_days: u64,
    records: Mutex<Vec<SeenRecord>>,
}

impl InMemorySeenStore {
    pub fn new(retention_days: u64) -> Self {
        Self {
            retention_days,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn with_records(retention_days: u64, records: Vec<SeenRecord>) -> Self {
        Self {
            retention_days,
            records: Mutex::new(records),
        }
    }

    /// Snapshot of the current records, in insertion order.
    pub fn records(&self) -> Vec<SeenRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl SeenStore for InMemorySeenStore {
    fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().any(|record| record.id == id))
    }

    fn record_and_prune(&self, id: &str, seen_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        records.retain(|record| record.id != id);
        records.push(SeenRecord::new(id, seen_at));
        prune_expired(&mut records, seen_at, self.retention_days);
        Ok(())
    }
}
