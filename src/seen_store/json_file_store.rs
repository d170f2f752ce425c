//! File-backed seen store.
//!
//! State lives in a single JSON array of `{"id", "date"}` objects,
//! rewritten in full on every append. The whole read-append-prune-write
//! sequence holds the store mutex, and the rewrite goes through a temp
//! file in the same directory followed by an atomic rename, so a
//! concurrent reader never observes a partially written store.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::models::SeenRecord;
use super::{prune_expired, SeenStore, StoreError};

pub struct JsonFileSeenStore {
    path: PathBuf,
    retention_days: u64,
    lock: Mutex<()>,
}

impl JsonFileSeenStore {
    pub fn new(path: impl Into<PathBuf>, retention_days: u64) -> Self {
        Self {
            path: path.into(),
            retention_days,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Read the full collection. A missing file is an empty store and is
    /// created on the spot; unparseable content is surfaced, never reset.
    fn read_records(&self) -> Result<Vec<SeenRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.write_records(&[])?;
                info!("Created empty seen store at {:?}", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&content).map_err(|e| {
            warn!(
                "Seen store {:?} is unreadable and will not be reset, delete it to start over: {}",
                self.path, e
            );
            StoreError::Corrupt {
                path: self.path.clone(),
                source: e,
            }
        })
    }

    fn write_records(&self, records: &[SeenRecord]) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let json = serde_json::to_string(records).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            source: e,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(json.as_bytes()).map_err(|e| self.io_error(e))?;
        tmp.flush().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}

impl SeenStore for JsonFileSeenStore {
    fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().unwrap();
        Ok(self.read_records()?.iter().any(|record| record.id == id))
    }

    fn record_and_prune(&self, id: &str, seen_at: DateTime<Utc>) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap();
        let mut records = self.read_records()?;
        records.retain(|record| record.id != id);
        records.push(SeenRecord::new(id, seen_at));
        prune_expired(&mut records, seen_at, self.retention_days);
        self.write_records(&records)
    }
}
