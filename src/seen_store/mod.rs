//! Durable record of which post ids have already triggered a notification.
//!
//! The store is semantically a set keyed by post id with a retention
//! policy: records older than the retention window are dropped on every
//! append, so posts can legitimately re-trend and notify again later.

mod json_file_store;
mod memory_store;
mod models;

pub use json_file_store::JsonFileSeenStore;
pub use memory_store::InMemorySeenStore;
pub use models::{SeenRecord, SEEN_AT_FORMAT};

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when accessing the seen store.
///
/// Either variant means duplicate status cannot be evaluated; callers must
/// not treat it as "not seen".
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access seen store {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Seen store {path:?} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Trait for seen-store operations.
pub trait SeenStore: Send + Sync {
    /// Whether `id` triggered a notification within the retention window.
    fn contains(&self, id: &str) -> Result<bool, StoreError>;

    /// Append `id` with `seen_at`, drop expired records and persist the
    /// result atomically. An existing record with the same id is replaced,
    /// so the most recent append's timestamp is the one retained.
    fn record_and_prune(&self, id: &str, seen_at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Keep a record iff it is strictly younger than `retention_days` whole
/// days. A record aged exactly `retention_days` days is dropped.
pub(crate) fn prune_expired(
    records: &mut Vec<SeenRecord>,
    now: DateTime<Utc>,
    retention_days: u64,
) {
    records.retain(|record| record.age_days(now) < retention_days as i64);
}
