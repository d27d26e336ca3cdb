//! Import progress records.
//!
//! Each job has exactly one writer (its worker), so a plain key-value store
//! with per-key atomic puts is enough. Records expire a fixed time after
//! their last update.

use std::time::Duration;

use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default progress store capacity (number of jobs).
const DEFAULT_CAPACITY: u64 = 1_000;

/// Default time-to-live after the last update (1 hour).
const DEFAULT_TTL_SECS: u64 = 3_600;

/// Job lifecycle as seen by a polling client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    /// Accepted, worker not started yet.
    Queued,
    /// Worker is processing rows.
    Running,
    /// Finished successfully.
    Done,
    /// Aborted; see the error message.
    Error,
    /// No record for this id, or it expired.
    Unknown,
}

impl ImportStatus {
    /// Returns true once the job can no longer change.
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// Snapshot returned to polling clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    /// Current status.
    pub status: ImportStatus,
    /// Rows processed so far.
    pub processed: u64,
    /// Data rows in the file; zero until parsed.
    pub total: u64,
    /// `floor(processed * 100 / total)`.
    pub percent: u8,
    /// Failure message when `status` is `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Returns `floor(processed * 100 / total)`, zero when `total` is zero.
#[must_use]
pub fn percent_of(processed: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = processed.min(total).saturating_mul(100) / total;
    u8::try_from(percent).unwrap_or(100)
}

impl ImportProgress {
    /// Freshly accepted job.
    #[must_use]
    pub fn queued() -> Self {
        Self {
            status: ImportStatus::Queued,
            processed: 0,
            total: 0,
            percent: 0,
            error: None,
        }
    }

    /// Job in flight.
    #[must_use]
    pub fn running(processed: u64, total: u64) -> Self {
        Self {
            status: ImportStatus::Running,
            processed,
            total,
            percent: percent_of(processed, total),
            error: None,
        }
    }

    /// Completed job; always 100 percent.
    #[must_use]
    pub fn done(processed: u64, total: u64) -> Self {
        Self {
            status: ImportStatus::Done,
            processed,
            total,
            percent: 100,
            error: None,
        }
    }

    /// Unrecognized or expired job.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            status: ImportStatus::Unknown,
            ..Self::queued()
        }
    }

    /// Marks this snapshot as failed, keeping the counters reached.
    #[must_use]
    pub fn failed(self, message: impl Into<String>) -> Self {
        Self {
            status: ImportStatus::Error,
            error: Some(message.into()),
            ..self
        }
    }
}

/// Key-value store for progress snapshots.
pub trait ProgressStore: Send + Sync {
    /// Stores the latest snapshot for a job.
    fn put(&self, job_id: Uuid, progress: ImportProgress);

    /// Returns the latest snapshot, if it has not expired.
    fn get(&self, job_id: Uuid) -> Option<ImportProgress>;
}

/// In-process progress store with TTL eviction using Moka.
#[derive(Clone)]
pub struct MokaProgressStore {
    cache: Cache<Uuid, ImportProgress>,
}

impl MokaProgressStore {
    /// Creates a store with default settings.
    ///
    /// Default: 1000 jobs max, 1 hour TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a store with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of jobs tracked
    /// * `ttl_secs` - Seconds a record lives after its last update
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Returns the number of records currently held.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }
}

impl Default for MokaProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore for MokaProgressStore {
    fn put(&self, job_id: Uuid, progress: ImportProgress) {
        self.cache.insert(job_id, progress);
    }

    fn get(&self, job_id: Uuid) -> Option<ImportProgress> {
        self.cache.get(&job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0)]
    #[case(5, 0, 0)]
    #[case(10, 30, 33)]
    #[case(29, 30, 96)]
    #[case(30, 30, 100)]
    #[case(40, 30, 100)]
    fn test_percent_is_floored(#[case] processed: u64, #[case] total: u64, #[case] expected: u8) {
        assert_eq!(percent_of(processed, total), expected);
    }

    #[test]
    fn test_snapshot_constructors() {
        let queued = ImportProgress::queued();
        assert_eq!(queued.status, ImportStatus::Queued);
        assert_eq!((queued.processed, queued.total, queued.percent), (0, 0, 0));

        let done = ImportProgress::done(0, 0);
        assert_eq!(done.percent, 100);
        assert!(done.status.is_finished());

        let failed = ImportProgress::running(20, 50).failed("Missing column in file: X");
        assert_eq!(failed.status, ImportStatus::Error);
        assert_eq!(failed.processed, 20);
        assert_eq!(failed.percent, 40);
        assert_eq!(failed.error.as_deref(), Some("Missing column in file: X"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ImportProgress::running(10, 20)).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["percent"], 50);
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(ImportProgress::unknown()).unwrap();
        assert_eq!(json["status"], "unknown");
    }

    #[test]
    fn test_store_put_get() {
        let store = MokaProgressStore::new();
        let id = Uuid::new_v4();
        assert!(store.get(id).is_none());

        store.put(id, ImportProgress::queued());
        store.put(id, ImportProgress::running(3, 9));
        assert_eq!(store.get(id), Some(ImportProgress::running(3, 9)));

        store.run_pending_tasks();
        assert_eq!(store.entry_count(), 1);
    }
}
