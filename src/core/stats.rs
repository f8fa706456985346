use crate::domain::model::Lane;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters accumulated across stages during one run. Monotonically
/// incremented while the topology is live; snapshotted only after every
/// stage has been joined.
#[derive(Debug)]
pub struct RunStats {
    started_at: DateTime<Utc>,
    extracted: AtomicU64,
    imported: AtomicU64,
    created: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            extracted: AtomicU64::new(0),
            imported: AtomicU64::new(0),
            created: AtomicU64::new(0),
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn record_extracted(&self) {
        self.extracted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_result(&self, lane: Lane, success: bool) {
        if success {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
            match lane {
                Lane::Import => self.imported.fetch_add(1, Ordering::Relaxed),
                Lane::Create => self.created.fetch_add(1, Ordering::Relaxed),
            };
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started_at: self.started_at,
            completed_at: Utc::now(),
            extracted: self.extracted.load(Ordering::Relaxed),
            imported: self.imported.load(Ordering::Relaxed),
            created: self.created.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain counters reported once a run has finished.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub extracted: u64,
    pub imported: u64,
    pub created: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "extracted={} imported={} created={} succeeded={} failed={}",
            self.extracted, self.imported, self.created, self.succeeded, self.failed
        )
    }
}
