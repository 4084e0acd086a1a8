//! Store: the single latest [`StatusSnapshot`].
//!
//! The store is the single source of truth; the status query reads from it,
//! never from the feed directly. Every replacement swaps one
//! `Arc<StatusSnapshot>`, so a reader always holds a snapshot whose `record`,
//! `raw` and `captured_at` came from the same update.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::types::CanonicalRecord;

/// Latest record, the raw text it came from, and when it was captured.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    /// Generation number, incremented on every replacement. `0` is the
    /// initial empty snapshot.
    pub seq: u64,
    pub record: Option<CanonicalRecord>,
    pub raw: String,
    pub captured_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    pub fn has_record(&self) -> bool {
        self.record.is_some()
    }
}

/// Holder of the current snapshot, shared between the feed and the query path.
#[derive(Debug, Default)]
pub struct LatestStateStore {
    current: RwLock<Arc<StatusSnapshot>>,
}

impl LatestStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with `record`, captured now.
    pub fn update(&self, record: CanonicalRecord, raw: impl Into<String>) -> Arc<StatusSnapshot> {
        self.update_at(record, raw, Utc::now())
    }

    /// Replace the snapshot with `record` and an explicit capture time.
    pub fn update_at(
        &self,
        record: CanonicalRecord,
        raw: impl Into<String>,
        captured_at: DateTime<Utc>,
    ) -> Arc<StatusSnapshot> {
        let raw = raw.into();
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(StatusSnapshot {
            seq: current.seq + 1,
            record: Some(record),
            raw,
            captured_at: Some(captured_at),
        });
        *current = Arc::clone(&next);
        next
    }

    /// Remember the raw text of a payload that failed to normalise.
    ///
    /// Only applies while no record has been stored yet; afterwards the known
    /// good snapshot is left alone. Returns whether the raw text was kept.
    pub fn record_rejected(&self, raw: impl Into<String>) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.has_record() {
            return false;
        }
        *current = Arc::new(StatusSnapshot {
            seq: current.seq + 1,
            record: None,
            raw: raw.into(),
            captured_at: None,
        });
        true
    }

    /// The current snapshot. Cheap: clones an `Arc`.
    pub fn read(&self) -> Arc<StatusSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }
}
