//! Test builders: ergonomic constructors for records and stores.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use smartlight_core::{CanonicalRecord, LatestStateStore, StatusQuery};

// ---------------------------------------------------------------------------
// RecordBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`CanonicalRecord`] fixtures.
///
/// ```rust,ignore
/// let record = RecordBuilder::new().field("LIGHT", 1).field("MODE", "AUTO").build();
/// ```
#[derive(Default)]
pub struct RecordBuilder {
    record: CanonicalRecord,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        assert!(self.record.insert(key, value), "empty key in fixture");
        self
    }

    pub fn build(self) -> CanonicalRecord {
        self.record
    }
}

// ---------------------------------------------------------------------------
// Store / query helpers
// ---------------------------------------------------------------------------

/// A fixed instant so timestamp assertions are deterministic.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap()
}

/// A fresh store and a query over it with the default 12 s threshold.
pub fn store_and_query() -> (Arc<LatestStateStore>, StatusQuery) {
    let store = Arc::new(LatestStateStore::new());
    let query = StatusQuery::new(Arc::clone(&store), Duration::from_millis(12_000));
    (store, query)
}

/// Record for the `n`th numbered status line, matching `corpus_sequence`.
pub fn sequence_record(n: u64) -> (CanonicalRecord, String) {
    let raw = format!("STATUS;SEQ={n}");
    let record = RecordBuilder::new().field("SEQ", n).build();
    (record, raw)
}
