//! Domain-specific assertion macros for smartlight harnesses.
//!
//! These add context-rich failure messages that make it clear *which* field
//! of a record or status body did not match.

/// Assert that a `CanonicalRecord` has a field with an expected JSON value.
///
/// ```rust,ignore
/// assert_has_field!(record, "TEMP", 23.5);
/// ```
#[macro_export]
macro_rules! assert_has_field {
    ($record:expr, $key:expr, $value:expr) => {{
        let record: &smartlight_core::CanonicalRecord = &$record;
        let key: &str = $key;
        let expected = serde_json::json!($value);
        match record.get(key) {
            Some(actual) if *actual == expected => {}
            Some(actual) => panic!(
                "assert_has_field! failed:\n  record[{:?}]\n  expected: {}\n  actual:   {}",
                key, expected, actual
            ),
            None => panic!(
                "assert_has_field! failed: field {:?} not found.\n  Available fields: {:?}",
                key,
                record.keys().collect::<Vec<_>>()
            ),
        }
    }};
}

/// Assert that a snapshot's `raw` text and `record` came from the same
/// numbered update (`STATUS;SEQ=<n>` ↔ `{ SEQ: n }`).
#[macro_export]
macro_rules! assert_consistent_snapshot {
    ($snapshot:expr) => {{
        let snapshot: &smartlight_core::StatusSnapshot = &$snapshot;
        if let Some(record) = &snapshot.record {
            let seq = record.get("SEQ").and_then(|v| v.as_u64());
            let expected_raw = seq.map(|n| format!("STATUS;SEQ={n}"));
            if expected_raw.as_deref() != Some(snapshot.raw.as_str()) {
                panic!(
                    "assert_consistent_snapshot! failed: torn snapshot\n  raw:    {:?}\n  record: {:?}",
                    snapshot.raw, record
                );
            }
        }
    }};
}

/// Assert the `GET /status` body of a store that has never held a record.
pub fn assert_waiting_body(body: &serde_json::Value, raw: &str) {
    assert_eq!(
        body,
        &serde_json::json!({ "ok": false, "message": "No data yet", "raw": raw }),
        "expected waiting body"
    );
}
