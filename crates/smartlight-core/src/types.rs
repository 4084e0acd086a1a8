//! Core types for smartlight-core.
//!
//! [`CanonicalRecord`] is the one shape every wire encoding is normalised
//! into. The store, the status query and the HTTP layer only ever see this
//! type, never the raw payload format.

use serde::Serialize;
use serde_json::{Map, Value};

/// A normalised telemetry update: field name → field value.
///
/// Keys are never empty; [`insert`](Self::insert) refuses them. Values from a
/// status line are JSON numbers or strings. Values from a JSON object payload
/// are passed through untouched and may be any JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalRecord(Map<String, Value>);

impl CanonicalRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Single-field record `{ "message": text }`, used for JSON string payloads
    /// that are not status lines.
    pub fn message(text: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.insert("message", Value::String(text.into()));
        record
    }

    /// Adopt a decoded JSON object. Values are kept as-is; empty keys are
    /// dropped.
    pub fn from_object(object: Map<String, Value>) -> Self {
        object.into_iter().collect()
    }

    /// Insert or overwrite a field. Returns `false` (and stores nothing) when
    /// `key` is empty.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if key.is_empty() {
            return false;
        }
        self.0.insert(key, value.into());
        true
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Value)> for CanonicalRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}
