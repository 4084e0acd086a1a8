//! Status query: the response served to the dashboard on every poll.
//!
//! `updatedAt` is the capture time of the stored snapshot, not the time of
//! the query, so `ageMs` and `freshness` describe how old the data really is.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::store::LatestStateStore;
use crate::types::CanonicalRecord;

pub const NO_DATA_MESSAGE: &str = "No data yet";

/// Age past which a snapshot is reported as stale.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_millis(12_000);

/// Live/stale classification of the latest snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Live,
    Stale,
}

impl Freshness {
    pub fn classify(age: Duration, stale_after: Duration) -> Self {
        if age < stale_after {
            Freshness::Live
        } else {
            Freshness::Stale
        }
    }
}

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Waiting(WaitingStatus),
    Ready(ReadyStatus),
}

impl StatusResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, StatusResponse::Ready(_))
    }
}

/// Nothing has been normalised yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitingStatus {
    pub ok: bool,
    pub message: &'static str,
    /// Last raw payload seen, even if it could not be parsed.
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyStatus {
    pub ok: bool,
    pub data: CanonicalRecord,
    pub raw: String,
    #[serde(serialize_with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
    #[serde(serialize_with = "iso_millis")]
    pub served_at: DateTime<Utc>,
    pub age_ms: u64,
    pub freshness: Freshness,
}

fn iso_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Read side of the store, with the staleness threshold baked in.
#[derive(Debug, Clone)]
pub struct StatusQuery {
    store: Arc<LatestStateStore>,
    stale_after: Duration,
}

impl StatusQuery {
    pub fn new(store: Arc<LatestStateStore>, stale_after: Duration) -> Self {
        Self { store, stale_after }
    }

    pub fn store(&self) -> &Arc<LatestStateStore> {
        &self.store
    }

    pub fn get_status(&self) -> StatusResponse {
        self.status_at(Utc::now())
    }

    /// Build the response as if queried at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> StatusResponse {
        let snapshot = self.store.read();

        let (Some(record), Some(captured_at)) = (&snapshot.record, snapshot.captured_at) else {
            return StatusResponse::Waiting(WaitingStatus {
                ok: false,
                message: NO_DATA_MESSAGE,
                raw: snapshot.raw.clone(),
            });
        };

        // Clock skew can put capture after `now`; treat that as age zero.
        let age = (now - captured_at).to_std().unwrap_or(Duration::ZERO);

        StatusResponse::Ready(ReadyStatus {
            ok: true,
            data: record.clone(),
            raw: snapshot.raw.clone(),
            updated_at: captured_at,
            served_at: now,
            age_ms: u64::try_from(age.as_millis()).unwrap_or(u64::MAX),
            freshness: Freshness::classify(age, self.stale_after),
        })
    }
}
