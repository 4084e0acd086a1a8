//! Ingest: the message-arrival path shared by every feed.
//!
//! Decodes the payload, normalises it and either replaces the stored snapshot
//! or records the rejection. Rejections are logged here and never propagate
//! further than the returned `Err`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::normalizer::{self, NormalizeError};
use crate::store::{LatestStateStore, StatusSnapshot};

/// Feed one payload into the store.
///
/// The payload is decoded as UTF-8 (lossily) and trimmed before parsing; the
/// trimmed text is what ends up in `StatusSnapshot::raw`.
pub fn ingest(
    store: &LatestStateStore,
    topic: &str,
    payload: &[u8],
) -> Result<Arc<StatusSnapshot>, NormalizeError> {
    let text = String::from_utf8_lossy(payload);
    let raw = text.trim();
    info!(topic, raw, "message received");

    let outcome = normalizer::classify(raw);
    let kind = outcome.kind();

    match outcome.into_result() {
        Ok(record) => {
            let fields = record.len();
            let snapshot = store.update(record, raw);
            debug!(kind, fields, seq = snapshot.seq, "snapshot replaced");
            Ok(snapshot)
        }
        Err(err) => {
            let raw_kept = store.record_rejected(raw);
            warn!(topic, kind, error = %err, raw_kept, "payload rejected");
            Err(err)
        }
    }
}
