//! smartlight-core: payload normalisation and latest-state tracking.
//!
//! # Architecture
//!
//! ```text
//! Feed ──► ingest ──► Normalizer ──► Store ──► StatusQuery ──► HTTP
//! ```
//!
//! Feeds hand raw payloads to [`ingest::ingest`]. The store holds exactly one
//! snapshot, replaced atomically; the status query reads it on every request.

pub mod config;
pub mod ingest;
pub mod normalizer;
pub mod status;
pub mod store;
pub mod types;

pub use ingest::ingest;
pub use normalizer::{classify, normalize, parse_status_line, NormalizeError, Normalized};
pub use status::{Freshness, StatusQuery, StatusResponse};
pub use store::{LatestStateStore, StatusSnapshot};
pub use types::CanonicalRecord;
