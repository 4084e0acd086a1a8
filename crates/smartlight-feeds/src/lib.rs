//! smartlight-feeds: message feed sources for smartlight.
//!
//! Each feed connects to a message source, reads raw payloads, and hands them
//! to [`smartlight_core::ingest`] which updates the shared store.

pub mod mqtt;
pub mod stdin;

use std::future::Future;
use std::sync::Arc;

use smartlight_core::LatestStateStore;
use tokio_util::sync::CancellationToken;

pub use mqtt::{BrokerAddress, MqttFeed};
pub use stdin::LineFeed;

/// Trait implemented by each message feed source.
pub trait Feed: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Drive the feed until the source ends or `shutdown` is cancelled.
    fn run(
        self,
        store: Arc<LatestStateStore>,
        shutdown: CancellationToken,
    ) -> impl Future<Output = Result<(), FeedError>> + Send
    where
        Self: Sized;
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("invalid broker url {url:?}: {reason}")]
    InvalidBrokerUrl { url: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
