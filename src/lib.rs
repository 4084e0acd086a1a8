//! smartlight: Smart Light backend.
//!
//! Bridges telemetry published by the STM32 board over the NETPIE MQTT broker
//! to a browser dashboard that polls `GET /status`.
//!
//! # Architecture
//!
//! ```text
//! MQTT / stdin feed ──► ingest ──► Normalizer ──► Store ──► StatusQuery ──► HTTP
//! ```
//!
//! The store is owned here and shared by `Arc` with the feed task and the
//! HTTP handlers. A single [`CancellationToken`] stops both.

use std::sync::Arc;

use anyhow::Context;
use smartlight_core::config::Config;
use smartlight_core::{LatestStateStore, StatusQuery};
use smartlight_feeds::{Feed, FeedError, LineFeed, MqttFeed};
use smartlight_http::AppState;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Which feed supplies device messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum FeedKind {
    Mqtt,
    Stdin,
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedKind::Mqtt => write!(f, "mqtt"),
            FeedKind::Stdin => write!(f, "stdin"),
        }
    }
}

/// Run the backend until `shutdown` is cancelled.
///
/// Fails fast on configuration problems (missing broker credentials, bad
/// bind address, port in use). Feed errors after startup are logged; the
/// HTTP server keeps serving the last known snapshot.
pub async fn run(config: Config, feed: FeedKind, shutdown: CancellationToken) -> anyhow::Result<()> {
    let store = Arc::new(LatestStateStore::new());
    let query = StatusQuery::new(Arc::clone(&store), config.status.stale_after());

    let addr = config.http.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;
    let app = smartlight_http::router(AppState::new(query), &config.http.public_dir);

    let feed_task = spawn_feed(feed, &config, store, shutdown.clone())?;

    let served = smartlight_http::serve(listener, app, shutdown.clone()).await;
    shutdown.cancel();

    match feed_task.await {
        Ok(Ok(())) => tracing::debug!(%feed, "feed stopped"),
        Ok(Err(e)) => tracing::error!(%feed, error = %e, "feed failed"),
        Err(e) => tracing::error!(%feed, error = %e, "feed task panicked"),
    }

    served
}

fn spawn_feed(
    kind: FeedKind,
    config: &Config,
    store: Arc<LatestStateStore>,
    shutdown: CancellationToken,
) -> anyhow::Result<JoinHandle<Result<(), FeedError>>> {
    match kind {
        FeedKind::Mqtt => {
            config.validate()?;
            let feed = MqttFeed::from_config(&config.mqtt)?;
            tracing::info!(feed = feed.name(), "feed configured");
            Ok(tokio::spawn(feed.run(store, shutdown)))
        }
        FeedKind::Stdin => {
            let feed = LineFeed::stdin();
            tracing::info!(feed = feed.name(), "feed configured");
            Ok(tokio::spawn(feed.run(store, shutdown)))
        }
    }
}
