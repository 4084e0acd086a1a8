//! Line feed: one payload per line from any async reader, stdin by default.
//!
//! Handy for running the dashboard against a recorded capture or a serial
//! console without a broker: `cat capture.log | smartlight --feed stdin`.

use std::sync::Arc;

use smartlight_core::{ingest, LatestStateStore};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{Feed, FeedError};

pub struct LineFeed<R> {
    reader: R,
    label: String,
}

impl LineFeed<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), "stdin")
    }
}

impl<R> LineFeed<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// `label` stands in for the topic name in logs.
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            reader,
            label: label.into(),
        }
    }
}

impl<R> Feed for LineFeed<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn name(&self) -> &'static str {
        "stdin"
    }

    async fn run(
        self,
        store: Arc<LatestStateStore>,
        shutdown: CancellationToken,
    ) -> Result<(), FeedError> {
        info!(label = %self.label, "starting line feed");
        let mut lines = self.reader.lines();
        let mut count = 0usize;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!(count, "shutdown signal received");
                    return Ok(());
                }
                line = lines.next_line() => match line? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => {
                        count += 1;
                        let _ = ingest(&store, &self.label, line.as_bytes());
                    }
                    None => {
                        info!(count, "line feed reached EOF");
                        return Ok(());
                    }
                },
            }
        }
    }
}
