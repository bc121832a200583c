/*
[INPUT]:  Independent item streams (stream sessions), shutdown token
[OUTPUT]: Single interleaved sequence of every upstream item
[POS]:    WebSocket layer - fan-in of concurrent sessions
[UPDATE]: When changing forwarding, backpressure or shutdown behaviour
*/

use futures_util::{Stream, StreamExt, stream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub const DEFAULT_MERGE_CAPACITY: usize = 1024;

/// Fan-in of N sources through one bounded channel.
///
/// Each source gets its own forwarding task, so items from one source keep
/// their order while sources interleave freely. A full channel suspends the
/// forwarding task, which stops pulling from its source. Dropping the merger
/// aborts every worker.
#[derive(Debug)]
pub struct StreamMerger<T> {
    events: mpsc::Receiver<T>,
    workers: JoinSet<()>,
    sources: usize,
}

impl<T: Send + 'static> StreamMerger<T> {
    pub fn new<S>(sources: impl IntoIterator<Item = S>, shutdown: CancellationToken) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        Self::with_capacity(sources, DEFAULT_MERGE_CAPACITY, shutdown)
    }

    pub fn with_capacity<S>(
        sources: impl IntoIterator<Item = S>,
        capacity: usize,
        shutdown: CancellationToken,
    ) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        let (tx, events) = mpsc::channel(capacity.max(1));
        let mut workers = JoinSet::new();
        for (index, source) in sources.into_iter().enumerate() {
            workers.spawn(forward(index, source, tx.clone(), shutdown.clone()));
        }
        let sources = workers.len();
        debug!(sources, capacity, "stream merger started");

        Self {
            events,
            workers,
            sources,
        }
    }

    /// Next item from any source; `None` once every worker has stopped.
    pub async fn next(&mut self) -> Option<T> {
        self.events.recv().await
    }

    pub fn source_count(&self) -> usize {
        self.sources
    }

    /// Workers still forwarding
    pub fn active_workers(&self) -> usize {
        self.workers.len()
    }

    pub fn into_stream(self) -> impl Stream<Item = T> + Send {
        stream::unfold(self, |mut merger| async move {
            let item = merger.next().await?;
            Some((item, merger))
        })
    }
}

async fn forward<S, T>(index: usize, source: S, tx: mpsc::Sender<T>, shutdown: CancellationToken)
where
    S: Stream<Item = T>,
{
    let mut source = std::pin::pin!(source);
    loop {
        let item = tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(source = index, "merge worker cancelled");
                return;
            }
            item = source.next() => item,
        };
        let Some(item) = item else {
            info!(source = index, "merge source ended");
            return;
        };

        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!(source = index, "merge worker cancelled");
                return;
            }
            sent = tx.send(item) => {
                if sent.is_err() {
                    debug!(source = index, "merge consumer dropped");
                    return;
                }
            }
        }
    }
}
