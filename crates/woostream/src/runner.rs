/*
[INPUT]:  AppConfig, Broadcaster, CancellationToken
[OUTPUT]: Startup snapshot notification, then one notification per filled order
[POS]:    Execution layer - wires REST snapshot, stream sessions and merger together
[UPDATE]: When changing startup order or event handling
*/

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use woostream_adapter::{
    Connector, Endpoints, Snapshot, StreamEvent, StreamKind, StreamMerger, StreamSession,
    TungsteniteConnector, WooClient,
};

use crate::config::AppConfig;
use crate::format::{event_text, snapshot_text};
use crate::notifier::Broadcaster;

/// Fetch positions, holdings and symbol info concurrently.
///
/// A failed call leaves its part empty; the others are still returned.
pub async fn fetch_snapshot(client: &WooClient) -> Snapshot {
    let (positions, holding, public_info) =
        tokio::join!(client.positions(), client.holding(), client.public_info());
    Snapshot {
        positions: keep_ok("positions", positions),
        holding: keep_ok("holding", holding),
        public_info: keep_ok("public_info", public_info),
    }
}

fn keep_ok<T>(part: &str, result: woostream_adapter::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            error!(part, status = ?err.status(), error = %err, "snapshot request failed");
            None
        }
    }
}

pub struct Runner {
    config: AppConfig,
    endpoints: Endpoints,
    connector: Arc<dyn Connector>,
    broadcaster: Broadcaster,
}

impl Runner {
    pub fn new(config: AppConfig, broadcaster: Broadcaster) -> Self {
        let endpoints = Endpoints::for_network(config.network);
        Self {
            config,
            endpoints,
            connector: Arc::new(TungsteniteConnector::new()),
            broadcaster,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// One private-stream session per configured topic
    pub fn sessions(&self) -> Vec<StreamSession> {
        self.config
            .topics
            .iter()
            .map(|topic| {
                StreamSession::for_endpoint(
                    &self.endpoints,
                    StreamKind::Private,
                    &self.config.application_id,
                    topic.as_str(),
                    self.config.credentials.clone(),
                    self.connector.clone(),
                )
                .with_reconnect_policy(self.config.reconnect.policy())
            })
            .collect()
    }

    /// Streams start before the snapshot is fetched so no fill falls in between.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let client = WooClient::new(&self.endpoints)
            .context("build rest client")?
            .with_credentials(self.config.credentials.clone());

        let sessions = self.sessions().into_iter().map(StreamSession::into_stream);
        let mut merger =
            StreamMerger::with_capacity(sessions, self.config.merge_capacity, shutdown.clone());
        info!(
            network = %self.config.network,
            topics = ?self.config.topics,
            "streams started"
        );

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("shutdown before snapshot completed");
                return Ok(());
            }
            snapshot = fetch_snapshot(&client) => {
                if !snapshot.is_complete() {
                    error!("snapshot incomplete; continuing with partial data");
                }
                self.broadcaster.broadcast(snapshot_text(&snapshot));
            }
        }

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = merger.next() => match event {
                    Some(event) => {
                        self.handle_event(&event);
                    }
                    None => break,
                },
            }
        }
        info!("event stream stopped");
        Ok(())
    }

    fn handle_event(&self, event: &StreamEvent) -> Option<JoinHandle<()>> {
        debug!(topic = %event.topic, payload = %event.payload, "stream event");
        let text = event_text(event)?;
        self.broadcaster.broadcast(text)
    }
}
