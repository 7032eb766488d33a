//! On-demand poll cycle behind the HTTP endpoints.
//!
//! Each scrape fetches, extracts and projects under one exclusive lock, so
//! concurrent scrapes queue up instead of hitting the gateway in parallel.
//! The debug snapshot runs its own fetch outside that lock. Nothing is
//! cached between calls.

use std::time::Instant;

use blutrv_gateway::{GatewayClient, GatewayError};
use blutrv_metrics::{encode, project, MetricDescriptors};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::ExporterConfig;

/// Failure of one poll cycle, reported to the requester only.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Fetching or parsing the gateway response failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The debug snapshot could not be serialized.
    #[error("error encoding JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Polls the gateway and renders metrics or debug snapshots.
#[derive(Debug)]
pub struct BluCollector {
    client: GatewayClient,
    descriptors: MetricDescriptors,
    scrape_lock: Mutex<()>,
}

impl BluCollector {
    /// Create a collector from a gateway client and metric descriptors.
    pub fn new(client: GatewayClient, descriptors: MetricDescriptors) -> Self {
        Self {
            client,
            descriptors,
            scrape_lock: Mutex::new(()),
        }
    }

    /// Build the gateway client and descriptors from configuration.
    pub fn from_config(config: &ExporterConfig) -> Result<Self, GatewayError> {
        let client = GatewayClient::builder()
            .address(&config.address)
            .credentials(&config.username, &config.password)
            .timeout(config.timeout())
            .subtype(&config.subtype)
            .build()?;

        Ok(Self::new(client, MetricDescriptors::new(&config.namespace)))
    }

    /// The gateway client.
    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    /// The metric descriptors.
    pub fn descriptors(&self) -> &MetricDescriptors {
        &self.descriptors
    }

    /// Run one full poll and return the Prometheus exposition text.
    pub async fn scrape(&self) -> Result<String, CollectError> {
        let _guard = self.scrape_lock.lock().await;

        let start = Instant::now();
        let components = self.client.fetch_components().await?;
        let samples = project(&components, &self.descriptors);
        let body = encode(&self.descriptors, &samples);

        debug!(
            components = components.len(),
            samples = samples.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scrape complete"
        );
        Ok(body)
    }

    /// Run an independent poll and return the merged attributes as pretty
    /// JSON keyed by display key.
    pub async fn debug_snapshot(&self) -> Result<String, CollectError> {
        let components = self.client.fetch_components().await?;
        let mut json = serde_json::to_string_pretty(&components)?;
        json.push('\n');
        Ok(json)
    }
}
