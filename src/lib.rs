//! # blutrv-exporter
//!
//! A Prometheus exporter for Shelly BLU TRV radiator valves reached through a
//! Shelly BLU gateway.
//!
//! Every scrape of `/metrics` polls the gateway's `Shelly.GetComponents` RPC,
//! keeps the components of the configured sub-type, merges their attributes
//! and renders them as gauges. Nothing is cached between scrapes; a failed
//! poll answers that one request with a 500.
//!
//! ## Architecture
//!
//! ```text
//!  HTTP request ──▶ server ──▶ collector ──▶ blutrv-gateway ──▶ Shelly gateway
//!                                  │          (fetch, extract)
//!                                  ▼
//!                            blutrv-metrics
//!                           (project, encode)
//! ```
//!
//! - **[`config`]**: YAML file plus `BLUTRV_*` environment overrides
//! - **[`collector`]**: one serialized poll cycle per scrape, plus the
//!   independent debug snapshot
//! - **[`server`]**: hyper HTTP/1 server with `/metrics`, `/debug/blu`,
//!   `/health` and `/healthz`
//!
//! ## Usage
//!
//! ```bash
//! blutrv-exporter --config /etc/shelly-blu-trv-exporter/config.yaml
//! ```
//!
//! ```no_run
//! use std::sync::Arc;
//! use blutrv_exporter::{server, BluCollector, ExporterConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ExporterConfig::from_yaml("address: 192.168.1.50\nusername: admin\npassword: secret\n")?;
//! let collector = Arc::new(BluCollector::from_config(&config)?);
//! let listener = tokio::net::TcpListener::bind(&config.listen).await?;
//! server::serve(listener, collector, server::shutdown_signal()).await?;
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod server;

#[cfg(test)]
mod test_support;

pub use collector::{BluCollector, CollectError};
pub use config::{ConfigError, ExporterConfig};
