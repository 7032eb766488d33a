//! # blutrv-gateway
//!
//! Polls a Shelly BLU gateway and normalizes the components of one device
//! sub-type into a [`ComponentSet`].
//!
//! The crate has two halves:
//!
//! - [`extract`]: pure parsing, filtering, attribute merging and display-key
//!   resolution over a raw response body (always available)
//! - [`client`]: the HTTP fetcher for `/rpc/Shelly.GetComponents`
//!   (`client` feature, on by default)
//!
//! ## Quick Start
//!
//! ```rust
//! use blutrv_gateway::extract_components;
//!
//! let body = br#"{"components":[
//!     {"key":"blugw","status":{}},
//!     {"key":"blutrv:200","status":{"battery":100},"config":{"name":"TRV-200"}}
//! ]}"#;
//!
//! let components = extract_components(body, "blutrv").unwrap();
//! assert_eq!(components.len(), 1);
//! assert!(components.contains_key("TRV-200"));
//! ```

pub mod error;
pub mod extract;

#[cfg(feature = "client")]
pub mod client;

pub use error::GatewayError;
pub use extract::{extract_components, Extractor, DEFAULT_SUBTYPE};

#[cfg(feature = "client")]
pub use client::{GatewayClient, GatewayClientBuilder, COMPONENTS_RPC_PATH, DEFAULT_TIMEOUT};

// Re-export types for convenience
pub use blutrv_types::{AttrValue, Attributes, ComponentSet, NormalizedComponent, RawComponent};
