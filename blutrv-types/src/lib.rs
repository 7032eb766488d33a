//! # blutrv-types
//!
//! Core types for data reported by a Shelly BLU gateway. This crate defines
//! the dynamic attribute value, the raw component shape returned by the
//! `Shelly.GetComponents` RPC, and the normalized per-poll component set
//! that the exporter turns into metrics.
//!
//! ## Design Goals
//!
//! - **Typed dynamic values**: device fields are an explicit tagged union
//!   with checked accessors instead of untyped maps
//! - **Per-poll identity**: a [`ComponentSet`] is rebuilt from scratch on every
//!   poll and guarantees unique display keys
//! - **Optional serialization**: enable the `serde` feature to decode wire
//!   responses and encode debug snapshots
//!
//! ## Features
//!
//! - `serde`: JSON (de)serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use blutrv_types::{AttrValue, Attributes, ComponentSet, NormalizedComponent};
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("battery".to_string(), AttrValue::Number(100.0));
//!
//! let mut set = ComponentSet::new();
//! let first = NormalizedComponent::new("200", "TRV", "blutrv:200", attributes.clone());
//! let second = NormalizedComponent::new("201", "TRV", "blutrv:201", attributes);
//!
//! assert_eq!(set.insert(first), "TRV");
//! assert_eq!(set.insert(second), "TRV (1)");
//! assert_eq!(set.len(), 2);
//! ```

mod component;
mod value;

pub use component::*;
pub use value::*;
