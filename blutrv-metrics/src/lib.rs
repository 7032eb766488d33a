//! # blutrv-metrics
//!
//! Turns one poll's [`ComponentSet`](blutrv_types::ComponentSet) into
//! Prometheus gauges.
//!
//! The metric families are described by an explicit [`MetricDescriptors`]
//! struct built once at startup and passed by reference; nothing is
//! registered globally. Projection is a pure function of the component set,
//! so every scrape reflects exactly one fresh poll.
//!
//! ## Quick Start
//!
//! ```rust
//! use blutrv_metrics::{encode, project, MetricDescriptors};
//! use blutrv_types::{AttrValue, Attributes, ComponentSet, NormalizedComponent};
//!
//! let descriptors = MetricDescriptors::new("blutrv");
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("battery".to_string(), AttrValue::Number(100.0));
//! let mut components = ComponentSet::new();
//! components.insert(NormalizedComponent::new("200", "TRV-200", "blutrv:200", attributes));
//!
//! let samples = project(&components, &descriptors);
//! let text = encode(&descriptors, &samples);
//!
//! assert!(text.contains("blutrv_battery{component=\"TRV-200\"} 100"));
//! assert!(text.contains("blutrv_identity{component=\"TRV-200\",orig_key=\"blutrv:200\"} 1"));
//! ```
//!
//! ## Emitted families
//!
//! - `<ns>_components_total`: number of components in the poll
//! - `<ns>_target_c`, `<ns>_current_c`, `<ns>_battery`, `<ns>_rssi`,
//!   `<ns>_flags`: per component, only when the attribute is numeric
//! - `<ns>_info{fw_ver}`: per component with a firmware version string
//! - `<ns>_identity{orig_key}`: per component, always

mod descriptor;
mod projector;

pub mod prometheus;

pub use descriptor::{
    MetricDesc, MetricDescriptors, COMPONENT_LABEL, DEFAULT_NAMESPACE, FW_VERSION_LABEL,
    ORIGINAL_KEY_LABEL,
};
pub use projector::{
    project, Sample, BATTERY_ATTR, CURRENT_TEMPERATURE_ATTR, FLAGS_ATTR, FW_VERSION_ATTR,
    RSSI_ATTR, TARGET_TEMPERATURE_ATTR,
};
pub use prometheus::{encode, CONTENT_TYPE};
