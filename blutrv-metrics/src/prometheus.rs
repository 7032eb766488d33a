//! Prometheus exposition format support.
//!
//! Renders projected samples in the Prometheus text-based exposition format
//! (version 0.0.4), which can be scraped by Prometheus or compatible
//! monitoring systems.
//!
//! ## Example
//!
//! ```rust
//! use blutrv_metrics::prometheus::encode;
//! use blutrv_metrics::{project, MetricDescriptors};
//! use blutrv_types::ComponentSet;
//!
//! let descriptors = MetricDescriptors::default();
//! let samples = project(&ComponentSet::new(), &descriptors);
//! let text = encode(&descriptors, &samples);
//!
//! assert!(text.contains("blutrv_components_total 0"));
//! ```

use crate::descriptor::{MetricDesc, MetricDescriptors};
use crate::projector::Sample;

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Format samples as Prometheus exposition text.
///
/// Every family gets its HELP and TYPE lines, followed by its samples in the
/// order they were projected.
pub fn encode(descriptors: &MetricDescriptors, samples: &[Sample<'_>]) -> String {
    let mut output = String::new();

    for desc in descriptors.all() {
        output.push_str(&format!("# HELP {} {}\n", desc.name(), desc.help()));
        output.push_str(&format!("# TYPE {} gauge\n", desc.name()));

        for sample in samples.iter().filter(|s| s.desc.name() == desc.name()) {
            output.push_str(&format_sample(desc, &sample.labels, sample.value));
        }
    }

    output
}

fn format_sample(desc: &MetricDesc, labels: &[String], value: f64) -> String {
    if desc.labels().is_empty() {
        return format!("{} {}\n", desc.name(), format_value(value));
    }

    let labels = desc
        .labels()
        .iter()
        .zip(labels)
        .map(|(name, value)| format!("{}=\"{}\"", name, escape_label_value(value)))
        .collect::<Vec<_>>()
        .join(",");

    format!("{}{{{}}} {}\n", desc.name(), labels, format_value(value))
}

/// Format a sample value; non-finite values use Prometheus spelling.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

/// Escape a label value for Prometheus format.
/// Backslash, double-quote, and newline must be escaped.
fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
