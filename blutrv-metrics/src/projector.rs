//! Projection of a component set into gauge samples.

use blutrv_types::{ComponentSet, NormalizedComponent, TypeMismatch};
use tracing::debug;

use crate::descriptor::{MetricDesc, MetricDescriptors};

/// Device field holding the target temperature in °C.
pub const TARGET_TEMPERATURE_ATTR: &str = "target_C";
/// Device field holding the measured temperature in °C.
pub const CURRENT_TEMPERATURE_ATTR: &str = "current_C";
/// Device field holding the battery percentage.
pub const BATTERY_ATTR: &str = "battery";
/// Device field holding the signal strength.
pub const RSSI_ATTR: &str = "rssi";
/// Device field holding the flags bitmask.
pub const FLAGS_ATTR: &str = "flags";
/// Device field holding the firmware version string.
pub const FW_VERSION_ATTR: &str = "fw_ver";

/// One gauge value with its label values.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<'d> {
    /// Family this sample belongs to.
    pub desc: &'d MetricDesc,
    /// Label values, matching `desc.labels()` position by position.
    pub labels: Vec<String>,
    /// Gauge value.
    pub value: f64,
}

impl<'d> Sample<'d> {
    /// Create a sample for `desc` with positional label values.
    pub fn new(desc: &'d MetricDesc, labels: Vec<String>, value: f64) -> Self {
        Self {
            desc,
            labels,
            value,
        }
    }
}

/// Project one poll's components into samples.
///
/// Samples are grouped by family in [`MetricDescriptors::all`] order and,
/// within a family, ordered by display key. Attributes with the wrong type
/// only drop their own sample.
pub fn project<'d>(
    components: &ComponentSet,
    descriptors: &'d MetricDescriptors,
) -> Vec<Sample<'d>> {
    let mut samples = Vec::with_capacity(1 + components.len() * 7);

    samples.push(Sample::new(
        &descriptors.components_total,
        Vec::new(),
        components.len() as f64,
    ));

    let numeric = [
        (TARGET_TEMPERATURE_ATTR, &descriptors.target),
        (CURRENT_TEMPERATURE_ATTR, &descriptors.current),
        (BATTERY_ATTR, &descriptors.battery),
        (RSSI_ATTR, &descriptors.rssi),
        (FLAGS_ATTR, &descriptors.flags),
    ];
    for (field, desc) in numeric {
        for component in components {
            match component.number(field) {
                Ok(Some(value)) => samples.push(Sample::new(
                    desc,
                    vec![component.display_key.clone()],
                    value,
                )),
                Ok(None) => {}
                Err(mismatch) => skip(component, &mismatch),
            }
        }
    }

    for component in components {
        match component.string(FW_VERSION_ATTR) {
            Ok(Some(version)) => samples.push(Sample::new(
                &descriptors.info,
                vec![component.display_key.clone(), version.to_string()],
                1.0,
            )),
            Ok(None) => {}
            Err(mismatch) => skip(component, &mismatch),
        }
    }

    for component in components {
        samples.push(Sample::new(
            &descriptors.identity,
            vec![
                component.display_key.clone(),
                component.original_key.clone(),
            ],
            1.0,
        ));
    }

    samples
}

fn skip(component: &NormalizedComponent, mismatch: &TypeMismatch) {
    debug!(
        component = %component.display_key,
        error = %mismatch,
        "Skipping metric for mismatched attribute"
    );
}
