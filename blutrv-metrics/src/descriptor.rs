//! Metric family descriptors.
//!
//! Built once at startup and passed by reference to the projector and the
//! encoder; there is no global registry.

/// Label carrying the display key of a component.
pub const COMPONENT_LABEL: &str = "component";

/// Label carrying the firmware version on the info gauge.
pub const FW_VERSION_LABEL: &str = "fw_ver";

/// Label carrying the original qualified key on the identity gauge.
pub const ORIGINAL_KEY_LABEL: &str = "orig_key";

/// Default metric namespace.
pub const DEFAULT_NAMESPACE: &str = "blutrv";

/// Describes one gauge family: its full name, help text and label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDesc {
    name: String,
    help: &'static str,
    labels: &'static [&'static str],
}

impl MetricDesc {
    /// Create a descriptor named `<namespace>_<suffix>`.
    pub fn new(
        namespace: &str,
        suffix: &str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        let name = if namespace.is_empty() {
            suffix.to_string()
        } else {
            format!("{namespace}_{suffix}")
        };
        Self { name, help, labels }
    }

    /// Full metric name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// HELP text.
    pub fn help(&self) -> &str {
        self.help
    }

    /// Label names, in the order sample label values are given.
    pub fn labels(&self) -> &[&'static str] {
        self.labels
    }
}

/// Handles for every family the exporter emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptors {
    pub components_total: MetricDesc,
    pub target: MetricDesc,
    pub current: MetricDesc,
    pub battery: MetricDesc,
    pub rssi: MetricDesc,
    pub flags: MetricDesc,
    /// Info gauge with the firmware version as a label.
    pub info: MetricDesc,
    /// Mapping between the chosen display key and the original key.
    pub identity: MetricDesc,
}

impl MetricDescriptors {
    /// Build all descriptors under `namespace` (e.g. `blutrv`).
    pub fn new(namespace: &str) -> Self {
        const COMPONENT: &[&str] = &[COMPONENT_LABEL];

        Self {
            components_total: MetricDesc::new(
                namespace,
                "components_total",
                "Number of blu components found in last scrape",
                &[],
            ),
            target: MetricDesc::new(
                namespace,
                "target_c",
                "Target temperature C for blu components",
                COMPONENT,
            ),
            current: MetricDesc::new(
                namespace,
                "current_c",
                "Current temperature C for blu components",
                COMPONENT,
            ),
            battery: MetricDesc::new(
                namespace,
                "battery",
                "Battery percentage for blu components",
                COMPONENT,
            ),
            rssi: MetricDesc::new(
                namespace,
                "rssi",
                "RSSI value for blu components",
                COMPONENT,
            ),
            flags: MetricDesc::new(
                namespace,
                "flags",
                "Flags attribute for blu components",
                COMPONENT,
            ),
            info: MetricDesc::new(
                namespace,
                "info",
                "Info labels for blu components",
                &[COMPONENT_LABEL, FW_VERSION_LABEL],
            ),
            identity: MetricDesc::new(
                namespace,
                "identity",
                "Identity mapping for blu components (component -> original key)",
                &[COMPONENT_LABEL, ORIGINAL_KEY_LABEL],
            ),
        }
    }

    /// Every family, in exposition order.
    pub fn all(&self) -> [&MetricDesc; 8] {
        [
            &self.components_total,
            &self.target,
            &self.current,
            &self.battery,
            &self.rssi,
            &self.flags,
            &self.info,
            &self.identity,
        ]
    }
}

impl Default for MetricDescriptors {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}
