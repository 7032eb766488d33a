//! Extraction and normalization of gateway components.
//!
//! Turns a raw `Shelly.GetComponents` body into a [`ComponentSet`] holding
//! only the components of one device sub-type:
//!
//! 1. keep components whose key contains `"<subtype>:"` (case-insensitive)
//! 2. bare id = everything after that marker
//! 3. merge `id`, then `status`, then `config`, then `attrs` (later wins)
//! 4. display key = trimmed `config.name` if non-empty, else the bare id
//! 5. dedupe display keys with `" (N)"` suffixes
//! 6. stamp the original key under [`ORIGINAL_KEY_ATTR`]

use blutrv_types::{
    AttrValue, Attributes, ComponentSet, ComponentsResponse, NormalizedComponent, RawComponent,
    ORIGINAL_KEY_ATTR,
};

use crate::GatewayError;

/// Default device sub-type: BLU thermostatic radiator valves.
pub const DEFAULT_SUBTYPE: &str = "blutrv";

/// Separator between sub-type and id in a qualified key.
pub const KEY_SEPARATOR: char = ':';

/// Selects and normalizes components of one device sub-type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extractor {
    marker: String,
}

impl Extractor {
    /// Create an extractor for `subtype` (e.g. `"blutrv"`).
    pub fn new(subtype: &str) -> Self {
        Self {
            marker: format!("{}{}", subtype.to_ascii_lowercase(), KEY_SEPARATOR),
        }
    }

    /// The key marker this extractor matches, e.g. `blutrv:`.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Parse a response body and normalize the matching components.
    ///
    /// Malformed input fails the whole call; no partial set is returned.
    pub fn extract(&self, body: &[u8]) -> Result<ComponentSet, GatewayError> {
        let response: ComponentsResponse = serde_json::from_slice(body)?;
        Ok(self.normalize_all(response.components))
    }

    /// Normalize an already decoded component list.
    pub fn normalize_all(&self, components: Vec<RawComponent>) -> ComponentSet {
        let mut set = ComponentSet::new();
        for raw in components {
            if let Some(component) = self.normalize(raw) {
                set.insert(component);
            }
        }
        set
    }

    /// Normalize a single component, or `None` if it is another sub-type.
    ///
    /// The returned display key is not yet deduplicated.
    pub fn normalize(&self, raw: RawComponent) -> Option<NormalizedComponent> {
        let id = self.bare_id(&raw.key)?.to_string();
        let display_key = raw
            .configured_name()
            .map(str::to_string)
            .unwrap_or_else(|| id.clone());

        let mut attributes = Attributes::new();
        attributes.insert("id".to_string(), AttrValue::String(id.clone()));
        for source in [raw.status, raw.config, raw.attrs].into_iter().flatten() {
            attributes.extend(source);
        }
        attributes.insert(
            ORIGINAL_KEY_ATTR.to_string(),
            AttrValue::String(raw.key.clone()),
        );

        Some(NormalizedComponent::new(
            id,
            display_key,
            raw.key,
            attributes,
        ))
    }

    /// Suffix of `key` following the first case-insensitive match of the
    /// marker.
    pub fn bare_id<'k>(&self, key: &'k str) -> Option<&'k str> {
        let needle = self.marker.as_bytes();
        let start = key
            .as_bytes()
            .windows(needle.len())
            .position(|window| window.eq_ignore_ascii_case(needle))?;
        // The matched bytes are ASCII, so this is a char boundary.
        key.get(start + needle.len()..)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_SUBTYPE)
    }
}

/// Extract the components of `subtype` from a response body.
pub fn extract_components(body: &[u8], subtype: &str) -> Result<ComponentSet, GatewayError> {
    Extractor::new(subtype).extract(body)
}
