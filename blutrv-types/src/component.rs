//! Components as reported on the wire and as normalized for one poll.

use std::collections::BTreeMap;

use crate::{AttrValue, Attributes, TypeMismatch};

/// Reserved attribute under which the original qualified key is stamped.
///
/// Device payloads never use a leading double underscore.
pub const ORIGINAL_KEY_ATTR: &str = "__orig_key";

/// Top-level body of a `Shelly.GetComponents` response.
///
/// Only the component list matters; `cfg_rev`, `offset` and `total` are
/// ignored. A missing or null list decodes as empty.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentsResponse {
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "null_as_default")
    )]
    pub components: Vec<RawComponent>,
}

/// One component entry exactly as the gateway reports it.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawComponent {
    /// Qualified key including the sub-type prefix, e.g. `blutrv:200`.
    /// Missing or null decodes as empty, which matches no sub-type.
    #[cfg_attr(
        feature = "serde",
        serde(default, deserialize_with = "null_as_default")
    )]
    pub key: String,

    /// Live device state.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub status: Option<Attributes>,

    /// Stored configuration (user-assigned name lives here).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub config: Option<Attributes>,

    /// Static device attributes such as `flags` and `model_id`.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub attrs: Option<Attributes>,
}

impl RawComponent {
    /// Create a component with no attribute sources.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    /// The user-assigned name from `config.name`, trimmed.
    ///
    /// Returns `None` when the field is absent, null, not a string, or blank.
    pub fn configured_name(&self) -> Option<&str> {
        let name = self.config.as_ref()?.get("name")?.as_str()?.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

#[cfg(feature = "serde")]
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A component after filtering, merging and key resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedComponent {
    /// Bare id: the qualified key with its sub-type prefix removed.
    pub id: String,
    /// Display key, unique within the owning [`ComponentSet`].
    pub display_key: String,
    /// Qualified key as reported by the gateway.
    pub original_key: String,
    /// Merged attribute mapping.
    pub attributes: Attributes,
}

impl NormalizedComponent {
    /// Create a normalized component.
    ///
    /// `display_key` is only the requested key; [`ComponentSet::insert`]
    /// may replace it with a suffixed variant.
    pub fn new(
        id: impl Into<String>,
        display_key: impl Into<String>,
        original_key: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            id: id.into(),
            display_key: display_key.into(),
            original_key: original_key.into(),
            attributes,
        }
    }

    /// Look up a merged attribute.
    pub fn attribute(&self, field: &str) -> Option<&AttrValue> {
        self.attributes.get(field)
    }

    /// Numeric attribute lookup.
    ///
    /// `Ok(None)` when absent, `Err` when present with another type.
    pub fn number(&self, field: &str) -> Result<Option<f64>, TypeMismatch> {
        self.attribute(field)
            .map(|value| value.expect_f64(field))
            .transpose()
    }

    /// String attribute lookup.
    ///
    /// `Ok(None)` when absent, `Err` when present with another type.
    pub fn string(&self, field: &str) -> Result<Option<&str>, TypeMismatch> {
        self.attribute(field)
            .map(|value| value.expect_str(field))
            .transpose()
    }
}

/// The normalized, deduplicated result of one poll, keyed by display key.
///
/// Iteration is ordered by display key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentSet {
    components: BTreeMap<String, NormalizedComponent>,
}

impl ComponentSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component, resolving its display key to an unused one.
    ///
    /// If the requested key is taken, `" (1)"`, `" (2)"`, ... are appended to
    /// it until a free key is found. Returns the key actually used.
    pub fn insert(&mut self, mut component: NormalizedComponent) -> &str {
        let key = self.unique_key(&component.display_key);
        component.display_key = key.clone();
        let slot = self.components.entry(key).or_insert(component);
        &slot.display_key
    }

    /// First free key derived from `base`.
    pub fn unique_key(&self, base: &str) -> String {
        if !self.components.contains_key(base) {
            return base.to_string();
        }
        (1u64..)
            .map(|n| format!("{base} ({n})"))
            .find(|candidate| !self.components.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Get a component by display key.
    pub fn get(&self, display_key: &str) -> Option<&NormalizedComponent> {
        self.components.get(display_key)
    }

    /// Check if a display key is in use.
    pub fn contains_key(&self, display_key: &str) -> bool {
        self.components.contains_key(display_key)
    }

    /// Iterate over all display keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Iterate over all components in display-key order.
    pub fn iter(&self) -> impl Iterator<Item = &NormalizedComponent> {
        self.components.values()
    }
}

impl<'a> IntoIterator for &'a ComponentSet {
    type Item = &'a NormalizedComponent;
    type IntoIter = std::collections::btree_map::Values<'a, String, NormalizedComponent>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.values()
    }
}

/// Serializes as `{ display key: merged attributes }`.
#[cfg(feature = "serde")]
impl serde::Serialize for ComponentSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(
            self.components
                .iter()
                .map(|(key, component)| (key, &component.attributes)),
        )
    }
}
