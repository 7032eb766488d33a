//! Dynamic attribute values reported by the gateway.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// A merged attribute mapping, ordered by attribute name.
pub type Attributes = BTreeMap<String, AttrValue>;

/// A single device-reported field value.
///
/// Gateway payloads mix numbers, strings, booleans and nulls in the same
/// object, and device configuration may nest arrays and objects. Metric
/// emission only ever consumes the scalar variants through the checked
/// accessors below; anything else is carried through to the debug snapshot
/// untouched.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(untagged))]
pub enum AttrValue {
    /// JSON `null`.
    #[default]
    Null,
    /// JSON `true` / `false`.
    Bool(bool),
    /// Any JSON number. Integers are widened to `f64`.
    Number(f64),
    /// JSON string.
    String(String),
    /// JSON array.
    Array(Vec<AttrValue>),
    /// JSON object.
    Object(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    /// The kind of this value, for diagnostics.
    pub fn kind(&self) -> ValueKind {
        match self {
            AttrValue::Null => ValueKind::Null,
            AttrValue::Bool(_) => ValueKind::Bool,
            AttrValue::Number(_) => ValueKind::Number,
            AttrValue::String(_) => ValueKind::String,
            AttrValue::Array(_) => ValueKind::Array,
            AttrValue::Object(_) => ValueKind::Object,
        }
    }

    /// Returns the number if this is a `Number`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the flag if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Check if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Interpret this value as a number, failing with a [`TypeMismatch`]
    /// naming `field` otherwise.
    pub fn expect_f64(&self, field: &str) -> Result<f64, TypeMismatch> {
        self.as_f64()
            .ok_or_else(|| TypeMismatch::new(field, ValueKind::Number, self.kind()))
    }

    /// Interpret this value as a string, failing with a [`TypeMismatch`]
    /// naming `field` otherwise.
    pub fn expect_str(&self, field: &str) -> Result<&str, TypeMismatch> {
        self.as_str()
            .ok_or_else(|| TypeMismatch::new(field, ValueKind::String, self.kind()))
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Number(n as f64)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

// Whole numbers go back out as integers so `100` does not become `100.0`.
#[cfg(feature = "serde")]
impl serde::Serialize for AttrValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            AttrValue::Null => serializer.serialize_unit(),
            AttrValue::Bool(b) => serializer.serialize_bool(*b),
            AttrValue::Number(n) => match as_integer(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            AttrValue::String(s) => serializer.serialize_str(s),
            AttrValue::Array(items) => serializer.collect_seq(items),
            AttrValue::Object(map) => serializer.collect_map(map),
        }
    }
}

/// Largest magnitude at which every integer is exactly representable in f64.
#[cfg(feature = "serde")]
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

#[cfg(feature = "serde")]
fn as_integer(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
        Some(n as i64)
    } else {
        None
    }
}

/// Discriminant of an [`AttrValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// An attribute was present but carried an unexpected type.
///
/// Non-fatal: the consumer skips whatever it wanted to derive from the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("attribute '{field}' expected {expected}, found {found}")]
pub struct TypeMismatch {
    /// Attribute name.
    pub field: String,
    /// Kind the consumer asked for.
    pub expected: ValueKind,
    /// Kind actually present.
    pub found: ValueKind,
}

impl TypeMismatch {
    /// Create a new mismatch record.
    pub fn new(field: impl Into<String>, expected: ValueKind, found: ValueKind) -> Self {
        Self {
            field: field.into(),
            expected,
            found,
        }
    }
}
