//! Module: value
//! Responsibility: the dynamic document value model and its total order.
//! Does not own: expression evaluation or aggregate accumulation.
//! Boundary: every operand, filter result and final aggregate is a `Value`.

mod compare;
pub(crate) mod hash;
mod number;
mod set;
mod tag;

#[cfg(test)]
mod tests;

use std::{cmp::Ordering, collections::BTreeMap, fmt};

// re-exports
pub use compare::canonical_cmp;
pub use number::{Float64, Number};
pub use set::ValueSet;
pub use tag::ValueTag;

static MISSING: Value = Value::Missing;

///
/// Value
///
/// Dynamically typed document value.
///
/// `Missing` is the absence of a field; `Null` is an explicit JSON null.
/// Equality and ordering follow `canonical_cmp`, so numerically equal
/// numbers compare equal regardless of representation.
///

#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Missing,
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Array(Vec<Self>),
    Object(BTreeMap<String, Self>),
    Binary(Vec<u8>),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a float value; non-finite input becomes `Null`.
    #[must_use]
    pub fn float(v: f64) -> Self {
        Number::from_f64(v).map_or(Self::Null, Self::Number)
    }

    #[must_use]
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    ///
    /// TYPES
    ///

    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        tag::canonical_tag(self)
    }

    /// Stable type label used in diagnostics.
    #[must_use]
    pub const fn type_label(&self) -> &'static str {
        self.tag().label()
    }

    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for every value above NULL in the collation order.
    #[must_use]
    pub const fn is_valued(&self) -> bool {
        !matches!(self, Self::Missing | Self::Null)
    }

    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    ///
    /// FIELDS
    ///

    /// Look up one object field. Non-objects and absent keys yield `Missing`.
    #[must_use]
    pub fn field(&self, name: &str) -> &Self {
        match self {
            Self::Object(entries) => entries.get(name).unwrap_or(&MISSING),
            _ => &MISSING,
        }
    }

    /// Follow a dotted field path, e.g. `["a", "b"]` for `a.b`.
    #[must_use]
    pub fn path<S: AsRef<str>>(&self, path: &[S]) -> &Self {
        path.iter().fold(self, |value, name| value.field(name.as_ref()))
    }

    /// Set one object field, returning the previous value.
    /// Writing into a non-object value is a no-op that returns `None`.
    pub fn set_field(&mut self, name: impl Into<String>, value: Self) -> Option<Self> {
        match self {
            Self::Object(entries) => entries.insert(name.into(), value),
            _ => None,
        }
    }

    ///
    /// JSON
    ///

    /// Convert to JSON. `Missing` becomes `null`; binary becomes a byte array.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Missing | Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Number(Number::Int(i)) => Json::from(*i),
            Self::Number(Number::Float(f)) => {
                serde_json::Number::from_f64(f.get()).map_or(Json::Null, Json::Number)
            }
            Self::Text(s) => Json::String(s.clone()),
            Self::Array(xs) => Json::Array(xs.iter().map(Self::to_json).collect()),
            Self::Object(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Binary(bytes) => Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
        }
    }
}

impl Eq for Value {}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        canonical_cmp(self, other) == Ordering::Equal
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_cmp(self, other)
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "MISSING"),
            Self::Binary(bytes) => write!(f, "<binary {} bytes>", bytes.len()),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

///
/// CONVERSIONS
///

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Number(Number::Int(i)),
                None => n.as_f64().map_or(Self::Null, Self::float),
            },
            Json::String(s) => Self::Text(s),
            Json::Array(xs) => Self::Array(xs.into_iter().map(Self::from).collect()),
            Json::Object(entries) => Self::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Number(Number::Int(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Number(Number::from(i))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::float(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<Self>> for Value {
    fn from(xs: Vec<Self>) -> Self {
        Self::Array(xs)
    }
}
