use crate::value::Value;

///
/// ValueTag
///
/// Stable canonical value-type tag used by hashing and ordering surfaces.
/// Declaration order is the cross-type collation order:
/// MISSING < NULL < BOOLEAN < NUMBER < STRING < ARRAY < OBJECT < BINARY.
///
/// IMPORTANT:
/// Tag values feed the canonical hash and must remain fixed.
///

#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ValueTag {
    Missing = 1,
    Null = 2,
    Bool = 3,
    Number = 4,
    Text = 5,
    Array = 6,
    Object = 7,
    Binary = 8,
}

impl ValueTag {
    /// Stable wire/hash byte tag for this variant.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Stable rank used for cross-type ordering; 0-based.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self.to_u8() - 1
    }

    /// Stable human-readable type label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::Text => "string",
            Self::Array => "array",
            Self::Object => "object",
            Self::Binary => "binary",
        }
    }
}

#[must_use]
pub(super) const fn canonical_tag(value: &Value) -> ValueTag {
    match value {
        Value::Missing => ValueTag::Missing,
        Value::Null => ValueTag::Null,
        Value::Bool(_) => ValueTag::Bool,
        Value::Number(_) => ValueTag::Number,
        Value::Text(_) => ValueTag::Text,
        Value::Array(_) => ValueTag::Array,
        Value::Object(_) => ValueTag::Object,
        Value::Binary(_) => ValueTag::Binary,
    }
}
