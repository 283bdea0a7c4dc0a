use crate::value::{Value, canonical_cmp};
use std::{cmp::Ordering, fmt};

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    const fn accepts(self, ord: Ordering) -> bool {
        match self {
            Self::Eq => matches!(ord, Ordering::Equal),
            Self::Ne => !matches!(ord, Ordering::Equal),
            Self::Lt => matches!(ord, Ordering::Less),
            Self::Lte => !matches!(ord, Ordering::Greater),
            Self::Gt => matches!(ord, Ordering::Greater),
            Self::Gte => !matches!(ord, Ordering::Less),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        };
        write!(f, "{symbol}")
    }
}

///
/// TypeTest
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeTest {
    Missing,
    Null,
    Valued,
    Number,
}

impl TypeTest {
    #[must_use]
    pub const fn matches(self, value: &Value) -> bool {
        match self {
            Self::Missing => value.is_missing(),
            Self::Null => value.is_null(),
            Self::Valued => value.is_valued(),
            Self::Number => value.is_number(),
        }
    }
}

impl fmt::Display for TypeTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Missing => "IS MISSING",
            Self::Null => "IS NULL",
            Self::Valued => "IS VALUED",
            Self::Number => "IS NUMBER",
        };
        write!(f, "{label}")
    }
}

/// MISSING and NULL operands propagate; MISSING wins.
pub(super) fn compare(op: CompareOp, left: &Value, right: &Value) -> Value {
    if left.is_missing() || right.is_missing() {
        return Value::Missing;
    }
    if left.is_null() || right.is_null() {
        return Value::Null;
    }

    Value::Bool(op.accepts(canonical_cmp(left, right)))
}

// Truth value of one operand: Some(bool) for booleans, None otherwise.
// Non-boolean values are unknown, like NULL.
const fn truth(value: &Value) -> Option<bool> {
    value.as_bool()
}

const fn unknown(left: &Value, right: &Value) -> Value {
    if left.is_missing() || right.is_missing() {
        Value::Missing
    } else {
        Value::Null
    }
}

pub(super) const fn and(left: &Value, right: &Value) -> Value {
    match (truth(left), truth(right)) {
        (Some(false), _) | (_, Some(false)) => Value::Bool(false),
        (Some(true), Some(true)) => Value::Bool(true),
        _ => unknown(left, right),
    }
}

pub(super) const fn or(left: &Value, right: &Value) -> Value {
    match (truth(left), truth(right)) {
        (Some(true), _) | (_, Some(true)) => Value::Bool(true),
        (Some(false), Some(false)) => Value::Bool(false),
        _ => unknown(left, right),
    }
}

pub(super) const fn not(value: &Value) -> Value {
    match value {
        Value::Bool(b) => Value::Bool(!*b),
        Value::Missing => Value::Missing,
        _ => Value::Null,
    }
}
