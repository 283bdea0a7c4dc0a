use crate::value::Value;
use std::{cmp::Ordering, collections::BTreeMap};

/// Total canonical comparator used by sorting, selection and set equality.
///
/// Ordering rules:
/// 1. Canonical type rank
/// 2. Type-specific comparison for same-ranked values
///
/// Objects compare by entry count first, then by entries in key order.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.tag().rank().cmp(&right.tag().rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

#[allow(clippy::match_same_arms)]
fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => canonical_cmp_array(a, b),
        (Value::Object(a), Value::Object(b)) => canonical_cmp_object(a, b),
        (Value::Binary(a), Value::Binary(b)) => a.cmp(b),
        (Value::Missing, Value::Missing) | (Value::Null, Value::Null) => Ordering::Equal,
        _ => Ordering::Equal,
    }
}

fn canonical_cmp_array(left: &[Value], right: &[Value]) -> Ordering {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp(left, right);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

fn canonical_cmp_object(left: &BTreeMap<String, Value>, right: &BTreeMap<String, Value>) -> Ordering {
    let len = left.len().cmp(&right.len());
    if len != Ordering::Equal {
        return len;
    }

    for ((left_key, left_value), (right_key, right_value)) in left.iter().zip(right.iter()) {
        let key_cmp = left_key.cmp(right_key);
        if key_cmp != Ordering::Equal {
            return key_cmp;
        }

        let value_cmp = canonical_cmp(left_value, right_value);
        if value_cmp != Ordering::Equal {
            return value_cmp;
        }
    }

    Ordering::Equal
}
