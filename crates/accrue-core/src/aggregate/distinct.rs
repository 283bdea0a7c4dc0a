//! Module: aggregate::distinct
//! Responsibility: the shared DISTINCT accumulator and its merge rules.
//! Does not own: type admission (callers admit before inserting).
//! Boundary: every `xxx(DISTINCT ...)` variant routes through here.

use crate::{
    aggregate::cumulative::Cumulative,
    context::EvalContext,
    error::InternalError,
    obs::MetricsEvent,
    value::{Number, Value, ValueSet},
};
use derive_more::Deref;

///
/// DistinctSet
///
/// Deduplicated members of a DISTINCT accumulator.
/// Enumeration order is first-insertion order; finalizers that need a
/// canonical order sort explicitly.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct DistinctSet(ValueSet);

impl DistinctSet {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(ValueSet::with_capacity(capacity))
    }

    /// Insert one admitted value; returns false for a duplicate.
    pub fn insert(&mut self, value: Value) -> bool {
        self.0.insert(value)
    }

    /// Union with another partial, folding the smaller into the larger.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0.union(other.0).0)
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.0.into_values()
    }

    /// Project every member to a number; the first non-number is returned
    /// as `Err` with its type label.
    pub(crate) fn numbers(&self) -> Result<Vec<Number>, &'static str> {
        self.0
            .iter()
            .map(|value| value.as_number().ok_or_else(|| value.type_label()))
            .collect()
    }
}

///
/// CumulateInitial step shared by every DISTINCT aggregate.
///
/// `Absent` starts a new set sized by `distinct_capacity`; duplicates leave
/// the accumulator unchanged.
///
pub(crate) fn cumulate_distinct(
    aggregate: &'static str,
    value: Value,
    cumulative: Cumulative,
    ctx: &EvalContext,
) -> Result<Cumulative, InternalError> {
    let mut set = match cumulative {
        Cumulative::Absent => DistinctSet::with_capacity(ctx.config().distinct_capacity),
        Cumulative::Distinct(set) => set,
        other => return Err(InternalError::distinct_shape_mismatch(aggregate, other.shape())),
    };

    if !set.insert(value) {
        ctx.record(MetricsEvent::DistinctDuplicate { aggregate });
    }

    Ok(Cumulative::Distinct(set))
}

/// CumulateIntermediate step shared by every DISTINCT aggregate.
pub(crate) fn merge_distinct(
    aggregate: &'static str,
    part: Cumulative,
    cumulative: Cumulative,
) -> Result<Cumulative, InternalError> {
    match (part, cumulative) {
        (Cumulative::Absent, other) | (other, Cumulative::Absent) => match other {
            Cumulative::Absent | Cumulative::Distinct(_) => Ok(other),
            other => Err(InternalError::distinct_shape_mismatch(aggregate, other.shape())),
        },
        (Cumulative::Distinct(part), Cumulative::Distinct(cumulative)) => {
            Ok(Cumulative::Distinct(cumulative.union(part)))
        }
        (Cumulative::Distinct(_), other) | (other, _) => Err(
            InternalError::distinct_shape_mismatch(aggregate, other.shape()),
        ),
    }
}

/// Borrow the set out of a finished DISTINCT accumulator.
/// `Absent` yields `None` so finalizers can return their default.
pub(crate) fn distinct_members(
    aggregate: &'static str,
    cumulative: Cumulative,
) -> Result<Option<DistinctSet>, InternalError> {
    match cumulative {
        Cumulative::Absent => Ok(None),
        Cumulative::Distinct(set) => Ok(Some(set)),
        other => Err(InternalError::distinct_shape_mismatch(aggregate, other.shape())),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::{
        aggregate::{
            cumulative::Cumulative,
            distinct::{cumulate_distinct, distinct_members, merge_distinct},
        },
        context::EvalContext,
        error::{ErrorClass, ErrorOrigin},
        value::{Number, Value},
    };

    fn set_of(xs: &[i64]) -> Cumulative {
        let ctx = EvalContext::default();
        xs.iter().fold(Cumulative::Absent, |acc, x| {
            cumulate_distinct("test", Value::from(*x), acc, &ctx).expect("insert should succeed")
        })
    }

    fn len(cumulative: Cumulative) -> usize {
        distinct_members("test", cumulative)
            .expect("distinct shape")
            .map_or(0, |set| set.len())
    }

    #[test]
    fn duplicates_are_idempotent() {
        assert_eq!(len(set_of(&[3, 1, 3, 2, 1])), 3);
    }

    #[test]
    fn merge_treats_absent_as_identity() {
        let merged = merge_distinct("test", Cumulative::Absent, set_of(&[1, 2])).expect("merge");
        assert_eq!(merged, set_of(&[1, 2]));

        let merged = merge_distinct("test", set_of(&[1, 2]), Cumulative::Absent).expect("merge");
        assert_eq!(merged, set_of(&[2, 1]));

        let merged =
            merge_distinct("test", Cumulative::Absent, Cumulative::Absent).expect("merge");
        assert!(merged.is_absent());
    }

    #[test]
    fn merge_unions_partials() {
        let merged = merge_distinct("test", set_of(&[1, 2, 3]), set_of(&[3, 4])).expect("merge");
        assert_eq!(merged, set_of(&[1, 2, 3, 4]));
    }

    #[test]
    fn non_set_partials_are_type_errors() {
        let err = merge_distinct("test", Cumulative::Scalar(Number::ONE), set_of(&[1]))
            .expect_err("scalar partial must be rejected");
        assert_eq!(err.class, ErrorClass::TypeMismatch);
        assert_eq!(err.origin, ErrorOrigin::Distinct);

        let err = cumulate_distinct(
            "test",
            Value::from(1),
            Cumulative::Scalar(Number::ONE),
            &EvalContext::default(),
        )
        .expect_err("scalar accumulator must be rejected");
        assert_eq!(err.class, ErrorClass::TypeMismatch);
    }
}
