use crate::{
    aggregate::{cumulative::Cumulative, protocol::merge_mismatch},
    error::InternalError,
    value::Number,
};

const COMPOUND: &str = "compound";

///
/// Running `{sum, count}` arithmetic shared by SUM and AVG.
/// Every step updates both fields together.
///

pub(crate) fn add(
    aggregate: &'static str,
    n: Number,
    cumulative: Cumulative,
) -> Result<Cumulative, InternalError> {
    match cumulative {
        Cumulative::Absent => Ok(Cumulative::Compound { sum: n, count: 1 }),
        Cumulative::Compound { sum, count } => combine(aggregate, (sum, count), (n, 1)),
        other => Err(InternalError::aggregate_shape_mismatch(
            aggregate,
            COMPOUND,
            other.shape(),
        )),
    }
}

pub(crate) fn merge(
    aggregate: &'static str,
    part: Cumulative,
    cumulative: Cumulative,
) -> Result<Cumulative, InternalError> {
    match (part, cumulative) {
        (Cumulative::Absent, other) | (other, Cumulative::Absent) => Ok(other),
        (
            Cumulative::Compound {
                sum: part_sum,
                count: part_count,
            },
            Cumulative::Compound { sum, count },
        ) => combine(aggregate, (sum, count), (part_sum, part_count)),
        (part, cumulative) => Err(merge_mismatch(aggregate, COMPOUND, &part, &cumulative)),
    }
}

/// Field-wise subtraction of one admitted value.
pub(crate) fn remove(
    aggregate: &'static str,
    n: Number,
    cumulative: Cumulative,
) -> Result<Cumulative, InternalError> {
    match cumulative {
        Cumulative::Compound { sum, count } if count > 0 => {
            let sum = sum
                .checked_sub(n)
                .ok_or_else(|| InternalError::numeric_overflow(aggregate))?;

            Ok(Cumulative::Compound {
                sum,
                count: count - 1,
            })
        }
        Cumulative::Absent | Cumulative::Compound { .. } => {
            Err(InternalError::count_underflow(aggregate))
        }
        other => Err(InternalError::aggregate_shape_mismatch(
            aggregate,
            COMPOUND,
            other.shape(),
        )),
    }
}

/// Unpack a finished accumulator; `Absent` and an emptied accumulator both
/// yield `None`.
pub(crate) fn finish(
    aggregate: &'static str,
    cumulative: Cumulative,
) -> Result<Option<(Number, u64)>, InternalError> {
    match cumulative {
        Cumulative::Absent | Cumulative::Compound { count: 0, .. } => Ok(None),
        Cumulative::Compound { sum, count } => Ok(Some((sum, count))),
        other => Err(InternalError::aggregate_shape_mismatch(
            aggregate,
            COMPOUND,
            other.shape(),
        )),
    }
}

/// Sum a slice of numbers with the same overflow promotion as `add`.
pub(crate) fn sum_numbers(
    aggregate: &'static str,
    numbers: &[Number],
) -> Result<Number, InternalError> {
    numbers.iter().try_fold(Number::ZERO, |acc, n| {
        acc.checked_add(*n)
            .ok_or_else(|| InternalError::numeric_overflow(aggregate))
    })
}

fn combine(
    aggregate: &'static str,
    (sum, count): (Number, u64),
    (other_sum, other_count): (Number, u64),
) -> Result<Cumulative, InternalError> {
    let sum = sum
        .checked_add(other_sum)
        .ok_or_else(|| InternalError::numeric_overflow(aggregate))?;
    let count = count
        .checked_add(other_count)
        .ok_or_else(|| InternalError::numeric_overflow(aggregate))?;

    Ok(Cumulative::Compound { sum, count })
}
