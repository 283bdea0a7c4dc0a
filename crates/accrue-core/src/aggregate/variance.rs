//! Module: aggregate::variance
//! Responsibility: VARIANCE / VAR_SAMP / VAR_POP / STDDEV / STDDEV_SAMP / STDDEV_POP.
//! Does not own: numeric admission (see `admission`).
//! Boundary: accumulator shape is `Dispersion` or `Distinct`.

use crate::{
    aggregate::{
        admission::Admission,
        base::AggregateBase,
        compound,
        cumulative::Cumulative,
        distinct::{cumulate_distinct, distinct_members, merge_distinct},
        kind::AggregateKind,
        list::ValueList,
        protocol::{Aggregate, merge_mismatch},
        sum::admitted_number,
    },
    context::EvalContext,
    error::{InternalError, RemoveRestriction},
    row::Item,
    value::{Number, Value},
};

const DISPERSION: &str = "dispersion";

///
/// Dispersion
///
/// One struct serves the whole family; `kind` selects the denominator
/// correction and whether the square root is taken.
///

#[derive(Clone, Debug)]
pub struct Dispersion {
    base: AggregateBase,
    kind: AggregateKind,
}

impl Dispersion {
    /// `kind` must be one of the dispersion kinds.
    #[must_use]
    pub const fn new(kind: AggregateKind, base: AggregateBase) -> Self {
        Self { base, kind }
    }

    // Sample variants divide by n - 1, population variants by n.
    const fn delta(&self) -> f64 {
        match self.kind {
            AggregateKind::VarPop | AggregateKind::StddevPop => 0.0,
            _ => 1.0,
        }
    }

    const fn takes_root(&self) -> bool {
        matches!(
            self.kind,
            AggregateKind::Stddev | AggregateKind::StddevSamp | AggregateKind::StddevPop
        )
    }
}

impl Aggregate for Dispersion {
    fn kind(&self) -> AggregateKind {
        self.kind
    }

    fn base(&self) -> &AggregateBase {
        &self.base
    }

    fn cumulate_initial(
        &self,
        item: &Item,
        cumulative: Cumulative,
        ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        let name = self.name();
        let Some(value) = self
            .base
            .admitted_operand(item, ctx, name, Admission::Number)?
        else {
            return Ok(cumulative);
        };
        let value = value.into_owned();

        if self.base.is_distinct() {
            return cumulate_distinct(name, value, cumulative, ctx);
        }

        let n = admitted_number(name, &value)?;
        match cumulative {
            Cumulative::Absent => Ok(Cumulative::Dispersion {
                values: ValueList::singleton(value, ctx.config().list_capacity),
                sum: n,
            }),
            Cumulative::Dispersion { mut values, sum } => {
                values.push(value);
                let sum = sum
                    .checked_add(n)
                    .ok_or_else(|| InternalError::numeric_overflow(name))?;

                Ok(Cumulative::Dispersion { values, sum })
            }
            other => Err(InternalError::aggregate_shape_mismatch(
                name,
                DISPERSION,
                other.shape(),
            )),
        }
    }

    fn cumulate_intermediate(
        &self,
        part: Cumulative,
        cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        let name = self.name();
        if self.base.is_distinct() {
            return merge_distinct(name, part, cumulative);
        }

        match (part, cumulative) {
            (Cumulative::Absent, other) | (other, Cumulative::Absent) => Ok(other),
            (
                Cumulative::Dispersion {
                    values: part_values,
                    sum: part_sum,
                },
                Cumulative::Dispersion { values, sum },
            ) => {
                let sum = sum
                    .checked_add(part_sum)
                    .ok_or_else(|| InternalError::numeric_overflow(name))?;

                Ok(Cumulative::Dispersion {
                    values: values.union(part_values),
                    sum,
                })
            }
            (part, cumulative) => Err(merge_mismatch(name, DISPERSION, &part, &cumulative)),
        }
    }

    fn cumulate_remove(
        &self,
        _item: &Item,
        _cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        let restriction = if self.base.is_distinct() {
            RemoveRestriction::Distinct
        } else {
            RemoveRestriction::NotInvertible
        };

        Err(InternalError::remove_unsupported(self.name(), restriction))
    }

    fn compute_final(
        &self,
        cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Value, InternalError> {
        let name = self.name();
        let (numbers, sum) = if self.base.is_distinct() {
            let Some(set) = distinct_members(name, cumulative)? else {
                return Ok(self.default_value());
            };
            let numbers = set.numbers().map_err(|found| {
                InternalError::aggregate_field_mismatch(name, "members", found)
            })?;
            let sum = compound::sum_numbers(name, &numbers)?;

            (numbers, sum)
        } else {
            match cumulative {
                Cumulative::Absent => return Ok(self.default_value()),
                Cumulative::Dispersion { values, sum } => {
                    let numbers = values.numbers().map_err(|found| {
                        InternalError::aggregate_field_mismatch(name, "values", found)
                    })?;

                    (numbers, sum)
                }
                other => {
                    return Err(InternalError::aggregate_shape_mismatch(
                        name,
                        DISPERSION,
                        other.shape(),
                    ));
                }
            }
        };

        let Some(variance) = variance(&numbers, sum, self.delta()) else {
            return Ok(self.default_value());
        };
        let result = if self.takes_root() {
            variance.sqrt()
        } else {
            variance
        };

        Number::from_f64(result)
            .map(Value::Number)
            .ok_or_else(|| InternalError::numeric_overflow(name))
    }
}

/// Σ(x − mean)² / (n − delta); `None` for no values, `0` for one.
#[expect(clippy::cast_precision_loss)]
fn variance(numbers: &[Number], sum: Number, delta: f64) -> Option<f64> {
    match numbers.len() {
        0 => None,
        1 => Some(0.0),
        len => {
            let count = len as f64;
            let mean = sum.to_f64() / count;
            let squares: f64 = numbers
                .iter()
                .map(|n| {
                    let d = n.to_f64() - mean;
                    d * d
                })
                .sum();

            Some(squares / (count - delta))
        }
    }
}
