//! Module: aggregate::count
//! Responsibility: COUNT and COUNTN.
//! Does not own: DISTINCT set mechanics (see `distinct`).
//! Boundary: accumulator shape is `Scalar` or `Distinct`.

use crate::{
    aggregate::{
        admission::Admission,
        base::AggregateBase,
        cumulative::Cumulative,
        distinct::{cumulate_distinct, distinct_members, merge_distinct},
        kind::AggregateKind,
        protocol::{Aggregate, merge_mismatch},
    },
    context::EvalContext,
    error::{InternalError, RemoveRestriction},
    row::Item,
    value::{Number, Value},
};

const SCALAR: &str = "scalar";

///
/// Count
///
/// COUNT admits anything above NULL (the row itself for `COUNT(*)`);
/// COUNTN admits numbers only. Both add one per admitted row.
///

#[derive(Clone, Debug)]
pub struct Count {
    base: AggregateBase,
    numeric: bool,
}

impl Count {
    #[must_use]
    pub const fn count(base: AggregateBase) -> Self {
        Self {
            base,
            numeric: false,
        }
    }

    #[must_use]
    pub const fn countn(base: AggregateBase) -> Self {
        Self {
            base,
            numeric: true,
        }
    }

    const fn admission(&self) -> Admission {
        if self.numeric {
            Admission::Number
        } else {
            Admission::Valued
        }
    }
}

impl Aggregate for Count {
    fn kind(&self) -> AggregateKind {
        if self.numeric {
            AggregateKind::CountN
        } else {
            AggregateKind::Count
        }
    }

    fn base(&self) -> &AggregateBase {
        &self.base
    }

    fn default_value(&self) -> Value {
        Value::Number(Number::ZERO)
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
            .admitted_operand(item, ctx, name, self.admission())?
        else {
            return Ok(cumulative);
        };

        if self.base.is_distinct() {
            return cumulate_distinct(name, value.into_owned(), cumulative, ctx);
        }

        match cumulative {
            Cumulative::Absent => Ok(Cumulative::Scalar(Number::ONE)),
            Cumulative::Scalar(total) => add(name, total, Number::ONE),
            other => Err(InternalError::aggregate_shape_mismatch(
                name,
                SCALAR,
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
            (Cumulative::Scalar(part), Cumulative::Scalar(total)) => add(name, total, part),
            (part, cumulative) => Err(merge_mismatch(name, SCALAR, &part, &cumulative)),
        }
    }

    fn cumulate_remove(
        &self,
        item: &Item,
        cumulative: Cumulative,
        ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        let name = self.name();
        if self.base.is_distinct() {
            return Err(InternalError::remove_unsupported(
                name,
                RemoveRestriction::Distinct,
            ));
        }
        if self
            .base
            .admitted_operand(item, ctx, name, self.admission())?
            .is_none()
        {
            return Ok(cumulative);
        }

        match cumulative {
            Cumulative::Scalar(total) if total.is_positive() => total
                .checked_sub(Number::ONE)
                .map(Cumulative::Scalar)
                .ok_or_else(|| InternalError::numeric_overflow(name)),
            Cumulative::Absent | Cumulative::Scalar(_) => {
                Err(InternalError::count_underflow(name))
            }
            other => Err(InternalError::aggregate_shape_mismatch(
                name,
                SCALAR,
                other.shape(),
            )),
        }
    }

    fn compute_final(
        &self,
        cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Value, InternalError> {
        let name = self.name();
        if self.base.is_distinct() {
            let len = distinct_members(name, cumulative)?.map_or(0, |set| set.len());
            let len = i64::try_from(len).map_err(|_| InternalError::numeric_overflow(name))?;

            return Ok(Value::from(len));
        }

        match cumulative {
            Cumulative::Absent => Ok(self.default_value()),
            Cumulative::Scalar(total) => Ok(Value::Number(total)),
            other => Err(InternalError::aggregate_shape_mismatch(
                name,
                SCALAR,
                other.shape(),
            )),
        }
    }
}

fn add(aggregate: &'static str, total: Number, n: Number) -> Result<Cumulative, InternalError> {
    total
        .checked_add(n)
        .map(Cumulative::Scalar)
        .ok_or_else(|| InternalError::numeric_overflow(aggregate))
}
