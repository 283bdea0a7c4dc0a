use crate::{
    aggregate::{
        admission::Admission,
        base::AggregateBase,
        compound,
        cumulative::Cumulative,
        distinct::{DistinctSet, cumulate_distinct, distinct_members, merge_distinct},
        kind::AggregateKind,
        protocol::Aggregate,
    },
    context::EvalContext,
    error::{InternalError, RemoveRestriction},
    row::Item,
    value::{Number, Value},
};

///
/// Sum
///
/// SUM over NUMBER operands. Integers stay exact until they overflow.
/// Carries a row count so a full remove round-trip yields NULL again.
///

#[derive(Clone, Debug)]
pub struct Sum {
    base: AggregateBase,
}

impl Sum {
    #[must_use]
    pub const fn new(base: AggregateBase) -> Self {
        Self { base }
    }
}

impl Aggregate for Sum {
    fn kind(&self) -> AggregateKind {
        AggregateKind::Sum
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

        if self.base.is_distinct() {
            return cumulate_distinct(name, value.into_owned(), cumulative, ctx);
        }

        compound::add(name, admitted_number(name, &value)?, cumulative)
    }

    fn cumulate_intermediate(
        &self,
        part: Cumulative,
        cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        if self.base.is_distinct() {
            return merge_distinct(self.name(), part, cumulative);
        }

        compound::merge(self.name(), part, cumulative)
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

        match self
            .base
            .admitted_operand(item, ctx, name, Admission::Number)?
        {
            Some(value) => compound::remove(name, admitted_number(name, &value)?, cumulative),
            None => Ok(cumulative),
        }
    }

    fn compute_final(
        &self,
        cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Value, InternalError> {
        let name = self.name();
        if self.base.is_distinct() {
            return match distinct_members(name, cumulative)? {
                Some(set) if !set.is_empty() => distinct_sum(name, &set).map(Value::Number),
                _ => Ok(self.default_value()),
            };
        }

        Ok(compound::finish(name, cumulative)?
            .map_or_else(|| self.default_value(), |(sum, _)| Value::Number(sum)))
    }
}

/// Number carried by a value that already passed `Admission::Number`.
pub(crate) fn admitted_number(
    aggregate: &'static str,
    value: &Value,
) -> Result<Number, InternalError> {
    value
        .as_number()
        .ok_or_else(|| InternalError::aggregate_field_mismatch(aggregate, "operand", value.type_label()))
}

/// Sum of the members of a DISTINCT numeric set.
pub(crate) fn distinct_sum(
    aggregate: &'static str,
    set: &DistinctSet,
) -> Result<Number, InternalError> {
    let numbers = set
        .numbers()
        .map_err(|found| InternalError::aggregate_field_mismatch(aggregate, "members", found))?;

    compound::sum_numbers(aggregate, &numbers)
}
