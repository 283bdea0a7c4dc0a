use crate::{
    aggregate::{
        admission::Admission,
        base::AggregateBase,
        compound,
        cumulative::Cumulative,
        distinct::{cumulate_distinct, distinct_members, merge_distinct},
        kind::AggregateKind,
        protocol::Aggregate,
        sum::{admitted_number, distinct_sum},
    },
    context::EvalContext,
    error::{InternalError, RemoveRestriction},
    row::Item,
    value::{Number, Value},
};

///
/// Avg
///
/// AVG keeps `{sum, count}`; CumulateInitial builds `{value, 1}` and folds it
/// with the same field-wise merge as CumulateIntermediate.
///

#[derive(Clone, Debug)]
pub struct Avg {
    base: AggregateBase,
}

impl Avg {
    #[must_use]
    pub const fn new(base: AggregateBase) -> Self {
        Self { base }
    }
}

impl Aggregate for Avg {
    fn kind(&self) -> AggregateKind {
        AggregateKind::Avg
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

        let single = Cumulative::Compound {
            sum: admitted_number(name, &value)?,
            count: 1,
        };
        compound::merge(name, single, cumulative)
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
        let (sum, count) = if self.base.is_distinct() {
            match distinct_members(name, cumulative)? {
                Some(set) if !set.is_empty() => (distinct_sum(name, &set)?, set.len() as u64),
                _ => return Ok(self.default_value()),
            }
        } else {
            match compound::finish(name, cumulative)? {
                Some(pair) => pair,
                None => return Ok(self.default_value()),
            }
        };

        let count = i64::try_from(count).map_err(|_| InternalError::numeric_overflow(name))?;
        sum.checked_div(Number::Int(count))
            .map(Value::Number)
            .ok_or_else(|| InternalError::numeric_overflow(name))
    }
}
