use crate::{
    aggregate::{
        admission::Admission,
        base::AggregateBase,
        cumulative::Cumulative,
        distinct::{cumulate_distinct, distinct_members, merge_distinct},
        kind::AggregateKind,
        list::ValueList,
        protocol::{Aggregate, merge_mismatch},
        select,
    },
    context::EvalContext,
    error::{InternalError, RemoveRestriction},
    row::Item,
    value::Value,
};

const MULTISET: &str = "multiset";

///
/// Median
///
/// Keeps every admitted number and selects the middle rank at finalization.
/// Selection is linear in the group size.
///

#[derive(Clone, Debug)]
pub struct Median {
    base: AggregateBase,
}

impl Median {
    #[must_use]
    pub const fn new(base: AggregateBase) -> Self {
        Self { base }
    }
}

impl Aggregate for Median {
    fn kind(&self) -> AggregateKind {
        AggregateKind::Median
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

        match cumulative {
            Cumulative::Absent => Ok(Cumulative::Multiset(ValueList::singleton(
                value,
                ctx.config().list_capacity,
            ))),
            Cumulative::Multiset(mut list) => {
                list.push(value);
                Ok(Cumulative::Multiset(list))
            }
            other => Err(InternalError::aggregate_shape_mismatch(
                name,
                MULTISET,
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
            (Cumulative::Multiset(part), Cumulative::Multiset(list)) => {
                Ok(Cumulative::Multiset(list.union(part)))
            }
            (part, cumulative) => Err(merge_mismatch(name, MULTISET, &part, &cumulative)),
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
        ctx: &EvalContext,
    ) -> Result<Value, InternalError> {
        let name = self.name();
        let numbers = if self.base.is_distinct() {
            match distinct_members(name, cumulative)? {
                Some(set) => set.numbers(),
                None => return Ok(self.default_value()),
            }
        } else {
            match cumulative {
                Cumulative::Absent => return Ok(self.default_value()),
                Cumulative::Multiset(list) => list.numbers(),
                other => {
                    return Err(InternalError::aggregate_shape_mismatch(
                        name,
                        MULTISET,
                        other.shape(),
                    ));
                }
            }
        }
        .map_err(|found| InternalError::aggregate_field_mismatch(name, "members", found))?;

        Ok(select::median(numbers, ctx.config())
            .map_or(Value::Null, Value::Number))
    }
}
