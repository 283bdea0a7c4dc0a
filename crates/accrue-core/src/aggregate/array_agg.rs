use crate::{
    aggregate::{
        admission::Admission,
        base::AggregateBase,
        cumulative::Cumulative,
        distinct::{cumulate_distinct, distinct_members, merge_distinct},
        kind::AggregateKind,
        list::ValueList,
        protocol::{Aggregate, merge_mismatch},
    },
    context::EvalContext,
    error::{InternalError, RemoveRestriction},
    row::Item,
    value::{Value, canonical_cmp},
};

const SEQUENCE: &str = "sequence";

///
/// ArrayAgg
///
/// Collects every admitted value (NULL included, BINARY excluded) and
/// returns them sorted by the canonical value order.
///

#[derive(Clone, Debug)]
pub struct ArrayAgg {
    base: AggregateBase,
}

impl ArrayAgg {
    #[must_use]
    pub const fn new(base: AggregateBase) -> Self {
        Self { base }
    }
}

impl Aggregate for ArrayAgg {
    fn kind(&self) -> AggregateKind {
        AggregateKind::ArrayAgg
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
            .admitted_operand(item, ctx, name, Admission::Collectable)?
        else {
            return Ok(cumulative);
        };
        let value = value.into_owned();

        if self.base.is_distinct() {
            return cumulate_distinct(name, value, cumulative, ctx);
        }

        match cumulative {
            Cumulative::Absent => Ok(Cumulative::Sequence(ValueList::singleton(
                value,
                ctx.config().list_capacity,
            ))),
            Cumulative::Sequence(mut list) => {
                list.push(value);
                Ok(Cumulative::Sequence(list))
            }
            other => Err(InternalError::aggregate_shape_mismatch(
                name,
                SEQUENCE,
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
            (Cumulative::Sequence(part), Cumulative::Sequence(list)) => {
                Ok(Cumulative::Sequence(list.union(part)))
            }
            (part, cumulative) => Err(merge_mismatch(name, SEQUENCE, &part, &cumulative)),
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
        let values = if self.base.is_distinct() {
            let Some(set) = distinct_members(name, cumulative)? else {
                return Ok(self.default_value());
            };
            let mut values = set.into_values();
            values.sort_by(canonical_cmp);
            values
        } else {
            match cumulative {
                Cumulative::Absent => return Ok(self.default_value()),
                Cumulative::Sequence(list) => list.into_sorted(),
                other => {
                    return Err(InternalError::aggregate_shape_mismatch(
                        name,
                        SEQUENCE,
                        other.shape(),
                    ));
                }
            }
        };

        if values.is_empty() {
            return Ok(self.default_value());
        }

        Ok(Value::Array(values))
    }
}
