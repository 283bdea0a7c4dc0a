use crate::{
    aggregate::{
        admission::Admission,
        base::AggregateBase,
        cumulative::Cumulative,
        kind::AggregateKind,
        list::ValueList,
        protocol::{Aggregate, merge_mismatch},
    },
    context::EvalContext,
    error::{InternalError, RemoveRestriction},
    expr::Expression,
    obs::{MetricsEvent, SkipReason},
    row::Item,
    value::{Number, Value},
};
use std::sync::Arc;

const OFFSET: &str = "offset list";

///
/// OffsetState
///
/// Frame values collected so far, capped at `offset` members.
///
/// `fallback` is the result when the frame runs out before `offset` rows.
/// Members before `settled` belong to closed peer groups; NTH_VALUE keeps the
/// open group after them in canonical order so ties resolve to the lowest
/// (FROM FIRST) or highest (FROM LAST) operand.
///

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetState {
    pub offset: usize,
    pub fallback: Value,
    pub values: ValueList,
    pub settled: usize,
}

impl OffsetState {
    #[must_use]
    pub fn new(offset: usize, fallback: Value) -> Self {
        Self {
            offset,
            fallback,
            values: ValueList::with_capacity(offset.min(64)),
            settled: 0,
        }
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.values.len() >= self.offset
    }
}

///
/// Offset
///
/// LAG(expr [, offset [, default]]), LEAD(expr [, offset [, default]]) and
/// NTH_VALUE(expr, n) [FROM FIRST | FROM LAST].
///
/// The executor seeds the state with `start_frame` on the current row, then
/// feeds frame rows outward in visiting order: preceding rows nearest first
/// for LAG, following rows for LEAD, and the frame from its start (or its end
/// for FROM LAST) for NTH_VALUE. The result is the `offset`-th value fed.
///

#[derive(Clone, Debug)]
pub struct Offset {
    base: AggregateBase,
    kind: AggregateKind,
}

impl Offset {
    /// `kind` must be LAG, LEAD or NTH_VALUE.
    #[must_use]
    pub const fn new(kind: AggregateKind, base: AggregateBase) -> Self {
        Self { base, kind }
    }

    fn operand(&self, index: usize) -> Option<&Arc<dyn Expression>> {
        self.base.operands().get(index)
    }

    // Positive integer offset, evaluated against the current row.
    fn offset(&self, current: &Item, ctx: &EvalContext) -> Result<usize, InternalError> {
        let Some(operand) = self.operand(1) else {
            return Ok(1);
        };

        let value = operand.evaluate(current.value(), ctx)?;
        value
            .as_number()
            .and_then(Number::to_i64_exact)
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| {
                InternalError::invalid_argument(
                    self.name(),
                    format!("second argument must evaluate to a positive integer, found {value}"),
                )
            })
    }

    fn fallback(&self, current: &Item, ctx: &EvalContext) -> Result<Value, InternalError> {
        match self.operand(2) {
            Some(operand) => operand.evaluate(current.value(), ctx),
            None => Ok(Value::Null),
        }
    }

    fn seed(&self, current: &Item, ctx: &EvalContext) -> Result<OffsetState, InternalError> {
        let fallback = self.fallback(current, ctx)?;
        let offset = self.offset(current, ctx)?;

        Ok(OffsetState::new(offset, fallback))
    }

    // NTH_VALUE orders ties inside the open peer group.
    fn orders_peers(&self) -> bool {
        self.kind == AggregateKind::NthValue
    }
}

impl Aggregate for Offset {
    fn kind(&self) -> AggregateKind {
        self.kind
    }

    fn base(&self) -> &AggregateBase {
        &self.base
    }

    fn start_frame(&self, current: &Item, ctx: &EvalContext) -> Result<Cumulative, InternalError> {
        self.seed(current, ctx).map(Cumulative::Offset)
    }

    /// `Absent` seeds the state from the first row fed, for callers that
    /// skip `start_frame`.
    fn cumulate_initial(
        &self,
        item: &Item,
        cumulative: Cumulative,
        ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        let name = self.name();
        let mut state = match cumulative {
            Cumulative::Absent => self.seed(item, ctx)?,
            Cumulative::Offset(state) => state,
            other => {
                return Err(InternalError::aggregate_shape_mismatch(
                    name,
                    OFFSET,
                    other.shape(),
                ));
            }
        };

        let closed = if self.orders_peers() {
            state.settled
        } else {
            state.values.len()
        };
        if closed >= state.offset {
            return Ok(Cumulative::Offset(state));
        }

        let Some(operand) = self.operand(0) else {
            return Err(InternalError::operand_arity(name, 1, 3, 0));
        };
        let value = operand.evaluate(item.value(), ctx)?;
        if self.base.ignores_nulls() && !Admission::Valued.admits(&value) {
            ctx.record(MetricsEvent::RowSkipped {
                aggregate: name,
                reason: SkipReason::NotAdmitted,
            });
            return Ok(Cumulative::Offset(state));
        }

        if self.orders_peers() {
            let descending = self.base.is_from_last();
            state
                .values
                .insert_in_tail(state.settled, value, descending, state.offset);
        } else {
            state.values.push(value);
        }

        Ok(Cumulative::Offset(state))
    }

    fn is_cumulate_done(
        &self,
        cumulative: &mut Cumulative,
        _ctx: &EvalContext,
    ) -> Result<bool, InternalError> {
        match cumulative {
            Cumulative::Absent => Ok(false),
            Cumulative::Offset(state) => {
                state.settled = state.values.len();
                Ok(state.is_full())
            }
            other => Err(InternalError::aggregate_shape_mismatch(
                self.name(),
                OFFSET,
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
        match (part, cumulative) {
            (Cumulative::Absent, other) | (other, Cumulative::Absent) => Ok(other),
            (Cumulative::Offset(_), Cumulative::Offset(state)) => Ok(Cumulative::Offset(state)),
            (part, cumulative) => Err(merge_mismatch(self.name(), OFFSET, &part, &cumulative)),
        }
    }

    // Frames are re-collected per row; there is no sliding state to undo.
    fn cumulate_remove(
        &self,
        _item: &Item,
        _cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        Err(InternalError::remove_unsupported(
            self.name(),
            RemoveRestriction::NotInvertible,
        ))
    }

    fn compute_final(
        &self,
        cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Value, InternalError> {
        match cumulative {
            Cumulative::Absent => Ok(self.default_value()),
            Cumulative::Offset(state) => {
                let OffsetState {
                    offset,
                    fallback,
                    values,
                    ..
                } = state;
                let mut values = values.into_values();
                if values.len() == offset {
                    Ok(values.pop().unwrap_or(fallback))
                } else {
                    Ok(fallback)
                }
            }
            other => Err(InternalError::aggregate_shape_mismatch(
                self.name(),
                OFFSET,
                other.shape(),
            )),
        }
    }
}

///
/// TESTS
///
