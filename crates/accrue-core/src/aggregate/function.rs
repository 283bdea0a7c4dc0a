//! Module: aggregate::function
//! Responsibility: the closed dispatch enum callers hold for any aggregate.
//! Does not own: per-function semantics (each variant wraps its own type).
//! Boundary: construction validates the node; every protocol call emits
//! one metrics event, plus a failure event when it errors.

use crate::{
    aggregate::{
        array_agg::ArrayAgg,
        avg::Avg,
        base::AggregateBase,
        count::Count,
        cumulative::Cumulative,
        kind::AggregateKind,
        median::Median,
        protocol::Aggregate,
        sum::Sum,
        variance::Dispersion,
        window::{Ntile, Offset, Ranking},
    },
    context::EvalContext,
    error::InternalError,
    obs::MetricsEvent,
    row::Item,
    value::Value,
};
use std::fmt;

///
/// AggregateFunction
///
/// A validated aggregate node. Built with [`AggregateFunction::new`], which
/// rejects clause and operand combinations the kind does not support, so
/// every value of this type is executable.
///
/// Two nodes are equal when their canonical renderings are equal.
///

#[derive(Clone, Debug)]
pub enum AggregateFunction {
    Count(Count),
    Sum(Sum),
    Avg(Avg),
    ArrayAgg(ArrayAgg),
    Median(Median),
    Dispersion(Dispersion),
    Ranking(Ranking),
    Ntile(Ntile),
    Offset(Offset),
}

impl AggregateFunction {
    /// Validate `base` against `kind` and build the node.
    pub fn new(kind: AggregateKind, base: AggregateBase) -> Result<Self, InternalError> {
        base.validate(kind)?;

        let function = match kind {
            AggregateKind::Count => Self::Count(Count::count(base)),
            AggregateKind::CountN => Self::Count(Count::countn(base)),
            AggregateKind::Sum => Self::Sum(Sum::new(base)),
            AggregateKind::Avg => Self::Avg(Avg::new(base)),
            AggregateKind::ArrayAgg => Self::ArrayAgg(ArrayAgg::new(base)),
            AggregateKind::Median => Self::Median(Median::new(base)),
            AggregateKind::Variance
            | AggregateKind::VarSamp
            | AggregateKind::VarPop
            | AggregateKind::Stddev
            | AggregateKind::StddevSamp
            | AggregateKind::StddevPop => Self::Dispersion(Dispersion::new(kind, base)),
            AggregateKind::RowNumber
            | AggregateKind::Rank
            | AggregateKind::DenseRank
            | AggregateKind::PercentRank
            | AggregateKind::CumeDist => Self::Ranking(Ranking::new(kind, base)),
            AggregateKind::Ntile => Self::Ntile(Ntile::new(base)),
            AggregateKind::Lag | AggregateKind::Lead | AggregateKind::NthValue => {
                Self::Offset(Offset::new(kind, base))
            }
        };

        Ok(function)
    }

    /// Resolve a function name (case-insensitive) and build the node.
    pub fn from_name(name: &str, base: AggregateBase) -> Result<Self, InternalError> {
        let kind = AggregateKind::from_name(name).ok_or_else(|| {
            InternalError::evaluation(format!("unknown aggregate function '{name}'"))
        })?;

        Self::new(kind, base)
    }

    fn inner(&self) -> &dyn Aggregate {
        match self {
            Self::Count(inner) => inner,
            Self::Sum(inner) => inner,
            Self::Avg(inner) => inner,
            Self::ArrayAgg(inner) => inner,
            Self::Median(inner) => inner,
            Self::Dispersion(inner) => inner,
            Self::Ranking(inner) => inner,
            Self::Ntile(inner) => inner,
            Self::Offset(inner) => inner,
        }
    }

    // Emit the call event, then a failure event if the call errored.
    fn observe<T>(
        &self,
        ctx: &EvalContext,
        event: MetricsEvent,
        result: Result<T, InternalError>,
    ) -> Result<T, InternalError> {
        ctx.record(event);
        self.observe_failure(ctx, result)
    }

    fn observe_failure<T>(
        &self,
        ctx: &EvalContext,
        result: Result<T, InternalError>,
    ) -> Result<T, InternalError> {
        if let Err(err) = &result {
            ctx.record(MetricsEvent::Failure {
                aggregate: self.name(),
                class: err.class,
            });
        }

        result
    }
}

impl Aggregate for AggregateFunction {
    fn kind(&self) -> AggregateKind {
        self.inner().kind()
    }

    fn base(&self) -> &AggregateBase {
        self.inner().base()
    }

    fn default_value(&self) -> Value {
        self.inner().default_value()
    }

    fn cumulate_initial(
        &self,
        item: &Item,
        cumulative: Cumulative,
        ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        let result = self.inner().cumulate_initial(item, cumulative, ctx);
        self.observe(
            ctx,
            MetricsEvent::Cumulate {
                aggregate: self.name(),
            },
            result,
        )
    }

    fn cumulate_intermediate(
        &self,
        part: Cumulative,
        cumulative: Cumulative,
        ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        let result = self.inner().cumulate_intermediate(part, cumulative, ctx);
        self.observe(
            ctx,
            MetricsEvent::Merge {
                aggregate: self.name(),
            },
            result,
        )
    }

    fn cumulate_remove(
        &self,
        item: &Item,
        cumulative: Cumulative,
        ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        let result = self.inner().cumulate_remove(item, cumulative, ctx);
        self.observe(
            ctx,
            MetricsEvent::Remove {
                aggregate: self.name(),
            },
            result,
        )
    }

    fn start_frame(&self, current: &Item, ctx: &EvalContext) -> Result<Cumulative, InternalError> {
        let result = self.inner().start_frame(current, ctx);
        self.observe_failure(ctx, result)
    }

    fn is_cumulate_done(
        &self,
        cumulative: &mut Cumulative,
        ctx: &EvalContext,
    ) -> Result<bool, InternalError> {
        let result = self.inner().is_cumulate_done(cumulative, ctx);
        self.observe_failure(ctx, result)
    }

    fn compute_final(
        &self,
        cumulative: Cumulative,
        ctx: &EvalContext,
    ) -> Result<Value, InternalError> {
        let result = self.inner().compute_final(cumulative, ctx);
        self.observe(
            ctx,
            MetricsEvent::Finalize {
                aggregate: self.name(),
            },
            result,
        )
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.base().render(self.kind(), f)
    }
}

impl PartialEq for AggregateFunction {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.to_string() == other.to_string()
    }
}

impl Eq for AggregateFunction {}
