//! Module: aggregate::base
//! Responsibility: the fields every aggregate node carries and the shared
//! FILTER -> operand -> admission pipeline.
//! Does not own: accumulation (each aggregate merges its own shape).
//! Boundary: capability checks happen once, in `validate`.

use crate::{
    aggregate::{admission::Admission, kind::AggregateKind, window_term::WindowTerm},
    context::EvalContext,
    error::{Clause, InternalError},
    expr::Expression,
    obs::{MetricsEvent, SkipReason},
    row::Item,
    value::Value,
};
use std::{borrow::Cow, fmt, sync::Arc};

///
/// AggregateBase
///
/// Operands, DISTINCT flag, optional FILTER predicate, the offset-function
/// modifiers and optional window of one aggregate node. Immutable once
/// built; nodes are cloned, never mutated.
///
/// Equality compares the canonical rendering, so two nodes built from the
/// same text are equal regardless of how their expressions are shared.
///

#[derive(Clone, Debug, Default)]
pub struct AggregateBase {
    operands: Vec<Arc<dyn Expression>>,
    distinct: bool,
    filter: Option<Arc<dyn Expression>>,
    nulls: Option<NullTreatment>,
    from: Option<NthFrom>,
    window: Option<WindowTerm>,
}

impl AggregateBase {
    /// Base with no operands: `COUNT(*)` and the ranking functions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Base with a single operand.
    #[must_use]
    pub fn unary(operand: impl Expression + 'static) -> Self {
        Self::new().operand(operand)
    }

    #[must_use]
    pub fn operand(mut self, operand: impl Expression + 'static) -> Self {
        self.operands.push(Arc::new(operand));
        self
    }

    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub fn filter(mut self, predicate: impl Expression + 'static) -> Self {
        self.filter = Some(Arc::new(predicate));
        self
    }

    #[must_use]
    pub const fn nulls(mut self, treatment: NullTreatment) -> Self {
        self.nulls = Some(treatment);
        self
    }

    #[must_use]
    pub const fn ignore_nulls(self) -> Self {
        self.nulls(NullTreatment::Ignore)
    }

    #[must_use]
    pub const fn from_end(mut self, from: NthFrom) -> Self {
        self.from = Some(from);
        self
    }

    #[must_use]
    pub fn over(mut self, window: WindowTerm) -> Self {
        self.window = Some(window);
        self
    }

    ///
    /// ACCESSORS
    ///

    #[must_use]
    pub fn operands(&self) -> &[Arc<dyn Expression>] {
        &self.operands
    }

    #[must_use]
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    #[must_use]
    pub fn filter_expr(&self) -> Option<&Arc<dyn Expression>> {
        self.filter.as_ref()
    }

    #[must_use]
    pub const fn window(&self) -> Option<&WindowTerm> {
        self.window.as_ref()
    }

    /// True for `IGNORE NULLS`; unspecified means `RESPECT NULLS`.
    #[must_use]
    pub const fn ignores_nulls(&self) -> bool {
        matches!(self.nulls, Some(NullTreatment::Ignore))
    }

    /// True for `FROM LAST`; unspecified means `FROM FIRST`.
    #[must_use]
    pub const fn is_from_last(&self) -> bool {
        matches!(self.from, Some(NthFrom::Last))
    }

    ///
    /// VALIDATION
    ///

    /// Reject a node whose clauses or operand count contradict its kind.
    pub fn validate(&self, kind: AggregateKind) -> Result<(), InternalError> {
        let caps = kind.capabilities();
        let name = kind.name();
        let reject = |clause| Err(InternalError::capability_violation(name, clause));

        let found = self.operands.len();
        if found < caps.min_args || found > caps.max_args {
            return Err(InternalError::operand_arity(
                name,
                caps.min_args,
                caps.max_args,
                found,
            ));
        }
        if self.distinct && !caps.allows_distinct {
            return reject(Clause::Distinct);
        }
        if self.filter.is_some() && !caps.allows_filter {
            return reject(Clause::Filter);
        }
        if self.nulls.is_some() && !caps.allows_null_treatment {
            return reject(Clause::NullTreatment);
        }
        if self.from.is_some() && !caps.allows_from_last {
            return reject(Clause::FromLast);
        }

        let Some(window) = &self.window else {
            if caps.allows_regular {
                return Ok(());
            }
            return reject(Clause::MissingWindow);
        };

        if !caps.allows_window {
            return reject(Clause::Window);
        }
        if window.window_frame().is_some() {
            if !caps.allows_window_frame {
                return reject(Clause::WindowFrame);
            }
            if !window.has_order() {
                return reject(Clause::WindowFrameWithoutOrder);
            }
        }
        if caps.requires_window_order && !window.has_order() {
            return reject(Clause::MissingWindowOrder);
        }

        Ok(())
    }

    ///
    /// EVALUATION
    ///

    /// Run the FILTER, evaluate the first operand and apply `admission`.
    ///
    /// Returns `None` when the row contributes nothing: the FILTER is not
    /// TRUE, the FILTER failed to evaluate, or the operand is not admitted.
    /// Operand evaluation errors propagate unchanged. With no operands the
    /// row document itself is the operand.
    pub(crate) fn admitted_operand<'a>(
        &self,
        item: &'a Item,
        ctx: &EvalContext,
        aggregate: &'static str,
        admission: Admission,
    ) -> Result<Option<Cow<'a, Value>>, InternalError> {
        if let Some(reason) = self.filter_rejects(item, ctx) {
            ctx.record(MetricsEvent::RowSkipped { aggregate, reason });
            return Ok(None);
        }

        let value = match self.operands.first() {
            Some(operand) => Cow::Owned(operand.evaluate(item.value(), ctx)?),
            None => Cow::Borrowed(item.value()),
        };

        if !admission.admits(&value) {
            ctx.record(MetricsEvent::RowSkipped {
                aggregate,
                reason: SkipReason::NotAdmitted,
            });
            return Ok(None);
        }

        Ok(Some(value))
    }

    // A FILTER error skips the row like FALSE does.
    fn filter_rejects(&self, item: &Item, ctx: &EvalContext) -> Option<SkipReason> {
        let filter = self.filter.as_ref()?;

        match filter.evaluate(item.value(), ctx) {
            Ok(Value::Bool(true)) => None,
            Ok(_) => Some(SkipReason::FilterRejected),
            Err(_) => Some(SkipReason::FilterError),
        }
    }

    ///
    /// RENDERING
    ///

    /// Write the canonical text of a node of `kind` with this base.
    pub(crate) fn render(&self, kind: AggregateKind, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", kind.name())?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }

        if self.operands.is_empty() {
            if kind == AggregateKind::Count {
                write!(f, "*")?;
            }
        } else {
            let operands: Vec<String> = self.operands.iter().map(ToString::to_string).collect();
            write!(f, "{}", operands.join(", "))?;
        }
        write!(f, ")")?;

        if let Some(from) = self.from {
            write!(f, " {from}")?;
        }
        if let Some(nulls) = self.nulls {
            write!(f, " {nulls}")?;
        }
        if let Some(filter) = &self.filter {
            write!(f, " FILTER (WHERE {filter})")?;
        }
        if let Some(window) = &self.window {
            write!(f, " {window}")?;
        }

        Ok(())
    }
}

///
/// NullTreatment
///
/// `RESPECT NULLS` / `IGNORE NULLS` on LAG, LEAD and NTH_VALUE.
/// Ignored rows (NULL or MISSING operand) do not count toward the offset.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NullTreatment {
    Respect,
    Ignore,
}

impl fmt::Display for NullTreatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Respect => "RESPECT NULLS",
            Self::Ignore => "IGNORE NULLS",
        })
    }
}

///
/// NthFrom
///
/// NTH_VALUE counting direction within the frame.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NthFrom {
    First,
    Last,
}

impl fmt::Display for NthFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "FROM FIRST",
            Self::Last => "FROM LAST",
        })
    }
}

///
/// TESTS
///
