//! Module: expr
//! Responsibility: the operand/predicate evaluation boundary.
//! Does not own: parsing, name resolution or query planning.
//! Boundary: aggregates only see `Expression::evaluate` results.

mod logic;

#[cfg(test)]
mod tests;

use crate::{context::EvalContext, error::InternalError, value::Value};
use std::{fmt, sync::Arc};

pub use logic::{CompareOp, TypeTest};

///
/// Expression
///
/// Evaluation boundary for aggregate operands and FILTER predicates.
/// `Display` must render a stable canonical form; aggregate nodes use it
/// for identity.
///

pub trait Expression: fmt::Debug + fmt::Display + Send + Sync {
    fn evaluate(&self, row: &Value, ctx: &EvalContext) -> Result<Value, InternalError>;
}

impl<E: Expression + ?Sized> Expression for Arc<E> {
    fn evaluate(&self, row: &Value, ctx: &EvalContext) -> Result<Value, InternalError> {
        (**self).evaluate(row, ctx)
    }
}

///
/// Expr
///
/// Small closed expression tree covering field access, literals,
/// comparison, three-valued boolean logic and type tests.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Current,
    Field(Vec<String>),
    Compare {
        op: CompareOp,
        left: Box<Self>,
        right: Box<Self>,
    },
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    Not(Box<Self>),
    Is { test: TypeTest, expr: Box<Self> },
}

impl Expr {
    /// Field path from dotted notation, e.g. `"a.b"`.
    #[must_use]
    pub fn field(path: &str) -> Self {
        Self::Field(path.split('.').map(str::to_string).collect())
    }

    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn compare(self, op: CompareOp, right: Self) -> Self {
        Self::Compare {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn equals(self, right: Self) -> Self {
        self.compare(CompareOp::Eq, right)
    }

    #[must_use]
    pub fn gt(self, right: Self) -> Self {
        self.compare(CompareOp::Gt, right)
    }

    #[must_use]
    pub fn lt(self, right: Self) -> Self {
        self.compare(CompareOp::Lt, right)
    }

    #[must_use]
    pub fn and(self, right: Self) -> Self {
        Self::And(Box::new(self), Box::new(right))
    }

    #[must_use]
    pub fn or(self, right: Self) -> Self {
        Self::Or(Box::new(self), Box::new(right))
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    #[must_use]
    pub fn is(self, test: TypeTest) -> Self {
        Self::Is {
            test,
            expr: Box::new(self),
        }
    }
}

impl Expression for Expr {
    fn evaluate(&self, row: &Value, ctx: &EvalContext) -> Result<Value, InternalError> {
        let value = match self {
            Self::Literal(value) => value.clone(),
            Self::Current => row.clone(),
            Self::Field(path) => row.path(path.as_slice()).clone(),
            Self::Compare { op, left, right } => {
                let left = left.evaluate(row, ctx)?;
                let right = right.evaluate(row, ctx)?;
                logic::compare(*op, &left, &right)
            }
            Self::And(left, right) => {
                logic::and(&left.evaluate(row, ctx)?, &right.evaluate(row, ctx)?)
            }
            Self::Or(left, right) => {
                logic::or(&left.evaluate(row, ctx)?, &right.evaluate(row, ctx)?)
            }
            Self::Not(expr) => logic::not(&expr.evaluate(row, ctx)?),
            Self::Is { test, expr } => Value::Bool(test.matches(&expr.evaluate(row, ctx)?)),
        };

        Ok(value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Current => write!(f, "self"),
            Self::Field(path) => write!(f, "{}", path.join(".")),
            Self::Compare { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::And(left, right) => write!(f, "({left} AND {right})"),
            Self::Or(left, right) => write!(f, "({left} OR {right})"),
            Self::Not(expr) => write!(f, "(NOT {expr})"),
            Self::Is { test, expr } => write!(f, "({expr} {test})"),
        }
    }
}
