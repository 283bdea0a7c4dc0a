use crate::config::ConfigError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Every protocol call surfaces failures through this type; nothing is
/// retried or recovered inside the engine.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    fn from_aggregate(class: ErrorClass, origin: ErrorOrigin, err: AggregateError) -> Self {
        Self {
            class,
            origin,
            message: err.to_string(),
            detail: Some(ErrorDetail::Aggregate(err)),
        }
    }

    /// Construct an expression evaluation failure.
    /// Operand/filter implementations outside this crate use this to report
    /// their own failures.
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Evaluation, ErrorOrigin::Expression, message)
    }

    /// An accumulator or partial does not carry the shape the aggregate expects.
    pub(crate) fn aggregate_shape_mismatch(
        aggregate: &'static str,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::from_aggregate(
            ErrorClass::TypeMismatch,
            ErrorOrigin::Aggregate,
            AggregateError::ShapeMismatch {
                aggregate,
                expected,
                found,
            },
        )
    }

    /// A DISTINCT accumulator or partial is not a distinct set.
    pub(crate) fn distinct_shape_mismatch(aggregate: &'static str, found: &'static str) -> Self {
        Self::from_aggregate(
            ErrorClass::TypeMismatch,
            ErrorOrigin::Distinct,
            AggregateError::ShapeMismatch {
                aggregate,
                expected: "distinct set",
                found,
            },
        )
    }

    /// A field inside an accumulator record holds a value of the wrong type.
    pub(crate) fn aggregate_field_mismatch(
        aggregate: &'static str,
        field: &'static str,
        found: &'static str,
    ) -> Self {
        Self::from_aggregate(
            ErrorClass::TypeMismatch,
            ErrorOrigin::Aggregate,
            AggregateError::FieldMismatch {
                aggregate,
                field,
                found,
            },
        )
    }

    /// CumulateRemove was called where removal is not defined.
    pub(crate) fn remove_unsupported(
        aggregate: &'static str,
        restriction: RemoveRestriction,
    ) -> Self {
        Self::from_aggregate(
            ErrorClass::Unsupported,
            ErrorOrigin::Aggregate,
            AggregateError::RemoveUnsupported {
                aggregate,
                restriction,
            },
        )
    }

    /// An aggregate node uses a clause its kind does not allow.
    pub(crate) fn capability_violation(aggregate: &'static str, clause: Clause) -> Self {
        Self::from_aggregate(
            ErrorClass::Unsupported,
            ErrorOrigin::Aggregate,
            AggregateError::ClauseNotAllowed { aggregate, clause },
        )
    }

    /// An aggregate node has the wrong number of operands.
    pub(crate) fn operand_arity(
        aggregate: &'static str,
        min: usize,
        max: usize,
        found: usize,
    ) -> Self {
        Self::from_aggregate(
            ErrorClass::Unsupported,
            ErrorOrigin::Aggregate,
            AggregateError::OperandArity {
                aggregate,
                min,
                max,
                found,
            },
        )
    }

    /// The per-row window attachment is absent or not a `{part, nrows}` record.
    pub(crate) fn malformed_attachment(aggregate: &'static str, reason: impl Into<String>) -> Self {
        Self::from_aggregate(
            ErrorClass::MalformedAttachment,
            ErrorOrigin::Window,
            AggregateError::MalformedAttachment {
                aggregate,
                reason: reason.into(),
            },
        )
    }

    /// A removal would take a running count below zero.
    pub(crate) fn count_underflow(aggregate: &'static str) -> Self {
        Self::from_aggregate(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Aggregate,
            AggregateError::CountUnderflow { aggregate },
        )
    }

    /// An operand evaluated to a value the aggregate cannot accept.
    pub(crate) fn invalid_argument(aggregate: &'static str, reason: impl Into<String>) -> Self {
        Self::from_aggregate(
            ErrorClass::Evaluation,
            ErrorOrigin::Expression,
            AggregateError::InvalidArgument {
                aggregate,
                reason: reason.into(),
            },
        )
    }

    /// Numeric accumulation left the representable range.
    pub(crate) fn numeric_overflow(aggregate: &'static str) -> Self {
        Self::from_aggregate(
            ErrorClass::Evaluation,
            ErrorOrigin::Value,
            AggregateError::NumericOverflow { aggregate },
        )
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }

    /// Return the structured aggregate detail when present.
    #[must_use]
    pub const fn aggregate_detail(&self) -> Option<&AggregateError> {
        match &self.detail {
            Some(ErrorDetail::Aggregate(err)) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self {
            class: ErrorClass::Config,
            origin: ErrorOrigin::Config,
            message: err.to_string(),
            detail: Some(ErrorDetail::Config(err)),
        }
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Aggregate(AggregateError),
    #[error("{0}")]
    Config(ConfigError),
}

///
/// AggregateError
///
/// Protocol-level failure detail.
/// Never returned directly; always wrapped in [`ErrorDetail::Aggregate`].
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum AggregateError {
    #[error("{aggregate}: invalid cumulative value, expected {expected}, found {found}")]
    ShapeMismatch {
        aggregate: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{aggregate}: internal field '{field}' missing or invalid, found {found}")]
    FieldMismatch {
        aggregate: &'static str,
        field: &'static str,
        found: &'static str,
    },

    #[error("{aggregate}: cumulate remove is not supported ({restriction})")]
    RemoveUnsupported {
        aggregate: &'static str,
        restriction: RemoveRestriction,
    },

    #[error("{aggregate}: {clause} is not allowed")]
    ClauseNotAllowed {
        aggregate: &'static str,
        clause: Clause,
    },

    #[error("{aggregate}: expected between {min} and {max} operands, found {found}")]
    OperandArity {
        aggregate: &'static str,
        min: usize,
        max: usize,
        found: usize,
    },

    #[error("{aggregate}: malformed window attachment: {reason}")]
    MalformedAttachment {
        aggregate: &'static str,
        reason: String,
    },

    #[error("{aggregate}: cumulate remove would take the running count below zero")]
    CountUnderflow { aggregate: &'static str },

    #[error("{aggregate}: invalid argument: {reason}")]
    InvalidArgument {
        aggregate: &'static str,
        reason: String,
    },

    #[error("{aggregate}: numeric result out of range")]
    NumericOverflow { aggregate: &'static str },
}

///
/// RemoveRestriction
/// Why a CumulateRemove call was rejected.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RemoveRestriction {
    Distinct,
    NotInvertible,
}

impl fmt::Display for RemoveRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Distinct => "DISTINCT accumulator",
            Self::NotInvertible => "aggregate is not invertible",
        };
        write!(f, "{label}")
    }
}

///
/// Clause
/// Aggregate syntax elements gated by the capability table.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Clause {
    Distinct,
    Filter,
    Window,
    MissingWindow,
    WindowFrame,
    WindowFrameWithoutOrder,
    MissingWindowOrder,
    NullTreatment,
    FromLast,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Distinct => "DISTINCT",
            Self::Filter => "FILTER clause",
            Self::Window => "OVER clause",
            Self::MissingWindow => "use without OVER clause",
            Self::WindowFrame => "window frame",
            Self::WindowFrameWithoutOrder => "window frame without ORDER BY",
            Self::MissingWindowOrder => "window without ORDER BY",
            Self::NullTreatment => "RESPECT/IGNORE NULLS",
            Self::FromLast => "FROM FIRST/LAST",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    TypeMismatch,
    Unsupported,
    Evaluation,
    MalformedAttachment,
    InvariantViolation,
    Config,
}

impl ErrorClass {
    /// Stable label used by diagnostics and metrics keys.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TypeMismatch => "type_mismatch",
            Self::Unsupported => "unsupported",
            Self::Evaluation => "evaluation",
            Self::MalformedAttachment => "malformed_attachment",
            Self::InvariantViolation => "invariant_violation",
            Self::Config => "config",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Aggregate,
    Distinct,
    Window,
    Expression,
    Value,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Aggregate => "aggregate",
            Self::Distinct => "distinct",
            Self::Window => "window",
            Self::Expression => "expression",
            Self::Value => "value",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
