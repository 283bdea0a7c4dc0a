//! Core runtime for accrue: the dynamic value model, the aggregate protocol,
//! the concrete aggregate functions, and the observability surface.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod aggregate;
pub mod config;
pub mod context;
pub mod error;
pub mod expr;
pub mod obs;
pub mod row;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary needed to build and drive
/// aggregates. Errors and metrics stay behind their own modules.
///

pub mod prelude {
    pub use crate::{
        aggregate::{
            Aggregate, AggregateBase, AggregateFunction, AggregateKind, Cumulative, WindowTerm,
        },
        context::EvalContext,
        expr::{Expr, Expression},
        row::Item,
        value::{Number, Value},
    };
}
