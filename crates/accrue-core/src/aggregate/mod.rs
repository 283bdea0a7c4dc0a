//! Module: aggregate
//! Responsibility: the incremental aggregation protocol and every concrete
//! aggregate function.
//! Does not own: grouping, partitioning or frame bookkeeping (the caller
//! drives the protocol per group, partition or frame).
//! Boundary: callers build an `AggregateFunction` and thread `Cumulative`
//! values through it.

mod admission;
mod array_agg;
mod avg;
mod base;
pub(crate) mod compound;
mod count;
mod cumulative;
mod distinct;
mod function;
mod kind;
mod list;
mod median;
mod protocol;
pub(crate) mod select;
mod sum;
mod variance;
mod window;
mod window_term;

#[cfg(test)]
mod tests;

// re-exports
pub use admission::Admission;
pub use array_agg::ArrayAgg;
pub use avg::Avg;
pub use base::{AggregateBase, NthFrom, NullTreatment};
pub use count::Count;
pub use cumulative::Cumulative;
pub use distinct::DistinctSet;
pub use function::AggregateFunction;
pub use kind::{AggregateKind, Capabilities};
pub use list::ValueList;
pub use median::Median;
pub use protocol::Aggregate;
pub use sum::Sum;
pub use variance::Dispersion;
pub use window::{Ntile, NtileState, Offset, OffsetState, Ranking, WindowRecord};
pub use window_term::{FrameBound, FrameExclude, FrameUnit, OrderTerm, WindowFrame, WindowTerm};
