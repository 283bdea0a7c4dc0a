//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Counters are thread-local; each worker reports its own window.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{AggregateCounters, AggregateSummary, EventOps, EventReport, EventState};
pub use sink::{
    MetricsEvent, MetricsSink, SkipReason, metrics_report, metrics_reset_all, with_metrics_sink,
};
