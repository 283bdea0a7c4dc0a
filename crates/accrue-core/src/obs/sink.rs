//! Metrics sink boundary.
//!
//! Aggregate logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between protocol calls
//! and the thread-local metrics state.
use crate::{error::ErrorClass, obs::metrics};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = const { RefCell::new(None) };
}

///
/// SkipReason
/// Why a row contributed nothing to an accumulator.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SkipReason {
    FilterRejected,
    FilterError,
    NotAdmitted,
    NullAttachment,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    Cumulate {
        aggregate: &'static str,
    },
    Merge {
        aggregate: &'static str,
    },
    Remove {
        aggregate: &'static str,
    },
    Finalize {
        aggregate: &'static str,
    },
    RowSkipped {
        aggregate: &'static str,
        reason: SkipReason,
    },
    DistinctDuplicate {
        aggregate: &'static str,
    },
    Failure {
        aggregate: &'static str,
        class: ErrorClass,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::Cumulate { aggregate } => {
                metrics::with_state_mut(|m| {
                    m.ops.cumulate_calls = m.ops.cumulate_calls.saturating_add(1);
                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    entry.cumulate_calls = entry.cumulate_calls.saturating_add(1);
                });
            }

            MetricsEvent::Merge { aggregate } => {
                metrics::with_state_mut(|m| {
                    m.ops.merge_calls = m.ops.merge_calls.saturating_add(1);
                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    entry.merge_calls = entry.merge_calls.saturating_add(1);
                });
            }

            MetricsEvent::Remove { aggregate } => {
                metrics::with_state_mut(|m| {
                    m.ops.remove_calls = m.ops.remove_calls.saturating_add(1);
                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    entry.remove_calls = entry.remove_calls.saturating_add(1);
                });
            }

            MetricsEvent::Finalize { aggregate } => {
                metrics::with_state_mut(|m| {
                    m.ops.finalize_calls = m.ops.finalize_calls.saturating_add(1);
                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    entry.finalize_calls = entry.finalize_calls.saturating_add(1);
                });
            }

            MetricsEvent::RowSkipped { aggregate, reason } => {
                metrics::with_state_mut(|m| {
                    let counter = match reason {
                        SkipReason::FilterRejected => &mut m.ops.filter_rejected,
                        SkipReason::FilterError => &mut m.ops.filter_errors,
                        SkipReason::NotAdmitted => &mut m.ops.rows_not_admitted,
                        SkipReason::NullAttachment => &mut m.ops.null_attachments,
                    };
                    *counter = counter.saturating_add(1);

                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    entry.rows_skipped = entry.rows_skipped.saturating_add(1);
                });
            }

            MetricsEvent::DistinctDuplicate { aggregate } => {
                metrics::with_state_mut(|m| {
                    m.ops.distinct_duplicates = m.ops.distinct_duplicates.saturating_add(1);
                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    entry.distinct_duplicates = entry.distinct_duplicates.saturating_add(1);
                });
            }

            MetricsEvent::Failure { aggregate, class } => {
                metrics::with_state_mut(|m| {
                    m.ops.failures = m.ops.failures.saturating_add(1);
                    let by_class = m
                        .ops
                        .failure_classes
                        .entry(class.label().to_string())
                        .or_default();
                    *by_class = by_class.saturating_add(1);

                    let entry = m.aggregates.entry(aggregate.to_string()).or_default();
                    entry.failures = entry.failures.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // Preconditions:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in `with_metrics_sink`.
        // - `with_metrics_sink` always restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        //
        // Aliasing:
        // - Only a shared reference is materialized, matching the shared borrow
        //   used to install the override.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current metrics state.
///
/// `since_ms` filters by window start (`EventState::since_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(since_ms: Option<u64>) -> metrics::EventReport {
    metrics::report_since(since_ms)
}

/// Reset all metrics state for the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // Preconditions:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` always restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    //
    // What would break this:
    // - Any deferred use of `sink_ptr` beyond this scope.
    // - Any path that bypasses Guard restoration.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::{
        error::ErrorClass,
        obs::sink::{
            MetricsEvent, MetricsSink, SINK_OVERRIDE, SkipReason, metrics_report,
            metrics_reset_all, record, with_metrics_sink,
        },
    };
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink<'a> {
        calls: &'a AtomicUsize,
    }

    impl MetricsSink for CountingSink<'_> {
        fn record(&self, _: MetricsEvent) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    const EVENT: MetricsEvent = MetricsEvent::Cumulate { aggregate: "count" };

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let outer_calls = AtomicUsize::new(0);
        let inner_calls = AtomicUsize::new(0);
        let outer = CountingSink {
            calls: &outer_calls,
        };
        let inner = CountingSink {
            calls: &inner_calls,
        };

        record(EVENT);
        assert_eq!(outer_calls.load(Ordering::SeqCst), 0);

        with_metrics_sink(&outer, || {
            record(EVENT);
            with_metrics_sink(&inner, || record(EVENT));
            record(EVENT);
        });

        assert_eq!(outer_calls.load(Ordering::SeqCst), 2);
        assert_eq!(inner_calls.load(Ordering::SeqCst), 1);
        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let calls = AtomicUsize::new(0);
        let sink = CountingSink { calls: &calls };

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(&sink, || {
                record(EVENT);
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();
        assert!(panicked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });
    }

    #[test]
    fn global_sink_accumulates_per_aggregate() {
        metrics_reset_all();

        record(MetricsEvent::Cumulate { aggregate: "avg" });
        record(MetricsEvent::Cumulate { aggregate: "avg" });
        record(MetricsEvent::RowSkipped {
            aggregate: "avg",
            reason: SkipReason::FilterError,
        });
        record(MetricsEvent::Failure {
            aggregate: "median",
            class: ErrorClass::TypeMismatch,
        });

        let counters = metrics_report(None)
            .counters
            .expect("metrics report should include counters");
        assert_eq!(counters.ops.cumulate_calls, 2);
        assert_eq!(counters.ops.filter_errors, 1);
        assert_eq!(counters.ops.rows_skipped(), 1);
        assert_eq!(counters.ops.failure_classes.get("type_mismatch"), Some(&1));

        let avg = counters
            .aggregates
            .get("avg")
            .expect("avg counters should be present");
        assert_eq!(avg.cumulate_calls, 2);
        assert_eq!(avg.rows_skipped, 1);
        assert_eq!(counters.aggregates.get("median").map(|m| m.failures), Some(1));
    }
}
