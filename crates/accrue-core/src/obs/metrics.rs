use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    cmp::Ordering,
    collections::BTreeMap,
    time::{SystemTime, UNIX_EPOCH},
};

///
/// EventState
/// Ephemeral, in-memory counters for aggregate protocol calls.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub aggregates: BTreeMap<String, AggregateCounters>,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            aggregates: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Protocol entrypoints
    pub cumulate_calls: u64,
    pub merge_calls: u64,
    pub remove_calls: u64,
    pub finalize_calls: u64,

    // Rows that contributed nothing
    pub filter_rejected: u64,
    pub filter_errors: u64,
    pub rows_not_admitted: u64,
    pub null_attachments: u64,

    // DISTINCT
    pub distinct_duplicates: u64,

    // Failures, keyed by error class label
    pub failures: u64,
    pub failure_classes: BTreeMap<String, u64>,
}

impl EventOps {
    #[must_use]
    pub const fn rows_skipped(&self) -> u64 {
        self.filter_rejected
            .saturating_add(self.filter_errors)
            .saturating_add(self.rows_not_admitted)
            .saturating_add(self.null_attachments)
    }
}

///
/// AggregateCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AggregateCounters {
    pub cumulate_calls: u64,
    pub merge_calls: u64,
    pub remove_calls: u64,
    pub finalize_calls: u64,
    pub rows_skipped: u64,
    pub distinct_duplicates: u64,
    pub failures: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters and restart the window.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

///
/// EventReport
/// Counter report for the current window.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `since_ms`.
    pub counters: Option<EventState>,
    /// Per-aggregate counters and ratios.
    pub aggregate_counters: Vec<AggregateSummary>,
}

///
/// AggregateSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AggregateSummary {
    pub name: String,
    pub cumulate_calls: u64,
    pub merge_calls: u64,
    pub remove_calls: u64,
    pub finalize_calls: u64,
    pub rows_skipped: u64,
    pub distinct_duplicates: u64,
    pub failures: u64,
    pub skip_ratio: f64,
}

/// Build a report, or an empty one when the window started before `since_ms`.
#[must_use]
pub(crate) fn report_since(since_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if since_ms.is_some_and(|since| since > snap.since_ms) {
        return EventReport::default();
    }

    report_from(snap)
}

#[expect(clippy::cast_precision_loss)]
fn report_from(snap: EventState) -> EventReport {
    let mut aggregate_counters: Vec<AggregateSummary> = snap
        .aggregates
        .iter()
        .map(|(name, c)| {
            let skip_ratio = if c.cumulate_calls > 0 {
                c.rows_skipped as f64 / c.cumulate_calls as f64
            } else {
                0.0
            };

            AggregateSummary {
                name: name.clone(),
                cumulate_calls: c.cumulate_calls,
                merge_calls: c.merge_calls,
                remove_calls: c.remove_calls,
                finalize_calls: c.finalize_calls,
                rows_skipped: c.rows_skipped,
                distinct_duplicates: c.distinct_duplicates,
                failures: c.failures,
                skip_ratio,
            }
        })
        .collect();

    // busiest first, then by name
    aggregate_counters.sort_by(|a, b| match b.cumulate_calls.cmp(&a.cumulate_calls) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });

    EventReport {
        counters: Some(snap),
        aggregate_counters,
    }
}

///
/// TESTS
///

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use crate::obs::metrics::{
        AggregateCounters, report_since, reset_all, with_state, with_state_mut,
    };

    #[test]
    fn reset_all_clears_state() {
        with_state_mut(|m| {
            m.ops.cumulate_calls = 3;
            m.ops.failure_classes.insert("evaluation".to_string(), 1);
            m.aggregates.insert(
                "count".to_string(),
                AggregateCounters {
                    cumulate_calls: 1,
                    ..Default::default()
                },
            );
        });

        reset_all();

        with_state(|m| {
            assert_eq!(m.ops.cumulate_calls, 0);
            assert!(m.ops.failure_classes.is_empty());
            assert!(m.aggregates.is_empty());
        });
    }

    #[test]
    fn report_sorts_aggregates_by_cumulate_calls() {
        reset_all();
        with_state_mut(|m| {
            for (name, calls, skipped) in [("avg", 4, 1), ("count", 10, 0), ("sum", 4, 2)] {
                m.aggregates.insert(
                    name.to_string(),
                    AggregateCounters {
                        cumulate_calls: calls,
                        rows_skipped: skipped,
                        ..Default::default()
                    },
                );
            }
        });

        let report = report_since(None);
        let names: Vec<_> = report
            .aggregate_counters
            .iter()
            .map(|a| a.name.as_str())
            .collect();

        assert_eq!(names, ["count", "avg", "sum"]);
        assert_eq!(report.aggregate_counters[1].skip_ratio, 0.25);
        assert_eq!(report.aggregate_counters[2].skip_ratio, 0.5);
    }

    #[test]
    fn report_after_window_start_is_empty() {
        reset_all();
        let since = with_state(|m| m.since_ms);

        let report = report_since(Some(since.saturating_add(1)));
        assert!(report.counters.is_none());
        assert!(report.aggregate_counters.is_empty());

        let report = report_since(Some(since));
        assert!(report.counters.is_some());
    }

    #[test]
    fn report_serializes_to_json() {
        reset_all();
        let json = serde_json::to_value(report_since(None)).expect("report should serialize");
        assert!(json["counters"]["ops"]["cumulate_calls"].is_u64());
    }
}
