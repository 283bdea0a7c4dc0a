use crate::{
    aggregate::{Aggregate, AggregateBase, AggregateKind, Cumulative, tests::accumulate},
    config::EngineConfig,
    context::EvalContext,
    error::ErrorClass,
    expr::Expr,
    obs::{MetricsEvent, SkipReason, metrics_report, metrics_reset_all, with_metrics_sink},
    test_support::{RecordingSink, function, x_rows},
};
use serde_json::json;

fn x() -> AggregateBase {
    AggregateBase::unary(Expr::field("x"))
}

#[test]
fn every_protocol_call_emits_one_event() {
    let sink = RecordingSink::default();
    let agg = function(AggregateKind::Count, x());
    let rows = x_rows([json!(1), json!(null)]);

    with_metrics_sink(&sink, || {
        agg.fold_rows(&rows, &EvalContext::default())
            .expect("fold should succeed")
    });

    assert_eq!(
        sink.events(),
        vec![
            MetricsEvent::Cumulate { aggregate: "count" },
            MetricsEvent::RowSkipped {
                aggregate: "count",
                reason: SkipReason::NotAdmitted,
            },
            MetricsEvent::Cumulate { aggregate: "count" },
            MetricsEvent::Finalize { aggregate: "count" },
        ]
    );
}

#[test]
fn distinct_duplicates_are_recorded() {
    let sink = RecordingSink::default();
    let agg = function(AggregateKind::Sum, x().distinct());

    with_metrics_sink(&sink, || accumulate(&agg, &x_rows([json!(2), json!(2)])));

    let duplicates = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, MetricsEvent::DistinctDuplicate { aggregate: "sum" }))
        .count();
    assert_eq!(duplicates, 1);
}

#[test]
fn failures_carry_their_error_class() {
    let sink = RecordingSink::default();
    let agg = function(AggregateKind::Median, x());
    let row = &x_rows([json!(1)])[0];

    let result = with_metrics_sink(&sink, || {
        agg.cumulate_remove(row, Cumulative::Absent, &EvalContext::default())
    });

    assert!(result.is_err());
    assert_eq!(
        sink.events(),
        vec![
            MetricsEvent::Remove { aggregate: "median" },
            MetricsEvent::Failure {
                aggregate: "median",
                class: ErrorClass::Unsupported,
            },
        ]
    );
}

#[test]
fn disabled_metrics_record_nothing() {
    let sink = RecordingSink::default();
    let ctx = EvalContext::new(EngineConfig::default().without_metrics())
        .expect("default config is valid");
    let agg = function(AggregateKind::Avg, x());

    with_metrics_sink(&sink, || {
        agg.fold_rows(&x_rows([json!(1), json!("a")]), &ctx)
            .expect("fold should succeed")
    });

    assert!(sink.events().is_empty());
}

#[test]
fn global_report_aggregates_per_function() {
    metrics_reset_all();
    let ctx = EvalContext::default();
    let agg = function(AggregateKind::CountN, x());

    agg.fold_rows(&x_rows([json!(1), json!("a"), json!(3), json!(null)]), &ctx)
        .expect("fold should succeed");

    let report = metrics_report(None);
    let counters = report.counters.expect("counters are present");
    assert_eq!(counters.ops.cumulate_calls, 4);
    assert_eq!(counters.ops.finalize_calls, 1);
    assert_eq!(counters.ops.rows_not_admitted, 2);

    let summary = report
        .aggregate_counters
        .iter()
        .find(|s| s.name == "countn")
        .expect("countn summary");
    assert_eq!(summary.rows_skipped, 2);
    assert!((summary.skip_ratio - 0.5).abs() < f64::EPSILON);
}
