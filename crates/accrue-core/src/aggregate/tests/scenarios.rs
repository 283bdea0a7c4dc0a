use crate::{
    aggregate::{
        Aggregate, AggregateBase, AggregateFunction, AggregateKind,
        tests::{run, running},
    },
    context::EvalContext,
    expr::Expr,
    row::Item,
    test_support::{FailingExpr, function, item, x_rows},
    value::Value,
};
use serde_json::json;

fn x() -> AggregateBase {
    AggregateBase::unary(Expr::field("x"))
}

fn ints(values: &[i64]) -> Vec<Item> {
    x_rows(values.iter().map(|v| json!(v)))
}

///
/// COUNT / COUNTN
///

#[test]
fn count_star_counts_every_row() {
    let rows = vec![item(json!({"a": 1})), item(json!({})), item(json!({"a": null}))];
    let count = function(AggregateKind::Count, AggregateBase::new());

    assert_eq!(run(&count, &rows), Value::from(3));
}

#[test]
fn count_skips_missing_and_null_operands() {
    let rows = vec![
        item(json!({"x": 1})),
        item(json!({"x": null})),
        item(json!({})),
        item(json!({"x": "a"})),
    ];

    assert_eq!(run(&function(AggregateKind::Count, x()), &rows), Value::from(2));
}

#[test]
fn countn_admits_numbers_only() {
    let rows = x_rows([json!(1), json!("a"), json!(2), json!(null)]);

    assert_eq!(run(&function(AggregateKind::CountN, x()), &rows), Value::from(2));
}

#[test]
fn count_of_no_rows_is_zero() {
    for kind in [AggregateKind::Count, AggregateKind::CountN] {
        assert_eq!(run(&function(kind, x()), &[]), Value::from(0));
        assert_eq!(run(&function(kind, x().distinct()), &[]), Value::from(0));
    }
}

#[test]
fn count_distinct_is_set_cardinality() {
    let rows = x_rows([json!(1), json!(1.0), json!(2), json!("a"), json!("a")]);
    let count = function(AggregateKind::Count, x().distinct());

    assert_eq!(run(&count, &rows), Value::from(3));
}

///
/// SUM / AVG
///

#[test]
fn sum_keeps_integers_exact_and_promotes_floats() {
    let sum = function(AggregateKind::Sum, x());

    assert_eq!(run(&sum, &ints(&[1, 2, 3])), Value::from(6));
    assert_eq!(
        run(&sum, &x_rows([json!(1), json!(2.5), json!("skip")])),
        Value::float(3.5)
    );
    assert_eq!(
        run(&sum, &ints(&[i64::MAX, 1])),
        Value::float(9_223_372_036_854_775_808.0)
    );
}

#[test]
fn sum_of_no_numbers_is_null() {
    let sum = function(AggregateKind::Sum, x());

    assert_eq!(run(&sum, &[]), Value::Null);
    assert_eq!(run(&sum, &x_rows([json!("a"), json!(null)])), Value::Null);
}

#[test]
fn sum_distinct_adds_each_member_once() {
    let sum = function(AggregateKind::Sum, x().distinct());

    assert_eq!(run(&sum, &ints(&[1, 1, 2, 2, 3])), Value::from(6));
}

#[test]
fn avg_divides_sum_by_count() {
    let avg = function(AggregateKind::Avg, x());

    assert_eq!(run(&avg, &ints(&[2, 4, 6])), Value::from(4));
    assert_eq!(run(&avg, &ints(&[1, 2])), Value::float(1.5));
    assert_eq!(run(&avg, &[]), Value::Null);
}

#[test]
fn avg_distinct_uses_deduplicated_members() {
    let avg = function(AggregateKind::Avg, x().distinct());

    assert_eq!(run(&avg, &ints(&[2, 2, 2, 4])), Value::from(3));
}

///
/// ARRAY_AGG
///

#[test]
fn array_agg_sorts_by_the_value_order() {
    let rows = vec![
        item(json!({"x": "b"})),
        item(json!({"x": 3})),
        item(json!({})),
        item(json!({"x": null})),
        item(json!({"x": 1})),
        Item::new(Value::object([("x", Value::Binary(vec![0xff]))])),
    ];
    let agg = function(AggregateKind::ArrayAgg, x());

    assert_eq!(
        run(&agg, &rows),
        Value::Array(vec![
            Value::Null,
            Value::from(1),
            Value::from(3),
            Value::from("b")
        ])
    );
}

#[test]
fn array_agg_distinct_returns_sorted_members() {
    let agg = function(AggregateKind::ArrayAgg, x().distinct());

    assert_eq!(
        run(&agg, &ints(&[3, 1, 3, 2])),
        Value::Array(vec![Value::from(1), Value::from(2), Value::from(3)])
    );
}

#[test]
fn array_agg_of_nothing_is_null() {
    let agg = function(AggregateKind::ArrayAgg, x());

    assert_eq!(run(&agg, &[item(json!({}))]), Value::Null);
}

///
/// MEDIAN
///

#[test]
fn median_picks_the_middle_rank() {
    let median = function(AggregateKind::Median, x());

    assert_eq!(run(&median, &ints(&[5, 1, 3])), Value::from(3));
    assert_eq!(run(&median, &ints(&[5, 1, 3, 7])), Value::from(4));
    assert_eq!(
        run(&median, &x_rows([json!(4), json!("x"), json!(null), json!(2)])),
        Value::from(3)
    );
    assert_eq!(run(&median, &[]), Value::Null);
}

#[test]
fn median_distinct_ignores_repeats() {
    let median = function(AggregateKind::Median, x().distinct());

    assert_eq!(run(&median, &ints(&[1, 1, 1, 5])), Value::from(3));
}

#[test]
fn median_of_a_large_group() {
    let values: Vec<i64> = (0..2_001).map(|i| (i * 1_009) % 2_001).collect();
    let median = function(AggregateKind::Median, x());

    assert_eq!(run(&median, &ints(&values)), Value::from(1_000));
}

///
/// VARIANCE / STDDEV
///

#[test]
fn dispersion_family_matches_textbook_values() {
    let rows = ints(&[2, 4, 4, 4, 5, 5, 7, 9]);
    let sample = 32.0_f64 / 7.0;
    let cases = [
        (AggregateKind::VarPop, 4.0),
        (AggregateKind::StddevPop, 2.0),
        (AggregateKind::Variance, sample),
        (AggregateKind::VarSamp, sample),
        (AggregateKind::Stddev, sample.sqrt()),
        (AggregateKind::StddevSamp, sample.sqrt()),
    ];

    for (kind, expected) in cases {
        assert_eq!(run(&function(kind, x()), &rows), Value::float(expected), "{kind}");
    }
}

#[test]
fn dispersion_of_one_value_is_zero_and_of_none_is_null() {
    for kind in AggregateKind::ALL.into_iter().filter(|k| k.is_dispersion()) {
        let agg = function(kind, x());
        assert_eq!(run(&agg, &ints(&[42])), Value::from(0), "{kind}");
        assert_eq!(run(&agg, &[]), Value::Null, "{kind}");
    }
}

#[test]
fn dispersion_distinct_uses_members() {
    let agg = function(AggregateKind::VarPop, x().distinct());

    // members {1, 3}: mean 2, squares 2, population variance 1
    assert_eq!(run(&agg, &ints(&[1, 1, 3, 3, 3])), Value::from(1));
}

///
/// FILTER AND OPERAND ERRORS
///

#[test]
fn filter_limits_contributing_rows() {
    let base = x().filter(Expr::field("x").gt(Expr::literal(1)));
    let sum = function(AggregateKind::Sum, base);

    assert_eq!(run(&sum, &ints(&[1, 2, 3])), Value::from(5));
}

#[test]
fn filter_errors_skip_rows_without_failing() {
    let count = function(AggregateKind::Count, x().filter(FailingExpr));

    assert_eq!(run(&count, &ints(&[1, 2])), Value::from(0));
}

#[test]
fn operand_errors_propagate_from_cumulate() {
    let sum = function(AggregateKind::Sum, AggregateBase::unary(FailingExpr));
    let err = sum
        .fold_rows(&ints(&[1]), &EvalContext::default())
        .expect_err("operand failure must propagate");

    assert_eq!(err.to_string(), FailingExpr::MESSAGE);
}

#[test]
fn running_sum_reports_every_prefix() {
    let sum = function(AggregateKind::Sum, x());

    assert_eq!(
        running(&sum, &ints(&[1, 2, 3])),
        vec![Value::from(1), Value::from(3), Value::from(6)]
    );
}

///
/// CONSTRUCTION
///

#[test]
fn from_name_resolves_case_insensitively() {
    let avg = AggregateFunction::from_name("AVG", x()).expect("avg is known");
    assert_eq!(avg.kind(), AggregateKind::Avg);

    assert!(AggregateFunction::from_name("mode", x()).is_err());
}

#[test]
fn construction_rejects_invalid_nodes() {
    assert!(AggregateFunction::new(AggregateKind::Sum, AggregateBase::new()).is_err());
    assert!(AggregateFunction::new(AggregateKind::Rank, AggregateBase::new()).is_err());
}

#[test]
fn nodes_compare_by_canonical_text() {
    let a = function(AggregateKind::Count, x().distinct());
    let b = function(AggregateKind::Count, x().distinct());
    let c = function(AggregateKind::CountN, x().distinct());

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.to_string(), "count(DISTINCT x)");
}
