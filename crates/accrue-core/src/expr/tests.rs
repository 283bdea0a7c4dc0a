use crate::{
    context::EvalContext,
    expr::{CompareOp, Expr, Expression, TypeTest},
    value::Value,
};
use serde_json::json;

fn eval(expr: &Expr, row: serde_json::Value) -> Value {
    expr.evaluate(&Value::from(row), &EvalContext::default())
        .expect("in-crate expressions never fail")
}

#[test]
fn field_paths_resolve_or_yield_missing() {
    let row = json!({"a": {"b": 2}});

    assert_eq!(eval(&Expr::field("a.b"), row.clone()), Value::from(2));
    assert!(eval(&Expr::field("a.c"), row.clone()).is_missing());
    assert_eq!(eval(&Expr::Current, row.clone()), Value::from(row));
}

#[test]
fn comparison_propagates_missing_before_null() {
    let gt = Expr::field("x").gt(Expr::literal(1));

    assert_eq!(eval(&gt, json!({"x": 2})), Value::Bool(true));
    assert_eq!(eval(&gt, json!({"x": 1})), Value::Bool(false));
    assert!(eval(&gt, json!({"x": null})).is_null());
    assert!(eval(&gt, json!({})).is_missing());
    assert!(eval(&Expr::field("x").equals(Expr::Literal(Value::Null)), json!({})).is_missing());
}

#[test]
fn comparison_uses_cross_type_collation() {
    let lt = Expr::field("x").compare(CompareOp::Lt, Expr::literal("a"));
    assert_eq!(eval(&lt, json!({"x": 99})), Value::Bool(true));
    assert_eq!(eval(&lt, json!({"x": [1]})), Value::Bool(false));
}

#[test]
fn boolean_connectives_are_three_valued() {
    let t = Expr::literal(true);
    let f = Expr::literal(false);
    let n = Expr::Literal(Value::Null);
    let m = Expr::Literal(Value::Missing);

    assert_eq!(eval(&f.clone().and(m.clone()), json!({})), Value::Bool(false));
    assert!(eval(&t.clone().and(n.clone()), json!({})).is_null());
    assert!(eval(&t.clone().and(m.clone()), json!({})).is_missing());
    assert_eq!(eval(&n.clone().or(t.clone()), json!({})), Value::Bool(true));
    assert!(eval(&f.clone().or(n.clone()), json!({})).is_null());
    assert_eq!(eval(&t.negate(), json!({})), Value::Bool(false));
    assert!(eval(&m.negate(), json!({})).is_missing());
}

#[test]
fn type_tests_never_propagate_unknowns() {
    let is_missing = Expr::field("x").is(TypeTest::Missing);
    let is_valued = Expr::field("x").is(TypeTest::Valued);

    assert_eq!(eval(&is_missing, json!({})), Value::Bool(true));
    assert_eq!(eval(&is_valued, json!({"x": null})), Value::Bool(false));
    assert_eq!(eval(&is_valued, json!({"x": 0})), Value::Bool(true));
}

#[test]
fn display_is_canonical() {
    let expr = Expr::field("a.b")
        .gt(Expr::literal(1))
        .and(Expr::field("c").is(TypeTest::Null).negate());

    assert_eq!(expr.to_string(), "((a.b > 1) AND (NOT (c IS NULL)))");
    assert_eq!(Expr::literal("x").to_string(), r#""x""#);
}
