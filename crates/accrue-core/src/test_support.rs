use crate::{
    aggregate::{AggregateBase, AggregateFunction, AggregateKind, WindowRecord},
    context::EvalContext,
    error::InternalError,
    expr::Expression,
    obs::{MetricsEvent, MetricsSink},
    row::Item,
    value::{Number, Value},
};
use std::{cell::RefCell, fmt};

///
/// FailingExpr
///
/// Expression that always fails to evaluate.
///

#[derive(Clone, Copy, Debug)]
pub(crate) struct FailingExpr;

impl FailingExpr {
    pub(crate) const MESSAGE: &'static str = "operand failed to evaluate";
}

impl fmt::Display for FailingExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fail()")
    }
}

impl Expression for FailingExpr {
    fn evaluate(&self, _row: &Value, _ctx: &EvalContext) -> Result<Value, InternalError> {
        Err(InternalError::evaluation(Self::MESSAGE))
    }
}

///
/// RecordingSink
///
/// Metrics sink that keeps every event in order.
///

#[derive(Default)]
pub(crate) struct RecordingSink {
    events: RefCell<Vec<MetricsEvent>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<MetricsEvent> {
        self.events.borrow().clone()
    }
}

impl MetricsSink for RecordingSink {
    fn record(&self, event: MetricsEvent) {
        self.events.borrow_mut().push(event);
    }
}

pub(crate) fn item(row: serde_json::Value) -> Item {
    Item::from(row)
}

/// One `{"x": v}` row per value.
pub(crate) fn x_rows(values: impl IntoIterator<Item = serde_json::Value>) -> Vec<Item> {
    values
        .into_iter()
        .map(|x| item(serde_json::json!({ "x": x })))
        .collect()
}

/// Rows carrying a `{part, nrows}` attachment for `kind`.
pub(crate) fn window_rows(kind: AggregateKind, records: &[(i64, i64)]) -> Vec<Item> {
    records
        .iter()
        .map(|&(part, nrows)| {
            Item::from(serde_json::json!({})).with_window_attachment(
                kind.name(),
                WindowRecord::new(Number::Int(part), Number::Int(nrows)).into(),
            )
        })
        .collect()
}

/// Build a node that is known to be valid.
pub(crate) fn function(kind: AggregateKind, base: AggregateBase) -> AggregateFunction {
    AggregateFunction::new(kind, base).expect("test aggregate should validate")
}

pub(crate) fn render(base: &AggregateBase, kind: AggregateKind) -> String {
    struct Rendered<'a>(&'a AggregateBase, AggregateKind);

    impl fmt::Display for Rendered<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.render(self.1, f)
        }
    }

    Rendered(base, kind).to_string()
}
