//! Protocol-level tests that drive `AggregateFunction` end to end.

mod metrics;
mod scenarios;

use crate::{
    aggregate::{Aggregate, AggregateFunction, Cumulative},
    context::EvalContext,
    row::Item,
    value::Value,
};

/// Fold every row and finalize.
fn run(function: &AggregateFunction, rows: &[Item]) -> Value {
    function
        .fold_rows(rows, &EvalContext::default())
        .expect("fold should succeed")
}

/// Fold `rows` into an accumulator without finalizing.
fn accumulate(function: &AggregateFunction, rows: &[Item]) -> Cumulative {
    let ctx = EvalContext::default();
    rows.iter().fold(Cumulative::Absent, |acc, row| {
        function
            .cumulate_initial(row, acc, &ctx)
            .expect("cumulate should succeed")
    })
}

/// Finalize after every row, the way a window executor reads a running frame.
fn running(function: &AggregateFunction, rows: &[Item]) -> Vec<Value> {
    let ctx = EvalContext::default();
    let mut acc = Cumulative::Absent;

    rows.iter()
        .map(|row| {
            acc = function
                .cumulate_initial(row, std::mem::take(&mut acc), &ctx)
                .expect("cumulate should succeed");
            function
                .compute_final(acc.clone(), &ctx)
                .expect("finalize should succeed")
        })
        .collect()
}

fn finish(function: &AggregateFunction, acc: Cumulative) -> Value {
    function
        .compute_final(acc, &EvalContext::default())
        .expect("finalize should succeed")
}

/// Evaluate one frame the way a window executor does: seed from `current`,
/// feed peer groups in visiting order and stop once the aggregate is done.
/// Returns the result and the number of rows fed.
fn frame<'a>(
    function: &AggregateFunction,
    current: &Item,
    peer_groups: impl IntoIterator<Item = &'a [Item]>,
) -> (Value, usize) {
    let ctx = EvalContext::default();
    let mut acc = function
        .start_frame(current, &ctx)
        .expect("frame should start");
    let mut fed = 0;

    for group in peer_groups {
        for row in group {
            acc = function
                .cumulate_initial(row, acc, &ctx)
                .expect("cumulate should succeed");
            fed += 1;
        }
        if function
            .is_cumulate_done(&mut acc, &ctx)
            .expect("done check should succeed")
        {
            break;
        }
    }

    (finish(function, acc), fed)
}
