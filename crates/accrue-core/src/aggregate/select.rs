//! Module: aggregate::select
//! Responsibility: linear-time order statistics (median of medians).
//! Does not own: admission or accumulator shape (see `median`).
//! Boundary: operates on plain numbers; callers project values first.

use crate::{config::EngineConfig, value::Number};
use std::cmp::Ordering;

/// Return the `k`-th smallest number (1-based), or `None` when `k` is out
/// of range.
///
/// Inputs at or below `median_small_cutoff` are sorted directly. Larger
/// inputs are partitioned three ways around a median-of-medians pivot; only
/// the side holding rank `k` is kept, so every round discards a constant
/// fraction.
#[must_use]
pub(crate) fn select_kth(
    mut data: Vec<Number>,
    mut k: usize,
    config: &EngineConfig,
) -> Option<Number> {
    if k == 0 || k > data.len() {
        return None;
    }
    let cutoff = config.median_small_cutoff();

    loop {
        if data.len() <= cutoff {
            data.sort_unstable();
            return data.get(k - 1).copied();
        }

        let pivot = pivot_of(&data, config)?;
        let mut less = Vec::with_capacity(data.len() / 2);
        let mut greater = Vec::with_capacity(data.len() / 2);
        let mut equal = 0usize;

        for x in data {
            match x.cmp(&pivot) {
                Ordering::Less => less.push(x),
                Ordering::Equal => equal += 1,
                Ordering::Greater => greater.push(x),
            }
        }

        if k <= less.len() {
            data = less;
        } else if k <= less.len() + equal {
            return Some(pivot);
        } else {
            k -= less.len() + equal;
            data = greater;
        }
    }
}

/// Median of a multiset: rank `(n+1)/2` for odd `n`, the mean of ranks
/// `n/2` and `n/2 + 1` for even `n`. `None` for empty input.
#[must_use]
pub(crate) fn median(data: Vec<Number>, config: &EngineConfig) -> Option<Number> {
    let n = data.len();
    if n % 2 == 1 {
        return select_kth(data, n.div_ceil(2), config);
    }

    let lower = select_kth(data.clone(), n / 2, config)?;
    let upper = select_kth(data, n / 2 + 1, config)?;

    lower.midpoint(upper)
}

// Median of the block medians; each block median is its lower middle.
fn pivot_of(data: &[Number], config: &EngineConfig) -> Option<Number> {
    let medians: Vec<Number> = data
        .chunks(config.median_block_len.max(1))
        .filter_map(|chunk| {
            let mut block = chunk.to_vec();
            block.sort_unstable();
            block.get((block.len() - 1) / 2).copied()
        })
        .collect();
    let k = medians.len().div_ceil(2);

    select_kth(medians, k, config)
}

///
/// TESTS
///
