use crate::value::{Number, Value, canonical_cmp};
use derive_more::{Deref, IntoIterator};

///
/// ValueList
///
/// Ordered, duplicate-friendly accumulator buffer for sequence, multiset
/// and dispersion shapes.
///
/// Mutation is append-only apart from the ordered peer tail kept for
/// NTH_VALUE; `ValueList` does not expose `DerefMut`.
///

#[repr(transparent)]
#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq)]
#[into_iterator(owned, ref)]
pub struct ValueList(Vec<Value>);

impl ValueList {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Start a list with one value, reserving `capacity` slots.
    #[must_use]
    pub fn singleton(value: Value, capacity: usize) -> Self {
        let mut list = Self::with_capacity(capacity.max(1));
        list.push(value);
        list
    }

    #[must_use]
    pub const fn from_vec(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    /// Insert `value` into the tail from `start` on, keeping that tail in
    /// canonical order (reversed when `descending`, after equal members),
    /// then keep at most `limit` members. Members before `start` never move.
    pub(crate) fn insert_in_tail(
        &mut self,
        start: usize,
        value: Value,
        descending: bool,
        limit: usize,
    ) {
        let start = start.min(self.0.len());
        let at = self.0[start..].partition_point(|member| {
            let order = canonical_cmp(member, &value);
            if descending {
                order.is_ge()
            } else {
                order.is_le()
            }
        });

        self.0.insert(start + at, value);
        self.0.truncate(limit);
    }

    /// Concatenate two lists, appending the shorter onto the longer buffer.
    /// Element order across the two sides is not preserved.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        let (mut bigger, smaller) = if self.len() >= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        bigger.0.extend(smaller.0);

        bigger
    }

    /// Consume the list, returning its values in canonical order.
    #[must_use]
    pub fn into_sorted(self) -> Vec<Value> {
        let mut values = self.0;
        values.sort_by(canonical_cmp);
        values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    /// Project every member to a number; the first non-number is returned
    /// as `Err` with its type label.
    pub(crate) fn numbers(&self) -> Result<Vec<Number>, &'static str> {
        self.0
            .iter()
            .map(|value| value.as_number().ok_or_else(|| value.type_label()))
            .collect()
    }
}

impl FromIterator<Value> for ValueList {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// TESTS
///
