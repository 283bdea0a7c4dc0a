use crate::value::{
    Value,
    hash::{StableHash, stable_hash_value},
};
use std::collections::BTreeMap;

///
/// ValueSet
///
/// ValueSet deduplicates values by stable-hash bucket while preserving
/// canonical-value equality checks inside each bucket.
/// Members enumerate in first-insertion order.
///

#[derive(Clone, Debug, Default)]
pub struct ValueSet {
    members: Vec<Value>,
    buckets: BTreeMap<StableHash, Vec<usize>>,
}

impl ValueSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
            buckets: BTreeMap::new(),
        }
    }

    /// Insert one value and return true if it was newly observed.
    pub fn insert(&mut self, value: Value) -> bool {
        let hash = stable_hash_value(&value);
        let bucket = self.buckets.entry(hash).or_default();
        if bucket.iter().any(|&slot| self.members[slot] == value) {
            return false;
        }

        bucket.push(self.members.len());
        self.members.push(value);
        true
    }

    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.buckets
            .get(&stable_hash_value(value))
            .is_some_and(|bucket| bucket.iter().any(|&slot| self.members[slot] == *value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.members.iter()
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.members
    }

    /// Union two sets, folding the smaller into the larger.
    /// Returns the merged set and the number of values the smaller side
    /// contributed that were not already present.
    #[must_use]
    pub fn union(self, other: Self) -> (Self, usize) {
        let (smaller, mut bigger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };

        let mut added = 0usize;
        for value in smaller.members {
            if bigger.insert(value) {
                added += 1;
            }
        }

        (bigger, added)
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|value| other.contains(value))
    }
}

impl Eq for ValueSet {}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

///
/// TESTS
///
