use crate::value::{Number, Value};
use xxhash_rust::xxh3::Xxh3;

/// Stable XXH3 seed used by canonical value hashing.
pub(crate) const VALUE_HASH_SEED: u64 = 0;

///
/// StableHash
///
/// Canonical fixed-width hash used to bucket values inside a `ValueSet`.
/// Equal values (under `canonical_cmp`) always hash equally.
///

pub(crate) type StableHash = u64;

fn feed_u8(h: &mut Xxh3, x: u8) {
    h.update(&[x]);
}
// Lengths are widened to u64 so no prefix ever wraps.
fn feed_len(h: &mut Xxh3, len: usize) {
    let len = u64::try_from(len).unwrap_or(u64::MAX);
    h.update(&len.to_be_bytes());
}
fn feed_i64(h: &mut Xxh3, x: i64) {
    h.update(&x.to_be_bytes());
}
fn feed_bytes(h: &mut Xxh3, b: &[u8]) {
    h.update(b);
}

/// Hash one value with the canonical distinct hashing contract.
#[must_use]
pub(crate) fn stable_hash_value(value: &Value) -> StableHash {
    let mut h = Xxh3::with_seed(VALUE_HASH_SEED);
    write_to_hasher(value, &mut h);

    h.digest()
}

fn write_to_hasher(value: &Value, h: &mut Xxh3) {
    feed_u8(h, value.tag().to_u8());

    match value {
        Value::Missing | Value::Null => {}
        Value::Bool(b) => feed_u8(h, u8::from(*b)),
        Value::Number(n) => match n.canonical() {
            // numerically equal ints and floats must collide
            Number::Int(i) => {
                feed_u8(h, 0x01);
                feed_i64(h, i);
            }
            Number::Float(f) => {
                feed_u8(h, 0x02);
                feed_bytes(h, &f.to_be_bytes());
            }
        },
        Value::Text(s) => {
            feed_len(h, s.len());
            feed_bytes(h, s.as_bytes());
        }
        Value::Array(xs) => {
            feed_len(h, xs.len());
            for x in xs {
                feed_u8(h, 0xFF);
                write_to_hasher(x, h); // recurse, no sub-hash
            }
        }
        Value::Object(entries) => {
            // BTreeMap iteration is already canonical key order
            feed_len(h, entries.len());
            for (key, value) in entries {
                feed_u8(h, 0xFD);
                feed_len(h, key.len());
                feed_bytes(h, key.as_bytes());
                feed_u8(h, 0xFE);
                write_to_hasher(value, h);
            }
        }
        Value::Binary(bytes) => {
            feed_len(h, bytes.len());
            feed_bytes(h, bytes);
        }
    }
}

///
/// TESTS
///
