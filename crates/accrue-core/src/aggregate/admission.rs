use crate::value::Value;

///
/// Admission
///
/// Per-aggregate projection rule over the value lattice.
/// A value that is not admitted contributes nothing to the accumulator.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Admission {
    /// Anything above NULL (COUNT).
    Valued,

    /// NUMBER only (COUNTN, SUM, AVG, MEDIAN, dispersion).
    Number,

    /// Anything above MISSING except BINARY (ARRAY_AGG).
    Collectable,
}

impl Admission {
    #[must_use]
    pub const fn admits(self, value: &Value) -> bool {
        match self {
            Self::Valued => value.is_valued(),
            Self::Number => value.is_number(),
            Self::Collectable => !matches!(value, Value::Missing | Value::Binary(_)),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::{aggregate::admission::Admission, value::Value};

    #[test]
    fn admission_rules_follow_the_lattice() {
        let cases = [
            (Value::Missing, [false, false, false]),
            (Value::Null, [false, false, true]),
            (Value::Bool(false), [true, false, true]),
            (Value::from(0), [true, true, true]),
            (Value::from("a"), [true, false, true]),
            (Value::Binary(vec![1]), [true, false, false]),
        ];

        for (value, [valued, number, collectable]) in cases {
            assert_eq!(Admission::Valued.admits(&value), valued, "{value}");
            assert_eq!(Admission::Number.admits(&value), number, "{value}");
            assert_eq!(Admission::Collectable.admits(&value), collectable, "{value}");
        }
    }
}
