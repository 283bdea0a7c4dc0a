use derive_more::Display;
use std::cmp::Ordering;

///
/// CONSTANTS
///

// 2^63 as f64; every finite float strictly inside (-2^63, 2^63) that is
// integral converts to i64 without loss.
const I64_BOUND_F64: f64 = 9_223_372_036_854_775_808.0;

///
/// Float64
///
/// Finite f64 only; -0.0 canonically stored as 0.0
///

#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, Display)]
pub struct Float64(f64);

impl Float64 {
    /// Fallible constructor that rejects non-finite values and normalizes -0.0.
    #[must_use]
    pub fn try_new(v: f64) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }

        // canonicalize -0.0 to 0.0 so Eq/Hash/Ord are consistent
        Some(Self(if v == 0.0 { 0.0 } else { v }))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_bits().to_be_bytes()
    }

    /// Return the exact i64 when this float is integral and in range.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn to_i64_exact(self) -> Option<i64> {
        let v = self.0;
        if v.fract() == 0.0 && v >= -I64_BOUND_F64 && v < I64_BOUND_F64 {
            Some(v as i64)
        } else {
            None
        }
    }
}

impl Eq for Float64 {}

impl PartialEq for Float64 {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Ord for Float64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Float64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Float64> for f64 {
    fn from(x: Float64) -> Self {
        x.0
    }
}

///
/// Number
///
/// JSON number. Integers stay exact until an operation overflows or mixes in
/// a float, then arithmetic continues in f64.
/// Equality, ordering and hashing are numeric: `Int(4) == Float(4.0)`.
///

#[derive(Clone, Copy, Debug, Display)]
pub enum Number {
    Int(i64),
    Float(Float64),
}

impl Number {
    pub const ZERO: Self = Self::Int(0);
    pub const ONE: Self = Self::Int(1);

    #[must_use]
    pub fn from_f64(v: f64) -> Option<Self> {
        Float64::try_new(v).map(Self::Float)
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub const fn to_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f.get(),
        }
    }

    /// Return the exact integer value, if this number is integral.
    #[must_use]
    pub fn to_i64_exact(self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i),
            Self::Float(f) => f.to_i64_exact(),
        }
    }

    /// Canonical representation: integral floats collapse to `Int`.
    /// Equal numbers always share one canonical form.
    #[must_use]
    pub fn canonical(self) -> Self {
        match self {
            Self::Float(f) => f.to_i64_exact().map_or(self, Self::Int),
            Self::Int(_) => self,
        }
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        match self {
            Self::Int(i) => i == 0,
            Self::Float(f) => f.get() == 0.0,
        }
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        match self {
            Self::Int(i) => i > 0,
            Self::Float(f) => f.get() > 0.0,
        }
    }

    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_add(b)
                .map(Self::Int)
                .or_else(|| Self::from_f64(self.to_f64() + other.to_f64())),
            _ => Self::from_f64(self.to_f64() + other.to_f64()),
        }
    }

    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a
                .checked_sub(b)
                .map(Self::Int)
                .or_else(|| Self::from_f64(self.to_f64() - other.to_f64())),
            _ => Self::from_f64(self.to_f64() - other.to_f64()),
        }
    }

    /// Floating division; `None` for a zero divisor or a non-finite quotient.
    #[must_use]
    pub fn checked_div(self, other: Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }

        Self::from_f64(self.to_f64() / other.to_f64())
    }

    /// Mean of two numbers, computed in f64.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Option<Self> {
        Self::from_f64(self.to_f64() / 2.0 + other.to_f64() / 2.0)
    }
}

impl Eq for Number {}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (*self, *other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(&b),
            (Self::Float(a), Self::Float(b)) => a.cmp(&b),
            (Self::Int(a), Self::Float(b)) => cmp_int_float(a, b),
            (Self::Float(a), Self::Int(b)) => cmp_int_float(b, a).reverse(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Number {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Number {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

// Exact comparison of an integer against a float.
#[expect(clippy::cast_precision_loss)]
fn cmp_int_float(int: i64, float: Float64) -> Ordering {
    if let Some(exact) = float.to_i64_exact() {
        return int.cmp(&exact);
    }

    // Non-integral floats have |f| < 2^52, where the i64 -> f64 cast cannot
    // round across them; out-of-range floats dominate every i64.
    match (int as f64).total_cmp(&float.get()) {
        Ordering::Equal if float.get() > 0.0 => Ordering::Less,
        Ordering::Equal => Ordering::Greater,
        ord => ord,
    }
}

///
/// TESTS
///
