use crate::{
    aggregate::{
        distinct::DistinctSet,
        list::ValueList,
        window::{NtileState, OffsetState, WindowRecord},
    },
    value::Number,
};

///
/// Cumulative
///
/// Closed accumulator shape threaded through every protocol call.
///
/// `Absent` is the state before any row and the identity of every merge.
/// Once an accumulator leaves `Absent` its shape never changes; a shape
/// other than the one an aggregate expects is a hard type-mismatch error.
///
/// Accumulators are moved into each call and returned, so buffers are
/// reused in place rather than copied.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Cumulative {
    #[default]
    Absent,

    /// COUNT, COUNTN.
    Scalar(Number),

    /// SUM, AVG.
    Compound { sum: Number, count: u64 },

    /// ARRAY_AGG.
    Sequence(ValueList),

    /// MEDIAN.
    Multiset(ValueList),

    /// VARIANCE and STDDEV families.
    Dispersion { values: ValueList, sum: Number },

    /// Every DISTINCT variant.
    Distinct(DistinctSet),

    /// Ranking window functions.
    Window(WindowRecord),

    /// NTILE.
    Ntile(NtileState),

    /// LAG, LEAD, NTH_VALUE.
    Offset(OffsetState),
}

impl Cumulative {
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Stable shape label used in diagnostics.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Scalar(_) => "scalar",
            Self::Compound { .. } => "compound",
            Self::Sequence(_) => "sequence",
            Self::Multiset(_) => "multiset",
            Self::Dispersion { .. } => "dispersion",
            Self::Distinct(_) => "distinct set",
            Self::Window(_) => "window record",
            Self::Ntile(_) => "ntile state",
            Self::Offset(_) => "offset list",
        }
    }
}

///
/// TESTS
///
