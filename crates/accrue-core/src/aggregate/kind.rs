//! Module: aggregate::kind
//! Responsibility: the closed aggregate vocabulary and its capability table.
//! Does not own: accumulation semantics (see the per-aggregate modules).
//! Boundary: `AggregateBase::validate` is the only consumer of capabilities.

use std::fmt;

///
/// AggregateKind
///
/// Closed aggregate function selector.
/// `name()` is the canonical lowercase name used for display, window
/// attachments and metrics keys.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AggregateKind {
    Count,
    CountN,
    Sum,
    Avg,
    ArrayAgg,
    Median,
    Variance,
    VarSamp,
    VarPop,
    Stddev,
    StddevSamp,
    StddevPop,
    RowNumber,
    Rank,
    DenseRank,
    PercentRank,
    CumeDist,
    Ntile,
    Lag,
    Lead,
    NthValue,
}

impl AggregateKind {
    pub const ALL: [Self; 21] = [
        Self::Count,
        Self::CountN,
        Self::Sum,
        Self::Avg,
        Self::ArrayAgg,
        Self::Median,
        Self::Variance,
        Self::VarSamp,
        Self::VarPop,
        Self::Stddev,
        Self::StddevSamp,
        Self::StddevPop,
        Self::RowNumber,
        Self::Rank,
        Self::DenseRank,
        Self::PercentRank,
        Self::CumeDist,
        Self::Ntile,
        Self::Lag,
        Self::Lead,
        Self::NthValue,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::CountN => "countn",
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::ArrayAgg => "array_agg",
            Self::Median => "median",
            Self::Variance => "variance",
            Self::VarSamp => "var_samp",
            Self::VarPop => "var_pop",
            Self::Stddev => "stddev",
            Self::StddevSamp => "stddev_samp",
            Self::StddevPop => "stddev_pop",
            Self::RowNumber => "row_number",
            Self::Rank => "rank",
            Self::DenseRank => "dense_rank",
            Self::PercentRank => "percent_rank",
            Self::CumeDist => "cume_dist",
            Self::Ntile => "ntile",
            Self::Lag => "lag",
            Self::Lead => "lead",
            Self::NthValue => "nth_value",
        }
    }

    /// Resolve a case-insensitive function name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Return whether this kind belongs to the dispersion family.
    #[must_use]
    pub const fn is_dispersion(self) -> bool {
        matches!(
            self,
            Self::Variance
                | Self::VarSamp
                | Self::VarPop
                | Self::Stddev
                | Self::StddevSamp
                | Self::StddevPop
        )
    }

    /// Return whether this kind can only be evaluated over a window.
    #[must_use]
    pub const fn is_window_only(self) -> bool {
        matches!(
            self,
            Self::RowNumber
                | Self::Rank
                | Self::DenseRank
                | Self::PercentRank
                | Self::CumeDist
                | Self::Ntile
                | Self::Lag
                | Self::Lead
                | Self::NthValue
        )
    }

    /// Return whether this kind reads a value at a row offset in its frame.
    #[must_use]
    pub const fn is_offset(self) -> bool {
        matches!(self, Self::Lag | Self::Lead | Self::NthValue)
    }

    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Self::Count => Capabilities::GROUP_INVERTIBLE.with_args(0, 1),
            Self::CountN | Self::Sum | Self::Avg => Capabilities::GROUP_INVERTIBLE,
            Self::ArrayAgg
            | Self::Median
            | Self::Variance
            | Self::VarSamp
            | Self::VarPop
            | Self::Stddev
            | Self::StddevSamp
            | Self::StddevPop => Capabilities::GROUP_ONLY,
            Self::RowNumber => Capabilities::WINDOW_ONLY,
            Self::Rank | Self::DenseRank | Self::PercentRank | Self::CumeDist => {
                Capabilities::WINDOW_ORDERED
            }
            Self::Ntile => Capabilities::WINDOW_ORDERED.with_args(1, 1),
            Self::Lag | Self::Lead => Capabilities::WINDOW_SHIFT,
            Self::NthValue => Capabilities::WINDOW_NTH,
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///
/// Capabilities
///
/// Per-kind syntax capabilities checked once when an aggregate node is built.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[expect(clippy::struct_excessive_bools)]
pub struct Capabilities {
    pub allows_distinct: bool,
    pub allows_filter: bool,
    pub allows_regular: bool,
    pub allows_window: bool,
    pub allows_window_frame: bool,
    pub requires_window_order: bool,
    pub allows_null_treatment: bool,
    pub allows_from_last: bool,
    pub min_args: usize,
    pub max_args: usize,
}

impl Capabilities {
    // group or sliding window use; CumulateRemove is exact
    const GROUP_INVERTIBLE: Self = Self {
        allows_distinct: true,
        allows_filter: true,
        allows_regular: true,
        allows_window: true,
        allows_window_frame: true,
        requires_window_order: false,
        allows_null_treatment: false,
        allows_from_last: false,
        min_args: 1,
        max_args: 1,
    };

    // group use only; no remove
    const GROUP_ONLY: Self = Self {
        allows_window: false,
        allows_window_frame: false,
        ..Self::GROUP_INVERTIBLE
    };

    const WINDOW_ONLY: Self = Self {
        allows_distinct: false,
        allows_filter: false,
        allows_regular: false,
        allows_window: true,
        allows_window_frame: false,
        requires_window_order: false,
        allows_null_treatment: false,
        allows_from_last: false,
        min_args: 0,
        max_args: 0,
    };

    const WINDOW_ORDERED: Self = Self {
        requires_window_order: true,
        ..Self::WINDOW_ONLY
    };

    // LAG, LEAD: (expr [, offset [, default]]) over an ordered window
    const WINDOW_SHIFT: Self = Self {
        allows_null_treatment: true,
        ..Self::WINDOW_ORDERED
    }
    .with_args(1, 3);

    // NTH_VALUE: (expr, n) over any frame, recomputed per frame
    const WINDOW_NTH: Self = Self {
        allows_window_frame: true,
        allows_null_treatment: true,
        allows_from_last: true,
        ..Self::WINDOW_ONLY
    }
    .with_args(2, 2);

    const fn with_args(self, min_args: usize, max_args: usize) -> Self {
        Self {
            min_args,
            max_args,
            ..self
        }
    }

    /// True when the kind can only appear with an OVER clause.
    #[must_use]
    pub const fn requires_window(self) -> bool {
        self.allows_window && !self.allows_regular
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::aggregate::kind::AggregateKind;

    #[test]
    fn names_round_trip_case_insensitively() {
        for kind in AggregateKind::ALL {
            assert_eq!(AggregateKind::from_name(kind.name()), Some(kind));
            assert_eq!(
                AggregateKind::from_name(&kind.name().to_ascii_uppercase()),
                Some(kind)
            );
        }
        assert_eq!(AggregateKind::from_name("mode"), None);
    }

    #[test]
    fn frames_are_limited_to_invertible_and_nth_value() {
        let framed: Vec<AggregateKind> = AggregateKind::ALL
            .into_iter()
            .filter(|kind| kind.capabilities().allows_window_frame)
            .collect();

        assert_eq!(
            framed,
            [
                AggregateKind::Count,
                AggregateKind::CountN,
                AggregateKind::Sum,
                AggregateKind::Avg,
                AggregateKind::NthValue,
            ]
        );

        assert!(!AggregateKind::Median.capabilities().allows_window);
        assert!(!AggregateKind::ArrayAgg.capabilities().allows_window);
        assert!(AggregateKind::Avg.capabilities().allows_window_frame);
    }

    #[test]
    fn window_only_kinds_require_a_window() {
        for kind in AggregateKind::ALL {
            assert_eq!(kind.is_window_only(), kind.capabilities().requires_window());
        }

        assert!(!AggregateKind::RowNumber.capabilities().requires_window_order);
        assert!(AggregateKind::PercentRank.capabilities().requires_window_order);
        assert_eq!(AggregateKind::Ntile.capabilities().max_args, 1);
        assert_eq!(AggregateKind::Count.capabilities().min_args, 0);
    }

    #[test]
    fn offset_kinds_carry_their_modifiers() {
        let lag = AggregateKind::Lag.capabilities();
        assert!(lag.requires_window_order && lag.allows_null_treatment);
        assert!(!lag.allows_from_last);
        assert_eq!((lag.min_args, lag.max_args), (1, 3));

        let nth = AggregateKind::NthValue.capabilities();
        assert!(nth.allows_from_last && nth.allows_null_treatment);
        assert!(!nth.requires_window_order);
        assert_eq!((nth.min_args, nth.max_args), (2, 2));

        for kind in AggregateKind::ALL {
            let caps = kind.capabilities();
            assert_eq!(caps.allows_null_treatment, kind.is_offset(), "{kind}");
        }
    }
}
