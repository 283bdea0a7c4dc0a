use crate::{expr::Expression, value::Number};
use std::{fmt, sync::Arc};

///
/// WindowTerm
///
/// OVER clause of a windowed aggregate node.
/// Partition keys are deduplicated and rendered in name order; their order
/// has no effect on partitioning.
///

#[derive(Clone, Debug, Default)]
pub struct WindowTerm {
    partition_by: Vec<Arc<dyn Expression>>,
    order_by: Vec<OrderTerm>,
    frame: Option<WindowFrame>,
}

impl WindowTerm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn partition_by(mut self, expr: impl Expression + 'static) -> Self {
        let expr: Arc<dyn Expression> = Arc::new(expr);
        let key = expr.to_string();
        if !self.partition_by.iter().any(|e| e.to_string() == key) {
            self.partition_by.push(expr);
        }
        self
    }

    #[must_use]
    pub fn order_by(mut self, expr: impl Expression + 'static, descending: bool) -> Self {
        self.order_by.push(OrderTerm {
            expr: Arc::new(expr),
            descending,
        });
        self
    }

    #[must_use]
    pub const fn frame(mut self, frame: WindowFrame) -> Self {
        self.frame = Some(frame);
        self
    }

    #[must_use]
    pub fn partition_keys(&self) -> &[Arc<dyn Expression>] {
        &self.partition_by
    }

    #[must_use]
    pub fn order_terms(&self) -> &[OrderTerm] {
        &self.order_by
    }

    #[must_use]
    pub const fn window_frame(&self) -> Option<&WindowFrame> {
        self.frame.as_ref()
    }

    #[must_use]
    pub fn has_order(&self) -> bool {
        !self.order_by.is_empty()
    }
}

impl fmt::Display for WindowTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OVER (")?;

        let mut sep = "";
        if !self.partition_by.is_empty() {
            let mut names: Vec<String> = self.partition_by.iter().map(ToString::to_string).collect();
            names.sort();
            write!(f, "PARTITION BY {}", names.join(", "))?;
            sep = " ";
        }

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self.order_by.iter().map(ToString::to_string).collect();
            write!(f, "{sep}ORDER BY {}", terms.join(", "))?;
            sep = " ";
        }

        if let Some(frame) = &self.frame {
            write!(f, "{sep}{frame}")?;
        }

        write!(f, ")")
    }
}

///
/// OrderTerm
///

#[derive(Clone, Debug)]
pub struct OrderTerm {
    pub expr: Arc<dyn Expression>,
    pub descending: bool,
}

impl fmt::Display for OrderTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "{} DESC", self.expr)
        } else {
            write!(f, "{}", self.expr)
        }
    }
}

///
/// WindowFrame
///
/// Frame extent of a window. Boundary computation belongs to the executor;
/// the engine only needs the frame for capability checks and identity.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowFrame {
    pub unit: FrameUnit,
    pub start: FrameBound,
    pub end: Option<FrameBound>,
    pub exclude: FrameExclude,
}

impl WindowFrame {
    /// `unit BETWEEN start AND end`.
    #[must_use]
    pub const fn between(unit: FrameUnit, start: FrameBound, end: FrameBound) -> Self {
        Self {
            unit,
            start,
            end: Some(end),
            exclude: FrameExclude::NoOthers,
        }
    }

    /// Single-extent frame, e.g. `ROWS UNBOUNDED PRECEDING`.
    #[must_use]
    pub const fn starting(unit: FrameUnit, start: FrameBound) -> Self {
        Self {
            unit,
            start,
            end: None,
            exclude: FrameExclude::NoOthers,
        }
    }

    #[must_use]
    pub const fn excluding(mut self, exclude: FrameExclude) -> Self {
        self.exclude = exclude;
        self
    }
}

impl fmt::Display for WindowFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{} BETWEEN {} AND {end}", self.unit, self.start)?,
            None => write!(f, "{} {}", self.unit, self.start)?,
        }

        match self.exclude {
            FrameExclude::NoOthers => Ok(()),
            exclude => write!(f, " {exclude}"),
        }
    }
}

///
/// FrameUnit
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrameUnit {
    Rows,
    Range,
    Groups,
}

impl fmt::Display for FrameUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rows => "ROWS",
            Self::Range => "RANGE",
            Self::Groups => "GROUPS",
        })
    }
}

///
/// FrameBound
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(Number),
    CurrentRow,
    Following(Number),
    UnboundedFollowing,
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundedPreceding => write!(f, "UNBOUNDED PRECEDING"),
            Self::Preceding(n) => write!(f, "{n} PRECEDING"),
            Self::CurrentRow => write!(f, "CURRENT ROW"),
            Self::Following(n) => write!(f, "{n} FOLLOWING"),
            Self::UnboundedFollowing => write!(f, "UNBOUNDED FOLLOWING"),
        }
    }
}

///
/// FrameExclude
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FrameExclude {
    #[default]
    NoOthers,
    CurrentRow,
    Group,
    Ties,
}

impl fmt::Display for FrameExclude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoOthers => "EXCLUDE NO OTHERS",
            Self::CurrentRow => "EXCLUDE CURRENT ROW",
            Self::Group => "EXCLUDE GROUP",
            Self::Ties => "EXCLUDE TIES",
        })
    }
}

///
/// TESTS
///
