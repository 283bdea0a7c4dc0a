use crate::{
    aggregate::{
        base::AggregateBase,
        cumulative::Cumulative,
        kind::AggregateKind,
        protocol::{Aggregate, merge_mismatch},
        window::attachment::{WindowRecord, read_attachment},
    },
    context::EvalContext,
    error::InternalError,
    obs::{MetricsEvent, SkipReason},
    row::Item,
    value::{Number, Value},
};

const WINDOW: &str = "window record";

///
/// Ranking
///
/// ROW_NUMBER, RANK, DENSE_RANK, PERCENT_RANK and CUME_DIST.
///
/// The executor attaches `{part, nrows}` to every row; the aggregate only
/// folds those records. Parts are summed (CUME_DIST replaces, since its part
/// is already an absolute position) and `nrows` is always replaced.
///

#[derive(Clone, Debug)]
pub struct Ranking {
    base: AggregateBase,
    kind: AggregateKind,
}

impl Ranking {
    /// `kind` must be one of the ranking kinds.
    #[must_use]
    pub const fn new(kind: AggregateKind, base: AggregateBase) -> Self {
        Self { base, kind }
    }

    fn fold(
        &self,
        record: WindowRecord,
        acc: WindowRecord,
    ) -> Result<WindowRecord, InternalError> {
        let part = if self.kind == AggregateKind::CumeDist {
            record.part
        } else {
            acc.part
                .checked_add(record.part)
                .ok_or_else(|| InternalError::numeric_overflow(self.name()))?
        };

        Ok(WindowRecord::new(part, record.nrows))
    }
}

impl Aggregate for Ranking {
    fn kind(&self) -> AggregateKind {
        self.kind
    }

    fn base(&self) -> &AggregateBase {
        &self.base
    }

    fn cumulate_initial(
        &self,
        item: &Item,
        cumulative: Cumulative,
        ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        let name = self.name();
        let Some(record) = read_attachment(name, item)? else {
            ctx.record(MetricsEvent::RowSkipped {
                aggregate: name,
                reason: SkipReason::NullAttachment,
            });
            return Ok(cumulative);
        };

        match cumulative {
            Cumulative::Absent => Ok(Cumulative::Window(record)),
            Cumulative::Window(acc) => self.fold(record, acc).map(Cumulative::Window),
            other => Err(InternalError::aggregate_shape_mismatch(
                name,
                WINDOW,
                other.shape(),
            )),
        }
    }

    // Partials never cross a partition; the running record already holds
    // the answer, so only the Absent identity does any work.
    fn cumulate_intermediate(
        &self,
        part: Cumulative,
        cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        match (part, cumulative) {
            (Cumulative::Absent, other) | (other, Cumulative::Absent) => Ok(other),
            (Cumulative::Window(_), Cumulative::Window(acc)) => Ok(Cumulative::Window(acc)),
            (part, cumulative) => Err(merge_mismatch(self.name(), WINDOW, &part, &cumulative)),
        }
    }

    fn cumulate_remove(
        &self,
        _item: &Item,
        cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        Ok(cumulative)
    }

    fn compute_final(
        &self,
        cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Value, InternalError> {
        let name = self.name();
        let record = match cumulative {
            Cumulative::Absent => return Ok(self.default_value()),
            Cumulative::Window(record) => record,
            other => {
                return Err(InternalError::aggregate_shape_mismatch(
                    name,
                    WINDOW,
                    other.shape(),
                ));
            }
        };

        let result = match self.kind {
            AggregateKind::PercentRank => percent_rank(record),
            AggregateKind::CumeDist => record.part.checked_div(record.nrows).ok_or_else(|| {
                InternalError::malformed_attachment(name, "'nrows' must be non-zero")
            })?,
            _ => record.part,
        };

        Ok(Value::Number(result))
    }
}

// (part - 1) / (nrows - 1), or 0 for a single-row partition.
fn percent_rank(record: WindowRecord) -> Number {
    if record.nrows <= Number::ONE {
        return Number::ZERO;
    }

    let rank = record.part.to_f64() - 1.0;
    let span = record.nrows.to_f64() - 1.0;

    Number::from_f64(rank / span).unwrap_or(Number::ZERO)
}
