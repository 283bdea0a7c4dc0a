use crate::{
    aggregate::{
        base::AggregateBase,
        cumulative::Cumulative,
        kind::AggregateKind,
        protocol::{Aggregate, merge_mismatch},
        window::attachment::{WindowRecord, integral_field, read_attachment},
    },
    context::EvalContext,
    error::InternalError,
    row::Item,
    value::Value,
};

const NTILE: &str = "ntile state";

///
/// NtileState
///
/// Bucket bookkeeping for one partition. `max_row` is the first row index
/// of the next bucket; the first `nrows % buckets` buckets get one extra row.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NtileState {
    pub buckets: i64,
    pub nrows: i64,
    pub bucket: i64,
    pub max_row: i64,
}

impl NtileState {
    #[must_use]
    pub const fn new(buckets: i64, nrows: i64) -> Self {
        Self {
            buckets,
            nrows,
            bucket: 0,
            max_row: 0,
        }
    }

    /// Advance to `row`, opening the next bucket when `row` starts it.
    pub const fn advance(&mut self, row: i64) {
        if row != self.max_row {
            return;
        }

        self.max_row += self.nrows / self.buckets;
        if self.bucket < self.nrows % self.buckets {
            self.max_row += 1;
        }
        self.bucket += 1;
    }
}

///
/// Ntile
///
/// NTILE(n): the attachment `part` is the 0-based row index within the
/// partition. Row 0 (re)starts the state by evaluating `n` against that row.
///

#[derive(Clone, Debug)]
pub struct Ntile {
    base: AggregateBase,
}

impl Ntile {
    #[must_use]
    pub const fn new(base: AggregateBase) -> Self {
        Self { base }
    }

    // Evaluate the bucket count; `None` when the operand is not a number.
    fn buckets(&self, item: &Item, ctx: &EvalContext) -> Result<Option<i64>, InternalError> {
        let name = self.name();
        let Some(operand) = self.base.operands().first() else {
            return Err(InternalError::operand_arity(name, 1, 1, 0));
        };

        let value = operand.evaluate(item.value(), ctx)?;
        let Some(n) = value.as_number() else {
            return Ok(None);
        };

        match n.to_i64_exact() {
            Some(buckets) if buckets > 0 => Ok(Some(buckets)),
            _ => Err(InternalError::invalid_argument(
                name,
                format!("bucket count must be a positive integer, found {n}"),
            )),
        }
    }
}

impl Aggregate for Ntile {
    fn kind(&self) -> AggregateKind {
        AggregateKind::Ntile
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
        let record = read_attachment(name, item)?
            .ok_or_else(|| InternalError::malformed_attachment(name, "attachment is null"))?;
        let row = integral_field(name, WindowRecord::PART, record.part)?;

        let mut state = if row == 0 {
            let Some(buckets) = self.buckets(item, ctx)? else {
                return Ok(Cumulative::Absent);
            };
            let nrows = integral_field(name, WindowRecord::NROWS, record.nrows)?;

            NtileState::new(buckets, nrows)
        } else {
            match cumulative {
                // non-numeric bucket count: the partition stays NULL
                Cumulative::Absent => return Ok(Cumulative::Absent),
                Cumulative::Ntile(state) => state,
                other => {
                    return Err(InternalError::aggregate_shape_mismatch(
                        name,
                        NTILE,
                        other.shape(),
                    ));
                }
            }
        };

        state.advance(row);

        Ok(Cumulative::Ntile(state))
    }

    fn cumulate_intermediate(
        &self,
        part: Cumulative,
        cumulative: Cumulative,
        _ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError> {
        match (part, cumulative) {
            (Cumulative::Absent, other) | (other, Cumulative::Absent) => Ok(other),
            (Cumulative::Ntile(_), Cumulative::Ntile(state)) => Ok(Cumulative::Ntile(state)),
            (part, cumulative) => Err(merge_mismatch(self.name(), NTILE, &part, &cumulative)),
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
        match cumulative {
            Cumulative::Absent => Ok(self.default_value()),
            Cumulative::Ntile(state) if state.bucket == 0 => Ok(self.default_value()),
            Cumulative::Ntile(state) => Ok(Value::from(state.bucket)),
            other => Err(InternalError::aggregate_shape_mismatch(
                self.name(),
                NTILE,
                other.shape(),
            )),
        }
    }
}

///
/// TESTS
///
