use crate::{
    aggregate::{base::AggregateBase, cumulative::Cumulative, kind::AggregateKind},
    context::EvalContext,
    error::InternalError,
    row::Item,
    value::Value,
};

///
/// Aggregate
///
/// The five-operation incremental aggregation protocol.
///
/// Accumulators are moved in and returned, so an implementation may reuse
/// the consumed buffer. Every call is synchronous and side-effect free
/// apart from metrics.
///
/// Contract:
/// - `Absent` is the left and right identity of `cumulate_intermediate`.
/// - `cumulate_intermediate` is associative and commutative with respect to
///   `compute_final`.
/// - `cumulate_remove` exactly undoes one `cumulate_initial` of the same row,
///   or fails loudly where no inverse exists.
///

pub trait Aggregate {
    fn kind(&self) -> AggregateKind;

    fn base(&self) -> &AggregateBase;

    /// Result over zero rows.
    fn default_value(&self) -> Value {
        Value::Null
    }

    /// Fold one row into the accumulator.
    fn cumulate_initial(
        &self,
        item: &Item,
        cumulative: Cumulative,
        ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError>;

    /// Merge a partial accumulator built over a disjoint row subset.
    fn cumulate_intermediate(
        &self,
        part: Cumulative,
        cumulative: Cumulative,
        ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError>;

    /// Remove one row's contribution when it leaves a sliding frame.
    fn cumulate_remove(
        &self,
        item: &Item,
        cumulative: Cumulative,
        ctx: &EvalContext,
    ) -> Result<Cumulative, InternalError>;

    /// Seed the accumulator for the frame evaluated at `current`.
    ///
    /// Offset functions read their offset and out-of-range default from the
    /// current row, not from the frame rows. Everything else starts `Absent`.
    fn start_frame(&self, _current: &Item, _ctx: &EvalContext) -> Result<Cumulative, InternalError> {
        Ok(Cumulative::Absent)
    }

    /// Checked after each peer group of frame rows. `true` means no further
    /// row can change the result, so the caller may stop feeding the frame.
    /// May settle state in place (NTH_VALUE closes the current peer group).
    fn is_cumulate_done(
        &self,
        _cumulative: &mut Cumulative,
        _ctx: &EvalContext,
    ) -> Result<bool, InternalError> {
        Ok(false)
    }

    /// Produce the result for a complete group or frame.
    fn compute_final(&self, cumulative: Cumulative, ctx: &EvalContext)
    -> Result<Value, InternalError>;

    #[must_use]
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Fold every row with `cumulate_initial`, then finalize.
    fn fold_rows<'a, I>(&self, rows: I, ctx: &EvalContext) -> Result<Value, InternalError>
    where
        Self: Sized,
        I: IntoIterator<Item = &'a Item>,
    {
        let mut cumulative = Cumulative::Absent;
        for item in rows {
            cumulative = self.cumulate_initial(item, cumulative, ctx)?;
        }

        self.compute_final(cumulative, ctx)
    }
}

/// Shape error for a merge where at least one side has the wrong shape.
pub(crate) fn merge_mismatch(
    aggregate: &'static str,
    expected: &'static str,
    part: &Cumulative,
    cumulative: &Cumulative,
) -> InternalError {
    let found = if part.shape() == expected {
        cumulative.shape()
    } else {
        part.shape()
    };

    InternalError::aggregate_shape_mismatch(aggregate, expected, found)
}
