use crate::{
    error::InternalError,
    row::Item,
    value::{Number, Value},
};

///
/// WindowRecord
///
/// Per-row window metadata computed by the executor: `part` is the
/// function-specific contribution of the row and `nrows` the partition size.
/// Serialized on the row as `{"part": <number>, "nrows": <number>}`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowRecord {
    pub part: Number,
    pub nrows: Number,
}

impl WindowRecord {
    pub const PART: &'static str = "part";
    pub const NROWS: &'static str = "nrows";

    #[must_use]
    pub const fn new(part: Number, nrows: Number) -> Self {
        Self { part, nrows }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::object([
            (Self::PART, Value::Number(self.part)),
            (Self::NROWS, Value::Number(self.nrows)),
        ])
    }
}

impl From<WindowRecord> for Value {
    fn from(record: WindowRecord) -> Self {
        record.into_value()
    }
}

/// Read and validate the attachment for `aggregate` on one row.
///
/// `Ok(None)` means an explicit NULL attachment; an absent or malformed
/// attachment is an error.
pub(crate) fn read_attachment(
    aggregate: &'static str,
    item: &Item,
) -> Result<Option<WindowRecord>, InternalError> {
    let attachment = item
        .window_attachment(aggregate)
        .ok_or_else(|| InternalError::malformed_attachment(aggregate, "attachment missing"))?;

    match attachment {
        Value::Null => Ok(None),
        Value::Object(_) => {
            let part = number_field(aggregate, attachment, WindowRecord::PART)?;
            let nrows = number_field(aggregate, attachment, WindowRecord::NROWS)?;

            Ok(Some(WindowRecord { part, nrows }))
        }
        other => Err(InternalError::malformed_attachment(
            aggregate,
            format!("expected an object, found {}", other.type_label()),
        )),
    }
}

fn number_field(
    aggregate: &'static str,
    attachment: &Value,
    field: &'static str,
) -> Result<Number, InternalError> {
    let value = attachment.field(field);
    value.as_number().ok_or_else(|| {
        InternalError::malformed_attachment(
            aggregate,
            format!("'{field}' must be a number, found {}", value.type_label()),
        )
    })
}

/// Exact non-negative integer view of an attachment field.
pub(crate) fn integral_field(
    aggregate: &'static str,
    field: &'static str,
    n: Number,
) -> Result<i64, InternalError> {
    n.to_i64_exact().filter(|i| *i >= 0).ok_or_else(|| {
        InternalError::malformed_attachment(
            aggregate,
            format!("'{field}' must be a non-negative integer, found {n}"),
        )
    })
}

///
/// TESTS
///
