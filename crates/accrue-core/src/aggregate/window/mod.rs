//! Module: aggregate::window
//! Responsibility: window-only aggregates. Ranking and NTILE fold per-row
//! attachments; LAG, LEAD and NTH_VALUE read operands from frame rows.
//! Does not own: partitioning, ordering, frame bounds or peer detection (the
//! executor computes those and attaches `{part, nrows}` to each row).
//! Boundary: rows reach these aggregates in partition or visiting order.

mod attachment;
mod ntile;
mod offset;
mod rank;

pub use attachment::WindowRecord;
pub use ntile::{Ntile, NtileState};
pub use offset::{Offset, OffsetState};
pub use rank::Ranking;
