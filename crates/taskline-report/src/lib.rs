//! Run reporting for taskline.
//!
//! Every attempted task produces a [`TaskOutcome`] that is handed to a
//! [`Reporter`]. [`CsvSummaryLog`] is the durable one: an append-only CSV
//! file shared by all runs.

mod error;
mod reporter;
mod summary;
mod types;

pub use error::ReportError;
pub use reporter::{MemoryReporter, Reporter};
pub use summary::{CsvSummaryLog, SUMMARY_HEADER, SummaryRow, read_summary};
pub use types::{TaskOutcome, TaskStatus};
