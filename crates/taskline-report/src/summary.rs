//! CSV summary log.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReportError;
use crate::reporter::Reporter;
use crate::types::{TaskOutcome, TaskStatus};

/// Column names of the summary log, in file order.
pub const SUMMARY_HEADER: [&str; 7] = [
  "run_id",
  "task_name",
  "start_time",
  "end_time",
  "duration_seconds",
  "status",
  "error_message",
];

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// A row read back from the summary log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryRow {
  pub run_id: String,
  pub task_name: String,
  pub start_time: String,
  pub end_time: String,
  pub duration_seconds: f64,
  pub status: TaskStatus,
  pub error_message: String,
}

#[derive(Serialize)]
struct SummaryRecord<'a> {
  run_id: String,
  task_name: &'a str,
  start_time: String,
  end_time: String,
  duration_seconds: String,
  status: TaskStatus,
  error_message: String,
}

impl<'a> From<&'a TaskOutcome> for SummaryRecord<'a> {
  fn from(outcome: &'a TaskOutcome) -> Self {
    Self {
      run_id: outcome.run_id.to_string(),
      task_name: &outcome.task_name,
      start_time: format_time(&outcome.start_time),
      end_time: format_time(&outcome.end_time),
      duration_seconds: format!("{:.2}", outcome.duration_seconds()),
      status: outcome.status,
      error_message: outcome
        .error_message
        .as_deref()
        .map(flatten_message)
        .unwrap_or_default(),
    }
  }
}

/// Appends one row per task outcome to a CSV file.
///
/// The header is written when the file is new or empty. Rows from every run
/// accumulate in the same file. Appends are not synchronised across
/// processes, so concurrent runs sharing one summary file are unsupported.
#[derive(Debug, Clone)]
pub struct CsvSummaryLog {
  path: PathBuf,
}

impl CsvSummaryLog {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn write_row(&self, outcome: &TaskOutcome) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
      path: self.path.clone(),
      source,
    };
    let csv_err = |source| ReportError::Csv {
      path: self.path.clone(),
      source,
    };

    let file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(&self.path)
      .map_err(io_err)?;
    let needs_header = file.metadata().map_err(io_err)?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
      .has_headers(false)
      .from_writer(file);

    if needs_header {
      debug!(path = %self.path.display(), "writing summary header");
      writer.write_record(SUMMARY_HEADER).map_err(csv_err)?;
    }
    writer
      .serialize(SummaryRecord::from(outcome))
      .map_err(csv_err)?;
    writer.flush().map_err(io_err)?;
    Ok(())
  }
}

impl Reporter for CsvSummaryLog {
  fn append(&self, outcome: &TaskOutcome) -> Result<(), ReportError> {
    self.write_row(outcome)
  }
}

/// Read every row of a summary log in file order.
pub fn read_summary(path: impl AsRef<Path>) -> Result<Vec<SummaryRow>, ReportError> {
  let path = path.as_ref();
  let mut reader = csv::Reader::from_path(path).map_err(|source| ReportError::Csv {
    path: path.to_path_buf(),
    source,
  })?;

  reader
    .deserialize()
    .collect::<Result<Vec<SummaryRow>, _>>()
    .map_err(|source| ReportError::Csv {
      path: path.to_path_buf(),
      source,
    })
}

fn format_time(time: &DateTime<Local>) -> String {
  time.format(TIME_FORMAT).to_string()
}

/// Keep error messages on one line: newlines become spaces, carriage
/// returns are dropped.
fn flatten_message(message: &str) -> String {
  message.replace('\n', " ").replace('\r', "")
}
