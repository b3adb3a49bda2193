use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of an attempted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
  Success,
  Failure,
}

impl fmt::Display for TaskStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TaskStatus::Success => f.write_str("SUCCESS"),
      TaskStatus::Failure => f.write_str("FAILURE"),
    }
  }
}

/// The result of one attempted task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
  pub run_id: Uuid,
  pub task_name: String,
  pub start_time: DateTime<Local>,
  pub end_time: DateTime<Local>,
  pub status: TaskStatus,
  /// Present iff `status` is [`TaskStatus::Failure`].
  pub error_message: Option<String>,
}

impl TaskOutcome {
  pub fn success(
    run_id: Uuid,
    task_name: impl Into<String>,
    start_time: DateTime<Local>,
    end_time: DateTime<Local>,
  ) -> Self {
    Self {
      run_id,
      task_name: task_name.into(),
      start_time,
      end_time,
      status: TaskStatus::Success,
      error_message: None,
    }
  }

  pub fn failure(
    run_id: Uuid,
    task_name: impl Into<String>,
    start_time: DateTime<Local>,
    end_time: DateTime<Local>,
    error_message: impl Into<String>,
  ) -> Self {
    Self {
      run_id,
      task_name: task_name.into(),
      start_time,
      end_time,
      status: TaskStatus::Failure,
      error_message: Some(error_message.into()),
    }
  }

  /// Elapsed seconds between start and end.
  pub fn duration_seconds(&self) -> f64 {
    (self.end_time - self.start_time).num_microseconds().unwrap_or(0) as f64 / 1_000_000.0
  }
}
