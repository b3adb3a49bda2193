//! The reporting port.

use std::sync::Mutex;

use crate::error::ReportError;
use crate::types::TaskOutcome;

/// Receives the outcome of every attempted task, in execution order.
pub trait Reporter: Send + Sync {
  fn append(&self, outcome: &TaskOutcome) -> Result<(), ReportError>;
}

/// Keeps outcomes in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
  outcomes: Mutex<Vec<TaskOutcome>>,
}

impl MemoryReporter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot of the outcomes appended so far.
  pub fn outcomes(&self) -> Vec<TaskOutcome> {
    self
      .outcomes
      .lock()
      .map(|outcomes| outcomes.clone())
      .unwrap_or_default()
  }
}

impl Reporter for MemoryReporter {
  fn append(&self, outcome: &TaskOutcome) -> Result<(), ReportError> {
    let mut outcomes = self.outcomes.lock().map_err(|_| ReportError::Poisoned)?;
    outcomes.push(outcome.clone());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Local;
  use uuid::Uuid;

  #[test]
  fn test_memory_reporter_keeps_order() {
    let reporter = MemoryReporter::new();
    let run_id = Uuid::new_v4();
    let now = Local::now();

    reporter
      .append(&TaskOutcome::success(run_id, "first", now, now))
      .unwrap();
    reporter
      .append(&TaskOutcome::failure(run_id, "second", now, now, "boom"))
      .unwrap();

    let names: Vec<_> = reporter
      .outcomes()
      .into_iter()
      .map(|o| o.task_name)
      .collect();
    assert_eq!(names, ["first", "second"]);
  }
}
