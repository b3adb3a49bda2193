//! What a run returns to its caller.

use std::fmt;

use uuid::Uuid;

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
  Succeeded,
  Failed,
}

impl fmt::Display for RunStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RunStatus::Succeeded => f.write_str("COMPLETED SUCCESSFULLY"),
      RunStatus::Failed => f.write_str("FAILED"),
    }
  }
}

/// Summary of a finished run.
///
/// Setup failures (missing task table, unreachable database) are reported
/// here rather than returned as errors.
#[derive(Debug)]
pub struct RunReport {
  pub run_id: Uuid,
  pub status: RunStatus,
  /// Tasks that ran and were committed, in execution order.
  pub tasks_succeeded: Vec<String>,
  /// Disabled tasks that were passed over.
  pub tasks_skipped: Vec<String>,
  /// The task that stopped the run.
  pub failed_task: Option<String>,
  /// Tasks after the failed one, never attempted.
  pub not_run: Vec<String>,
  /// Why the run failed.
  pub failure: Option<PipelineError>,
}

impl RunReport {
  pub(crate) fn new(run_id: Uuid) -> Self {
    Self {
      run_id,
      status: RunStatus::Succeeded,
      tasks_succeeded: Vec::new(),
      tasks_skipped: Vec::new(),
      failed_task: None,
      not_run: Vec::new(),
      failure: None,
    }
  }

  pub(crate) fn fail(&mut self, error: PipelineError) {
    self.status = RunStatus::Failed;
    self.failed_task = error.task_name().map(str::to_string);
    self.failure = Some(error);
  }

  pub fn is_success(&self) -> bool {
    self.status == RunStatus::Succeeded
  }
}
