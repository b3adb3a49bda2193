//! Operator alert subjects and bodies.

use std::path::Path;

use uuid::Uuid;

use crate::error::PipelineError;

pub(crate) struct AlertMessage {
  pub subject: String,
  pub body: String,
}

pub(crate) fn config_missing(run_id: Uuid, path: &Path) -> AlertMessage {
  AlertMessage {
    subject: "CRITICAL: Pipeline Configuration File Missing".to_string(),
    body: format!(
      "Run ID: {run_id}\n\nConfiguration file not found: {}",
      path.display()
    ),
  }
}

pub(crate) fn config_invalid(run_id: Uuid, error: &PipelineError) -> AlertMessage {
  AlertMessage {
    subject: "CRITICAL: Pipeline Configuration Invalid".to_string(),
    body: format!("Run ID: {run_id}\n\nThe task table could not be loaded.\n\nError:\n{error}"),
  }
}

pub(crate) fn connection_failed(run_id: Uuid, error: &PipelineError) -> AlertMessage {
  AlertMessage {
    subject: "CRITICAL: Pipeline Database Connection Failure".to_string(),
    body: format!(
      "Run ID: {run_id}\n\nThe pipeline could not connect to the database.\n\nError:\n{error}"
    ),
  }
}

pub(crate) fn task_succeeded(run_id: Uuid, task_name: &str, seconds: f64) -> AlertMessage {
  AlertMessage {
    subject: format!("INFO: Pipeline Step Success: {task_name}"),
    body: format!(
      "Run ID: {run_id}\nTask: {task_name}\nStatus: SUCCESS\n\nTime taken: {seconds:.2}s"
    ),
  }
}

pub(crate) fn task_failed(run_id: Uuid, task_name: &str, error: &PipelineError) -> AlertMessage {
  AlertMessage {
    subject: format!("Pipeline Task Failed: {task_name}"),
    body: format!(
      "Run ID: {run_id}\nTask: {task_name}\nStatus: FAILURE\n\nError Details:\n{}",
      failure_detail(error)
    ),
  }
}

/// The underlying cause, without the task name prefix the subject already
/// carries.
pub(crate) fn failure_detail(error: &PipelineError) -> String {
  match error {
    PipelineError::TaskExecutionFailure { source, .. } => source.to_string(),
    PipelineError::CommitFailure { source, .. } => format!("commit failed: {source}"),
    other => other.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_success_body() {
    let run_id = Uuid::nil();
    let alert = task_succeeded(run_id, "load_sales", 3.14159);
    assert_eq!(alert.subject, "INFO: Pipeline Step Success: load_sales");
    assert_eq!(
      alert.body,
      format!("Run ID: {run_id}\nTask: load_sales\nStatus: SUCCESS\n\nTime taken: 3.14s")
    );
  }

  #[test]
  fn test_config_missing_names_path() {
    let alert = config_missing(Uuid::nil(), Path::new("conf/tasks.csv"));
    assert_eq!(alert.subject, "CRITICAL: Pipeline Configuration File Missing");
    assert!(alert.body.ends_with("Configuration file not found: conf/tasks.csv"));
  }
}
