use std::path::PathBuf;

use taskline_config::ConfigError;
use taskline_db::SessionError;
use taskline_executor::TaskExecutionError;
use taskline_report::ReportError;

/// Errors that end a pipeline run, or that the run logs and moves past.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
  /// The task table does not exist. No connection is attempted.
  #[error("configuration file not found: {}", .path.display())]
  ConfigNotFound { path: PathBuf },

  /// The task table exists but could not be loaded.
  #[error("invalid configuration: {0}")]
  InvalidConfig(#[source] ConfigError),

  #[error("database connection failed: {0}")]
  ConnectionFailure(#[source] SessionError),

  /// A task failed. Later tasks were not run.
  #[error("task '{task_name}' failed: {source}")]
  TaskExecutionFailure {
    task_name: String,
    #[source]
    source: TaskExecutionError,
  },

  /// A task ran but its work could not be committed.
  #[error("task '{task_name}' failed to commit: {source}")]
  CommitFailure {
    task_name: String,
    #[source]
    source: SessionError,
  },

  /// An outcome could not be recorded. Never fails the run.
  #[error("failed to record outcome: {0}")]
  ReportingFailure(#[from] ReportError),
}

impl From<ConfigError> for PipelineError {
  fn from(err: ConfigError) -> Self {
    match err {
      ConfigError::NotFound { path } => PipelineError::ConfigNotFound { path },
      other => PipelineError::InvalidConfig(other),
    }
  }
}

impl PipelineError {
  /// Name of the task this error belongs to, if any.
  pub fn task_name(&self) -> Option<&str> {
    match self {
      PipelineError::TaskExecutionFailure { task_name, .. }
      | PipelineError::CommitFailure { task_name, .. } => Some(task_name),
      _ => None,
    }
  }
}
