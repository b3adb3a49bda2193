//! Errors raised while loading pipeline configuration.

use std::path::PathBuf;

/// Errors that can occur while loading the task table or settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The task table does not exist.
  #[error("configuration file not found: {}", .path.display())]
  NotFound { path: PathBuf },

  /// The file exists but could not be read or parsed as CSV.
  #[error("failed to read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: csv::Error,
  },

  /// A row is missing a column or has a malformed value.
  #[error("invalid task row at line {line}: {message}")]
  InvalidRow { line: u64, message: String },

  /// A row names a task type that has no counterpart in [`crate::TaskType`].
  #[error("unknown task type '{value}' for task '{task_name}' (line {line})")]
  UnknownTaskType {
    task_name: String,
    value: String,
    line: u64,
  },

  /// The settings file could not be read.
  #[error("failed to read settings {}: {source}", .path.display())]
  SettingsIo {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The settings file is not valid JSON for [`crate::PipelineSettings`].
  #[error("invalid settings {}: {source}", .path.display())]
  SettingsParse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}
