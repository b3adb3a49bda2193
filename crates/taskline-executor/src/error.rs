//! Task execution errors.

use std::path::PathBuf;

use taskline_config::TaskType;
use taskline_db::SessionError;

/// Errors that can occur while executing a single task.
#[derive(Debug, thiserror::Error)]
pub enum TaskExecutionError {
  /// The script file could not be read.
  #[error("failed to read script {}: {source}", .path.display())]
  ScriptRead {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A statement was rejected. Remaining statements were not run.
  #[error("statement {index} of {} failed: {source}", .path.display())]
  Statement {
    path: PathBuf,
    /// 1-based position of the statement in the script.
    index: usize,
    #[source]
    source: SessionError,
  },

  /// The child process could not be started.
  #[error("failed to start {}: {source}", .program.display())]
  Spawn {
    program: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The child process exited unsuccessfully.
  #[error("{} exited with {}{}", .path.display(), describe_exit(.exit_code), stderr_suffix(.stderr))]
  ProcessFailed {
    path: PathBuf,
    /// `None` when the process was terminated by a signal.
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
  },

  /// No executor is registered for the task's type.
  #[error("unknown task type '{task_type}': no executor registered")]
  UnknownTaskType { task_type: TaskType },

  /// The task table names a type that no executor understands.
  #[error("unrecognised task type '{value}'")]
  UnrecognisedTaskType { value: String },
}

fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit status {}", code),
    None => "termination by signal".to_string(),
  }
}

fn stderr_suffix(stderr: &str) -> String {
  let stderr = stderr.trim();
  if stderr.is_empty() {
    String::new()
  } else {
    format!(": {}", stderr)
  }
}
