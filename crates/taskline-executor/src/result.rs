//! Task execution result.

/// What a successful task produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutput {
  /// A SQL script finished; `statements` were submitted.
  Sql { statements: usize },
  /// A process exited with status 0.
  Process { stdout: String, stderr: String },
}
