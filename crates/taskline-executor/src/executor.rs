//! The executor trait and the task type dispatch table.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use taskline_config::{PipelineSettings, TaskType};
use taskline_db::Session;

use crate::error::TaskExecutionError;
use crate::process::ProcessExecutor;
use crate::result::TaskOutput;
use crate::sql::StatementExecutor;

/// Runs the script of one task.
///
/// Executors receive the run's session even when they do not use it, so the
/// orchestrator can dispatch every task type the same way.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
  async fn execute(
    &self,
    session: &mut dyn Session,
    script: &Path,
  ) -> Result<TaskOutput, TaskExecutionError>;
}

/// Maps each [`TaskType`] to its executor.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
  executors: HashMap<TaskType, Arc<dyn TaskExecutor>>,
}

impl ExecutorRegistry {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a registry with the SQL and process executors configured from
  /// `settings`.
  pub fn from_settings(settings: &PipelineSettings) -> Self {
    let mut registry = Self::new();
    registry.register(
      TaskType::Sql,
      StatementExecutor::new(settings.sql.separator.clone()),
    );
    registry.register(
      TaskType::Process,
      ProcessExecutor::new(settings.process.interpreter.clone()),
    );
    registry
  }

  /// Register (or replace) the executor for a task type.
  pub fn register(&mut self, task_type: TaskType, executor: impl TaskExecutor + 'static) {
    self.executors.insert(task_type, Arc::new(executor));
  }

  /// Get the executor for a task type.
  pub fn get(&self, task_type: TaskType) -> Option<&Arc<dyn TaskExecutor>> {
    self.executors.get(&task_type)
  }

  /// Execute `script` with the executor registered for `task_type`.
  pub async fn dispatch(
    &self,
    task_type: TaskType,
    session: &mut dyn Session,
    script: &Path,
  ) -> Result<TaskOutput, TaskExecutionError> {
    let executor = self
      .get(task_type)
      .ok_or(TaskExecutionError::UnknownTaskType { task_type })?;
    executor.execute(session, script).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use taskline_db::SessionError;

  struct NullSession;

  #[async_trait]
  impl Session for NullSession {
    async fn execute(&mut self, _statement: &str) -> Result<u64, SessionError> {
      Ok(0)
    }
    async fn commit(&mut self) -> Result<(), SessionError> {
      Ok(())
    }
    async fn rollback(&mut self) -> Result<(), SessionError> {
      Ok(())
    }
    async fn close(self: Box<Self>) -> Result<(), SessionError> {
      Ok(())
    }
  }

  struct Fixed;

  #[async_trait]
  impl TaskExecutor for Fixed {
    async fn execute(
      &self,
      _session: &mut dyn Session,
      _script: &Path,
    ) -> Result<TaskOutput, TaskExecutionError> {
      Ok(TaskOutput::Sql { statements: 7 })
    }
  }

  #[tokio::test]
  async fn test_dispatch_uses_registered_executor() {
    let mut registry = ExecutorRegistry::new();
    registry.register(TaskType::Sql, Fixed);

    let output = registry
      .dispatch(TaskType::Sql, &mut NullSession, Path::new("a.sql"))
      .await
      .unwrap();
    assert_eq!(output, TaskOutput::Sql { statements: 7 });
  }

  #[tokio::test]
  async fn test_dispatch_without_executor_is_unknown_task_type() {
    let registry = ExecutorRegistry::new();

    let err = registry
      .dispatch(TaskType::Process, &mut NullSession, Path::new("a.py"))
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      TaskExecutionError::UnknownTaskType {
        task_type: TaskType::Process
      }
    ));
  }

  #[test]
  fn test_from_settings_registers_both_types() {
    let registry = ExecutorRegistry::from_settings(&PipelineSettings::default());
    assert!(registry.get(TaskType::Sql).is_some());
    assert!(registry.get(TaskType::Process).is_some());
  }
}
