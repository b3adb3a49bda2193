//! SQL script executor.

use std::path::Path;

use async_trait::async_trait;
use taskline_db::Session;
use tracing::{debug, error, info, instrument};

use crate::error::TaskExecutionError;
use crate::executor::TaskExecutor;
use crate::result::TaskOutput;
use crate::script::split_statements;

/// Longest statement prefix written to the log.
const LOG_PREVIEW_CHARS: usize = 200;

/// Runs the statements of a SQL script one by one against the session.
#[derive(Debug, Clone)]
pub struct StatementExecutor {
  separator: String,
}

impl StatementExecutor {
  /// Create an executor splitting scripts on `separator`.
  pub fn new(separator: impl Into<String>) -> Self {
    Self {
      separator: separator.into(),
    }
  }

  /// Read `script` and execute its statements in order.
  ///
  /// The first failing statement aborts the script.
  #[instrument(name = "sql_script", skip(self, session, script), fields(script = %script.display()))]
  pub async fn run_script(
    &self,
    session: &mut dyn Session,
    script: &Path,
  ) -> Result<TaskOutput, TaskExecutionError> {
    info!("executing SQL script");

    let text = tokio::fs::read_to_string(script)
      .await
      .map_err(|source| TaskExecutionError::ScriptRead {
        path: script.to_path_buf(),
        source,
      })?;

    let statements = split_statements(&text, &self.separator);

    for (position, statement) in statements.iter().enumerate() {
      let index = position + 1;
      debug!(
        index,
        procedural = statement.procedural,
        sql = %preview(&statement.sql),
        "executing statement"
      );

      match session.execute(&statement.sql).await {
        Ok(rows) => debug!(index, rows, "statement executed"),
        Err(e) => {
          match e.engine() {
            Some(engine) => error!(
              index,
              code = engine.code.as_deref().unwrap_or("-"),
              message = %engine.message,
              offset = ?engine.offset,
              "database error in script"
            ),
            None => error!(index, error = %e, "unexpected error in script"),
          }
          return Err(TaskExecutionError::Statement {
            path: script.to_path_buf(),
            index,
            source: e,
          });
        }
      }
    }

    info!(statements = statements.len(), "finished SQL script");

    Ok(TaskOutput::Sql {
      statements: statements.len(),
    })
  }
}

#[async_trait]
impl TaskExecutor for StatementExecutor {
  async fn execute(
    &self,
    session: &mut dyn Session,
    script: &Path,
  ) -> Result<TaskOutput, TaskExecutionError> {
    self.run_script(session, script).await
  }
}

fn preview(sql: &str) -> String {
  match sql.char_indices().nth(LOG_PREVIEW_CHARS) {
    Some((end, _)) => format!("{}...", &sql[..end]),
    None => sql.to_string(),
  }
}
