//! External process executor.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use taskline_db::Session;
use tokio::process::Command;
use tracing::{error, info, instrument};

use crate::error::TaskExecutionError;
use crate::executor::TaskExecutor;
use crate::result::TaskOutput;

/// Runs a script as a child process and waits for it to exit.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
  interpreter: Option<PathBuf>,
}

impl ProcessExecutor {
  /// Create an executor launching scripts with `interpreter`, or directly
  /// when `None`.
  pub fn new(interpreter: Option<PathBuf>) -> Self {
    Self { interpreter }
  }

  /// Run `script` to completion, capturing stdout and stderr.
  ///
  /// Output is decoded lossily. A non-zero exit status is an error carrying
  /// both streams.
  #[instrument(name = "process_script", skip(self, script), fields(script = %script.display()))]
  pub async fn run_script(&self, script: &Path) -> Result<TaskOutput, TaskExecutionError> {
    info!(interpreter = ?self.interpreter, "executing process script");

    let (program, mut command) = match &self.interpreter {
      Some(interpreter) => {
        let mut command = Command::new(interpreter);
        command.arg(script);
        (interpreter.clone(), command)
      }
      None => (script.to_path_buf(), Command::new(script)),
    };

    let output = command
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|source| TaskExecutionError::Spawn { program, source })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
      error!(status = %output.status, "process script failed");
      error!("process stdout:\n{}", stdout);
      error!("process stderr:\n{}", stderr);
      return Err(TaskExecutionError::ProcessFailed {
        path: script.to_path_buf(),
        exit_code: output.status.code(),
        stdout,
        stderr,
      });
    }

    info!("finished process script");
    info!("process output:\n{}", stdout);

    Ok(TaskOutput::Process { stdout, stderr })
  }
}

#[async_trait]
impl TaskExecutor for ProcessExecutor {
  async fn execute(
    &self,
    _session: &mut dyn Session,
    script: &Path,
  ) -> Result<TaskOutput, TaskExecutionError> {
    self.run_script(script).await
  }
}
