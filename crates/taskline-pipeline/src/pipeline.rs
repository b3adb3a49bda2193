//! The pipeline orchestrator.

use std::sync::Arc;

use chrono::Local;
use taskline_config::{PipelineSettings, TaskDescriptor, load_tasks};
use taskline_db::{Connector, Session};
use taskline_executor::{ExecutorRegistry, TaskExecutionError};
use taskline_notify::{LogNotifier, Notifier};
use taskline_report::{CsvSummaryLog, Reporter, TaskOutcome};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::alert::{self, AlertMessage};
use crate::error::PipelineError;
use crate::report::{RunReport, RunStatus};
use crate::state::{RunRecord, RunState};

/// Runs the task table described by a [`PipelineSettings`].
///
/// By default outcomes go to the CSV summary log named in the settings,
/// alerts go to the log, and tasks are dispatched to the SQL and process
/// executors configured from the settings.
pub struct Pipeline {
  settings: PipelineSettings,
  connector: Arc<dyn Connector>,
  executors: ExecutorRegistry,
  reporter: Arc<dyn Reporter>,
  notifier: Arc<dyn Notifier>,
}

impl Pipeline {
  pub fn new(settings: PipelineSettings, connector: Arc<dyn Connector>) -> Self {
    Self {
      executors: ExecutorRegistry::from_settings(&settings),
      reporter: Arc::new(CsvSummaryLog::new(settings.summary_log.clone())),
      notifier: Arc::new(LogNotifier),
      settings,
      connector,
    }
  }

  pub fn with_executors(mut self, executors: ExecutorRegistry) -> Self {
    self.executors = executors;
    self
  }

  pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
    self.reporter = reporter;
    self
  }

  pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
    self.notifier = notifier;
    self
  }

  /// Execute one run under a fresh run id.
  pub async fn run(&self) -> RunReport {
    self.run_with_id(Uuid::new_v4()).await
  }

  /// Execute one run.
  ///
  /// Never returns an error: setup and task failures are logged, alerted
  /// and described in the returned report.
  #[instrument(name = "pipeline_run", skip_all, fields(run_id = %run_id))]
  pub async fn run_with_id(&self, run_id: Uuid) -> RunReport {
    info!(tasks_file = %self.settings.tasks_file.display(), "starting pipeline run");

    let mut record = RunRecord::new(run_id);
    let mut report = RunReport::new(run_id);

    let tasks = match load_tasks(&self.settings.tasks_file) {
      Ok(tasks) => tasks,
      Err(e) => {
        let error = PipelineError::from(e);
        error!(error = %error, "failed to load task table");
        let message = match &error {
          PipelineError::ConfigNotFound { path } => alert::config_missing(run_id, path),
          other => alert::config_invalid(run_id, other),
        };
        self.send_alert(message).await;
        record.failed = true;
        record.advance(RunState::Closed);
        report.fail(error);
        return self.finish(&record, report);
      }
    };
    info!(tasks = tasks.len(), "loaded task table");

    record.advance(RunState::Connecting);
    let mut session = match self.connector.connect().await {
      Ok(session) => session,
      Err(e) => {
        let error = PipelineError::ConnectionFailure(e);
        error!(error = %error, "database connection failed");
        self.send_alert(alert::connection_failed(run_id, &error)).await;
        record.failed = true;
        record.advance(RunState::Closed);
        report.fail(error);
        return self.finish(&record, report);
      }
    };

    record.advance(RunState::Running);
    for (position, task) in tasks.iter().enumerate() {
      if !task.enabled {
        info!(task = %task.name, "skipping disabled task");
        report.tasks_skipped.push(task.name.clone());
        continue;
      }

      match self.run_task(run_id, session.as_mut(), task).await {
        Ok(()) => report.tasks_succeeded.push(task.name.clone()),
        Err(error) => {
          record.failed = true;
          report.not_run = tasks[position + 1..]
            .iter()
            .filter(|t| t.enabled)
            .map(|t| t.name.clone())
            .collect();
          if !report.not_run.is_empty() {
            warn!(tasks = ?report.not_run, "pipeline stopped, remaining tasks were not run");
          }
          report.fail(error);
          break;
        }
      }
    }

    if record.failed {
      record.advance(RunState::Aborting);
      warn!("rolling back uncommitted work due to failure");
      if let Err(e) = session.rollback().await {
        error!(error = %e, "rollback failed");
      }
    } else {
      record.advance(RunState::Committing);
    }

    if let Err(e) = session.close().await {
      warn!(error = %e, "failed to close database session");
    }
    record.advance(RunState::Closed);

    self.finish(&record, report)
  }

  /// Run one enabled task and commit its work.
  ///
  /// The outcome is recorded and alerted here; the caller only decides
  /// whether the run continues.
  #[instrument(
    name = "task",
    skip_all,
    fields(task = %task.name, task_type = %task.type_name, order = task.order)
  )]
  async fn run_task(
    &self,
    run_id: Uuid,
    session: &mut dyn Session,
    task: &TaskDescriptor,
  ) -> Result<(), PipelineError> {
    let script = task.resolve_script(self.settings.script_dir.as_deref());
    info!(script = %script.display(), "task started");

    let start_time = Local::now();
    let executed = match task.task_type {
      Some(task_type) => {
        self
          .executors
          .dispatch(task_type, &mut *session, &script)
          .await
      }
      None => Err(TaskExecutionError::UnrecognisedTaskType {
        value: task.type_name.clone(),
      }),
    };
    let end_time = Local::now();

    let result = match executed {
      Ok(_) => session
        .commit()
        .await
        .map_err(|source| PipelineError::CommitFailure {
          task_name: task.name.clone(),
          source,
        }),
      Err(source) => Err(PipelineError::TaskExecutionFailure {
        task_name: task.name.clone(),
        source,
      }),
    };

    match result {
      Ok(()) => {
        let outcome = TaskOutcome::success(run_id, &task.name, start_time, end_time);
        let seconds = outcome.duration_seconds();
        info!(duration_seconds = seconds, "task succeeded");
        self.record_outcome(&outcome);
        if self.settings.notify.on_success {
          self
            .send_alert(alert::task_succeeded(run_id, &task.name, seconds))
            .await;
        }
        Ok(())
      }
      Err(error) => {
        error!(error = %error, "task failed");
        let outcome = TaskOutcome::failure(
          run_id,
          &task.name,
          start_time,
          end_time,
          alert::failure_detail(&error),
        );
        self.record_outcome(&outcome);
        self
          .send_alert(alert::task_failed(run_id, &task.name, &error))
          .await;
        Err(error)
      }
    }
  }

  fn record_outcome(&self, outcome: &TaskOutcome) {
    if let Err(e) = self.reporter.append(outcome) {
      let error = PipelineError::from(e);
      error!(task = %outcome.task_name, error = %error, "failed to write summary row");
    }
  }

  async fn send_alert(&self, message: AlertMessage) {
    if let Err(e) = self
      .notifier
      .send_alert(&message.subject, &message.body)
      .await
    {
      warn!(subject = %message.subject, error = %e, "failed to send alert");
    }
  }

  fn finish(&self, record: &RunRecord, report: RunReport) -> RunReport {
    debug_assert!(record.state().is_terminal());
    match report.status {
      RunStatus::Succeeded => info!("Pipeline run {} {}", record.run_id, report.status),
      RunStatus::Failed => error!("Pipeline run {} {}", record.run_id, report.status),
    }
    report
  }
}
