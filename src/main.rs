mod logging;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use taskline_config::{PipelineSettings, load_tasks};
use taskline_db::{Connector, SqlxConnector};
use taskline_notify::{LogNotifier, Notifier, WebhookNotifier};
use taskline_pipeline::Pipeline;

use crate::settings::SettingsArgs;

/// Exit status for an invalid command line or unusable settings.
const EXIT_USAGE: u8 = 2;

/// Taskline - run an ordered pipeline of SQL and process tasks
#[derive(Parser)]
#[command(name = "taskline")]
#[command(version, about, long_about = None)]
struct Cli {
  #[command(flatten)]
  settings: SettingsArgs,

  /// Log level used when RUST_LOG is not set
  #[arg(long, global = true, env = "TASKLINE_LOG_LEVEL", default_value = "info")]
  log_level: String,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the pipeline once
  Run,

  /// Validate the task table, scripts and database connection without
  /// running anything
  Check {
    /// Skip the database connection test
    #[arg(long)]
    offline: bool,
  },

  /// Write every row of a database table to a CSV file
  Export {
    /// Table to export, optionally schema-qualified
    table: String,

    /// CSV file to write [default: <table>.csv]
    #[arg(long, short)]
    output: Option<PathBuf>,
  },
}

fn main() -> ExitCode {
  dotenvy::dotenv().ok();
  let cli = Cli::parse();

  let settings = match cli.settings.resolve() {
    Ok(settings) => settings,
    Err(e) => {
      eprintln!("error: {e:#}");
      return ExitCode::from(EXIT_USAGE);
    }
  };

  let result = match cli.command {
    Commands::Run => logging::init(&cli.log_level, &settings.verbose_log)
      .and_then(|()| block_on(run(settings))),
    Commands::Check { offline } => block_on(check(settings, offline)),
    Commands::Export { table, output } => block_on(export(settings, table, output)),
  };

  match result {
    Ok(true) => ExitCode::SUCCESS,
    Ok(false) => ExitCode::FAILURE,
    Err(e) => {
      eprintln!("error: {e:#}");
      ExitCode::from(EXIT_USAGE)
    }
  }
}

fn block_on<F: std::future::Future<Output = Result<bool>>>(future: F) -> Result<bool> {
  let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
  rt.block_on(future)
}

/// Run the pipeline. Returns whether the run succeeded.
async fn run(settings: PipelineSettings) -> Result<bool> {
  let connector = Arc::new(SqlxConnector::new(settings.database.url.clone()));
  let notifier = notifier(&settings)?;

  let report = Pipeline::new(settings, connector)
    .with_notifier(notifier)
    .run()
    .await;

  Ok(report.is_success())
}

fn notifier(settings: &PipelineSettings) -> Result<Arc<dyn Notifier>> {
  match &settings.notify.webhook_url {
    Some(url) => {
      tracing::info!(url = %url, "sending alerts to webhook");
      let webhook = WebhookNotifier::new(url.clone()).context("failed to create webhook client")?;
      Ok(Arc::new(webhook))
    }
    None => Ok(Arc::new(LogNotifier)),
  }
}

/// Report on the task table, its scripts and (unless `offline`) the
/// database connection. Returns whether everything checked out.
async fn check(settings: PipelineSettings, offline: bool) -> Result<bool> {
  let mut ok = true;

  println!("Task table: {}", settings.tasks_file.display());
  let tasks = match load_tasks(&settings.tasks_file) {
    Ok(tasks) => tasks,
    Err(e) => {
      println!("  FAIL {e}");
      return Ok(false);
    }
  };
  let enabled = tasks.iter().filter(|t| t.enabled).count();
  println!("  ok   {} tasks, {} enabled", tasks.len(), enabled);

  println!("Scripts:");
  for task in &tasks {
    let script = task.resolve_script(settings.script_dir.as_deref());
    let state = if !task.enabled {
      "skip"
    } else if script.is_file() {
      "ok  "
    } else {
      ok = false;
      "FAIL"
    };
    println!(
      "  {state} [{}] {} ({}) {}",
      task.order,
      task.name,
      task.type_name,
      script.display()
    );
  }

  if offline {
    println!("Database: not checked (--offline)");
    return Ok(ok);
  }

  println!("Database:");
  let connector = SqlxConnector::new(settings.database.url.clone());
  match connector.connect().await {
    Ok(session) => match session.close().await {
      Ok(()) => println!("  ok   connected"),
      Err(e) => {
        println!("  FAIL connected, but closing the session failed: {e}");
        ok = false;
      }
    },
    Err(e) => {
      println!("  FAIL {e}");
      ok = false;
    }
  }

  Ok(ok)
}

/// Export `table` to CSV. The file is only written once the whole table has
/// been read. Returns whether the export succeeded.
async fn export(settings: PipelineSettings, table: String, output: Option<PathBuf>) -> Result<bool> {
  let output = output.unwrap_or_else(|| PathBuf::from(format!("{table}.csv")));
  let connector = SqlxConnector::new(settings.database.url.clone());

  let mut csv = Vec::new();
  let rows = match connector.export(&table, &mut csv).await {
    Ok(rows) => rows,
    Err(e) => {
      eprintln!("error: failed to export {table}: {e}");
      return Ok(false);
    }
  };

  if let Err(e) = std::fs::write(&output, csv) {
    eprintln!("error: failed to write {}: {e}", output.display());
    return Ok(false);
  }
  println!("CSV saved to {} ({rows} rows)", output.display());
  Ok(true)
}
