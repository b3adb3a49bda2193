use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stdout and to the verbose log file.
///
/// Uses the `RUST_LOG` env var if set, otherwise falls back to `log_level`.
/// The verbose log is appended to across runs.
pub fn init(log_level: &str, verbose_log: &Path) -> Result<()> {
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(verbose_log)
    .with_context(|| format!("failed to open verbose log: {}", verbose_log.display()))?;

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_target(false))
    .with(
      fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file)),
    )
    .try_init()
    .context("failed to initialize logging")?;

  Ok(())
}
