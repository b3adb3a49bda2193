//! Task execution for taskline pipelines.
//!
//! This crate provides the executors that run a single task's script:
//! - [`StatementExecutor`] splits a SQL script and submits each statement to
//!   the run's database session
//! - [`ProcessExecutor`] runs a script as a child process
//!
//! [`ExecutorRegistry`] maps each task type to its executor so the
//! orchestrator can dispatch without matching on the type itself.

mod error;
mod executor;
mod process;
mod result;
pub mod script;
mod sql;

pub use error::TaskExecutionError;
pub use executor::{ExecutorRegistry, TaskExecutor};
pub use process::ProcessExecutor;
pub use result::TaskOutput;
pub use sql::StatementExecutor;
