//! Taskline Pipeline
//!
//! The orchestrator: loads the task table, acquires one database session,
//! runs enabled tasks in order through the executor registry, commits after
//! each successful task and stops at the first failure.
//!
//! Collaborators are injected, so a [`Pipeline`] can be driven entirely by
//! in-memory fakes:
//!
//! ```ignore
//! let report = Pipeline::new(settings, Arc::new(SqlxConnector::new(url)))
//!   .with_notifier(Arc::new(LogNotifier))
//!   .run()
//!   .await;
//! ```

mod alert;
mod error;
mod pipeline;
mod report;
mod state;

pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use report::{RunReport, RunStatus};
pub use state::{RunRecord, RunState};
