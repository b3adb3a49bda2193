//! Taskline DB
//!
//! The database session boundary used by the pipeline. The orchestrator only
//! sees the [`Connector`] and [`Session`] traits; [`SqlxConnector`] is the
//! production implementation on top of sqlx's `Any` driver. [`export_table`]
//! dumps a table to CSV over the same driver.

mod error;
mod export;
mod session;
mod sqlx_session;

pub use error::{EngineError, ExportError, SessionError};
pub use export::export_table;
pub use session::{Connector, Session};
pub use sqlx_session::{SqlxConnector, SqlxSession};
