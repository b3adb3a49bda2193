//! Session error types.

use std::fmt;

/// A failure reported by the database engine itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
  /// Engine-specific error code (SQLSTATE for Postgres, result code for SQLite).
  pub code: Option<String>,
  pub message: String,
  /// Character offset into the statement, when the engine reports one.
  pub offset: Option<usize>,
}

impl fmt::Display for EngineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.code {
      Some(code) => write!(f, "database error {}: {}", code, self.message)?,
      None => write!(f, "database error: {}", self.message)?,
    }
    if let Some(offset) = self.offset {
      write!(f, " (near offset {})", offset)?;
    }
    Ok(())
  }
}

impl std::error::Error for EngineError {}

/// Errors returned by [`crate::Connector`] and [`crate::Session`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
  /// No connection URL was configured.
  #[error("no database url configured")]
  NotConfigured,

  /// The session could not be established.
  #[error("failed to connect: {source}")]
  Connect {
    #[source]
    source: sqlx::Error,
  },

  /// The engine rejected a statement.
  #[error(transparent)]
  Engine(EngineError),

  /// Any other driver failure (I/O, protocol, pool).
  #[error("database driver error: {0}")]
  Driver(#[source] sqlx::Error),
}

/// Errors returned by [`crate::export_table`].
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
  /// The table name is not a plain or schema-qualified identifier.
  #[error("invalid table name '{0}'")]
  InvalidTable(String),

  #[error(transparent)]
  Session(#[from] SessionError),

  /// A column holds values that cannot be written as text.
  #[error("column '{column}' has an unsupported type")]
  UnsupportedColumn { column: String },

  #[error("failed to write csv: {0}")]
  Csv(#[from] csv::Error),

  #[error("failed to write csv: {0}")]
  Io(#[from] std::io::Error),
}

impl SessionError {
  /// The engine error, if this failure came from the database engine.
  pub fn engine(&self) -> Option<&EngineError> {
    match self {
      SessionError::Engine(e) => Some(e),
      _ => None,
    }
  }
}

impl From<sqlx::Error> for SessionError {
  fn from(err: sqlx::Error) -> Self {
    match err {
      sqlx::Error::Database(db) => {
        let offset = db
          .try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
          .and_then(|pg| pg.position())
          .map(|position| match position {
            sqlx::postgres::PgErrorPosition::Original(offset) => offset,
            sqlx::postgres::PgErrorPosition::Internal { position, .. } => position,
          });

        SessionError::Engine(EngineError {
          code: db.code().map(|code| code.into_owned()),
          message: db.message().to_string(),
          offset,
        })
      }
      other => SessionError::Driver(other),
    }
  }
}
