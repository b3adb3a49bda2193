use async_trait::async_trait;

use crate::error::SessionError;

/// A live database session with an implicit transaction.
///
/// The first [`Session::execute`] after a commit or rollback opens a new
/// transaction; [`Session::commit`] and [`Session::rollback`] end it.
#[async_trait]
pub trait Session: Send {
  /// Execute a single statement. Returns the number of affected rows.
  async fn execute(&mut self, statement: &str) -> Result<u64, SessionError>;

  /// Commit the open transaction, if any.
  async fn commit(&mut self) -> Result<(), SessionError>;

  /// Roll back the open transaction, if any.
  async fn rollback(&mut self) -> Result<(), SessionError>;

  /// Close the session. Uncommitted work is discarded by the server.
  async fn close(self: Box<Self>) -> Result<(), SessionError>;
}

/// Opens database sessions.
#[async_trait]
pub trait Connector: Send + Sync {
  /// Open a new session.
  async fn connect(&self) -> Result<Box<dyn Session>, SessionError>;
}
