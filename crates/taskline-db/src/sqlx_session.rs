use async_trait::async_trait;
use sqlx::{AnyConnection, Connection, Executor};
use tracing::debug;

use crate::error::SessionError;
use crate::session::{Connector, Session};

/// Connector backed by a single sqlx [`AnyConnection`].
///
/// The driver is picked from the URL scheme (`postgres://`, `sqlite://`).
#[derive(Debug, Clone)]
pub struct SqlxConnector {
  url: String,
}

impl SqlxConnector {
  pub fn new(url: impl Into<String>) -> Self {
    sqlx::any::install_default_drivers();
    Self { url: url.into() }
  }

  /// Open a raw connection, outside any [`Session`] bookkeeping.
  pub async fn open(&self) -> Result<AnyConnection, SessionError> {
    if self.url.trim().is_empty() {
      return Err(SessionError::NotConfigured);
    }

    let conn = AnyConnection::connect(&self.url)
      .await
      .map_err(|source| SessionError::Connect { source })?;

    debug!(backend = conn.backend_name(), "database connection opened");
    Ok(conn)
  }
}

#[async_trait]
impl Connector for SqlxConnector {
  async fn connect(&self) -> Result<Box<dyn Session>, SessionError> {
    let conn = self.open().await?;
    Ok(Box::new(SqlxSession {
      conn,
      in_transaction: false,
    }))
  }
}

/// A session over one [`AnyConnection`].
pub struct SqlxSession {
  conn: AnyConnection,
  in_transaction: bool,
}

impl SqlxSession {
  async fn run(&mut self, sql: &str) -> Result<u64, SessionError> {
    let conn: &mut AnyConnection = &mut self.conn;
    let result = conn.execute(sqlx::raw_sql(sql)).await?;
    Ok(result.rows_affected())
  }
}

#[async_trait]
impl Session for SqlxSession {
  async fn execute(&mut self, statement: &str) -> Result<u64, SessionError> {
    if !self.in_transaction {
      self.run("BEGIN").await?;
      self.in_transaction = true;
    }
    self.run(statement).await
  }

  async fn commit(&mut self) -> Result<(), SessionError> {
    if self.in_transaction {
      self.in_transaction = false;
      self.run("COMMIT").await?;
    }
    Ok(())
  }

  async fn rollback(&mut self) -> Result<(), SessionError> {
    if self.in_transaction {
      self.in_transaction = false;
      self.run("ROLLBACK").await?;
    }
    Ok(())
  }

  async fn close(self: Box<Self>) -> Result<(), SessionError> {
    self.conn.close().await.map_err(SessionError::Driver)
  }
}
