//! Session behaviour against a real SQLite database file.

use sqlx::{AnyConnection, Connection};
use taskline_db::{Connector, SessionError, SqlxConnector};

fn database_url(dir: &tempfile::TempDir) -> String {
  format!("sqlite://{}?mode=rwc", dir.path().join("pipeline.db").display())
}

async fn count_rows(url: &str, table: &str) -> i64 {
  sqlx::any::install_default_drivers();
  let mut conn = AnyConnection::connect(url).await.expect("failed to connect");
  let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
    .fetch_one(&mut conn)
    .await
    .expect("count query failed");
  conn.close().await.expect("failed to close");
  count
}

#[tokio::test]
async fn test_commit_persists_work() {
  let dir = tempfile::tempdir().unwrap();
  let url = database_url(&dir);
  let connector = SqlxConnector::new(&url);

  let mut session = connector.connect().await.expect("failed to connect");
  session
    .execute("CREATE TABLE stage (id INTEGER PRIMARY KEY, name TEXT)")
    .await
    .unwrap();
  let inserted = session
    .execute("INSERT INTO stage (name) VALUES ('a'), ('b')")
    .await
    .unwrap();
  session.commit().await.unwrap();
  session.close().await.unwrap();

  assert_eq!(inserted, 2);
  assert_eq!(count_rows(&url, "stage").await, 2);
}

#[tokio::test]
async fn test_rollback_discards_uncommitted_work() {
  let dir = tempfile::tempdir().unwrap();
  let url = database_url(&dir);
  let connector = SqlxConnector::new(&url);

  let mut session = connector.connect().await.unwrap();
  session
    .execute("CREATE TABLE stage (id INTEGER PRIMARY KEY)")
    .await
    .unwrap();
  session.commit().await.unwrap();

  session.execute("INSERT INTO stage (id) VALUES (1)").await.unwrap();
  session.rollback().await.unwrap();

  // A commit or rollback with no open transaction is a no-op.
  session.rollback().await.unwrap();
  session.commit().await.unwrap();
  session.close().await.unwrap();

  assert_eq!(count_rows(&url, "stage").await, 0);
}

#[tokio::test]
async fn test_engine_error_carries_message() {
  let dir = tempfile::tempdir().unwrap();
  let connector = SqlxConnector::new(database_url(&dir));

  let mut session = connector.connect().await.unwrap();
  let err = session
    .execute("INSERT INTO missing_table VALUES (1)")
    .await
    .unwrap_err();

  let engine = err.engine().expect("expected an engine error");
  assert!(engine.message.contains("missing_table"), "{}", engine.message);

  session.rollback().await.unwrap();
  session.close().await.unwrap();
}

#[tokio::test]
async fn test_empty_url_is_not_configured() {
  let connector = SqlxConnector::new("  ");
  let result = connector.connect().await;
  assert!(matches!(result, Err(SessionError::NotConfigured)));
}

#[tokio::test]
async fn test_unreachable_database_is_connect_error() {
  let dir = tempfile::tempdir().unwrap();
  // mode=ro refuses to create the missing file.
  let url = format!("sqlite://{}?mode=ro", dir.path().join("absent.db").display());
  let connector = SqlxConnector::new(url);

  let result = connector.connect().await;
  assert!(matches!(result, Err(SessionError::Connect { .. })));
}
