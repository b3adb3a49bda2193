//! Table export to CSV.

use std::io::Write;

use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Column, Connection, Executor, Row, ValueRef};
use tracing::{info, instrument, warn};

use crate::error::{ExportError, SessionError};
use crate::sqlx_session::SqlxConnector;

impl SqlxConnector {
  /// Open a connection, export `table` into `out` and close the connection.
  pub async fn export<W: Write>(&self, table: &str, out: W) -> Result<u64, ExportError> {
    let mut conn = self.open().await?;
    let exported = export_table(&mut conn, table, out).await;
    if let Err(e) = conn.close().await {
      warn!(error = %e, "failed to close export connection");
    }
    exported
  }
}

/// Write every row of `table` to `out` as CSV and return the row count.
///
/// The header row holds the column names and is written even when the table
/// is empty. NULL becomes an empty field. `table` may be schema-qualified
/// (`staging.sales`) but must otherwise be a plain identifier.
#[instrument(skip(conn, out))]
pub async fn export_table<W: Write>(
  conn: &mut AnyConnection,
  table: &str,
  out: W,
) -> Result<u64, ExportError> {
  if !is_table_name(table) {
    return Err(ExportError::InvalidTable(table.to_string()));
  }

  let query = format!("SELECT * FROM {table}");
  let rows = sqlx::query(&query)
    .fetch_all(&mut *conn)
    .await
    .map_err(SessionError::from)?;

  let header: Vec<String> = match rows.first() {
    Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
    None => (&mut *conn)
      .describe(&query)
      .await
      .map_err(SessionError::from)?
      .columns()
      .iter()
      .map(|c| c.name().to_string())
      .collect(),
  };

  let mut writer = csv::Writer::from_writer(out);
  writer.write_record(&header)?;
  for row in &rows {
    let fields = (0..row.len())
      .map(|index| field(row, index))
      .collect::<Result<Vec<_>, _>>()?;
    writer.write_record(&fields)?;
  }
  writer.flush()?;

  let count = rows.len() as u64;
  info!(rows = count, "table exported");
  Ok(count)
}

/// One value as CSV text.
fn field(row: &AnyRow, index: usize) -> Result<String, ExportError> {
  if row.try_get_raw(index).map_err(SessionError::from)?.is_null() {
    return Ok(String::new());
  }

  if let Ok(value) = row.try_get::<i64, _>(index) {
    return Ok(value.to_string());
  }
  if let Ok(value) = row.try_get::<i32, _>(index) {
    return Ok(value.to_string());
  }
  if let Ok(value) = row.try_get::<i16, _>(index) {
    return Ok(value.to_string());
  }
  if let Ok(value) = row.try_get::<f64, _>(index) {
    return Ok(value.to_string());
  }
  if let Ok(value) = row.try_get::<f32, _>(index) {
    return Ok(value.to_string());
  }
  if let Ok(value) = row.try_get::<bool, _>(index) {
    return Ok(value.to_string());
  }
  if let Ok(value) = row.try_get::<String, _>(index) {
    return Ok(value);
  }
  if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
    return Ok(String::from_utf8_lossy(&value).into_owned());
  }

  Err(ExportError::UnsupportedColumn {
    column: row.column(index).name().to_string(),
  })
}

/// A plain or schema-qualified identifier. Nothing else reaches the query.
fn is_table_name(table: &str) -> bool {
  table.split('.').all(|part| {
    part.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
      && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_table_names() {
    assert!(is_table_name("sales"));
    assert!(is_table_name("staging.sales_2024"));
    assert!(is_table_name("_tmp"));
    assert!(!is_table_name(""));
    assert!(!is_table_name("staging."));
    assert!(!is_table_name("1sales"));
    assert!(!is_table_name("sales; DROP TABLE sales"));
    assert!(!is_table_name("\"sales\""));
  }
}
