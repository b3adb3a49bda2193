use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
  #[error("failed to write summary log {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("summary log {} is not valid CSV: {source}", .path.display())]
  Csv {
    path: PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("reporter lock poisoned")]
  Poisoned,
}
