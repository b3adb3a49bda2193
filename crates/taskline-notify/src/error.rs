#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
  /// The HTTP request failed (network, DNS, timeout, etc.).
  #[error("alert request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("alert endpoint returned HTTP {0}")]
  HttpStatus(u16),

  #[error("alert receiver closed")]
  Closed,
}
