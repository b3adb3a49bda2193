//! The notification port and its in-process implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::NotifyError;

/// Sends operator alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
  async fn send_alert(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// An alert as delivered to a [`ChannelNotifier`] receiver or a webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
  pub subject: String,
  pub body: String,
}

impl Alert {
  pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
    Self {
      subject: subject.into(),
      body: body.into(),
    }
  }
}

/// Writes alerts to the log at warn level.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
  async fn send_alert(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
    warn!(subject, "ALERT\n{}", body);
    Ok(())
  }
}

/// Discards all alerts.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
  async fn send_alert(&self, _subject: &str, _body: &str) -> Result<(), NotifyError> {
    Ok(())
  }
}

/// Sends alerts to an unbounded channel.
///
/// Alert volume is at most two per task, so the channel never needs to
/// push back on the run.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<Alert>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<Alert>) -> Self {
    Self { sender }
  }
}

#[async_trait]
impl Notifier for ChannelNotifier {
  async fn send_alert(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
    self
      .sender
      .send(Alert::new(subject, body))
      .map_err(|_| NotifyError::Closed)
  }
}
