//! Webhook alert delivery.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::NotifyError;
use crate::notifier::{Alert, Notifier};

/// HTTP request timeout for one delivery.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// POSTs each alert as JSON (`{"subject": ..., "body": ...}`) to a URL.
///
/// Delivery is attempted once; a failed alert must not hold up the run.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
  client: reqwest::Client,
  url: String,
}

impl WebhookNotifier {
  pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
    let client = reqwest::Client::builder()
      .timeout(REQUEST_TIMEOUT)
      .build()?;
    Ok(Self::with_client(client, url))
  }

  /// Use a pre-configured HTTP client.
  pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
    Self {
      client,
      url: url.into(),
    }
  }

  pub fn url(&self) -> &str {
    &self.url
  }
}

#[async_trait]
impl Notifier for WebhookNotifier {
  #[instrument(name = "webhook_alert", skip(self, body), fields(url = %self.url))]
  async fn send_alert(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
    let response = self
      .client
      .post(&self.url)
      .json(&Alert::new(subject, body))
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(NotifyError::HttpStatus(status.as_u16()));
    }
    debug!(status = status.as_u16(), "alert delivered");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  fn local_notifier(url: String) -> WebhookNotifier {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    WebhookNotifier::with_client(client, url)
  }

  /// Accept one connection, capture the request and answer with `status_line`.
  async fn one_shot_server(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/alerts", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut request = Vec::new();
      let mut buf = [0u8; 4096];
      loop {
        let n = socket.read(&mut buf).await.unwrap();
        request.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&request);
        if let Some(head_end) = text.find("\r\n\r\n") {
          let length = text[..head_end]
            .lines()
            .find_map(|l| {
              l.to_ascii_lowercase()
                .strip_prefix("content-length:")
                .map(|v| v.trim().parse::<usize>().unwrap())
            })
            .unwrap_or(0);
          if request.len() >= head_end + 4 + length {
            break;
          }
        }
        if n == 0 {
          break;
        }
      }
      let response = format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
      socket.write_all(response.as_bytes()).await.unwrap();
      socket.shutdown().await.unwrap();
      String::from_utf8_lossy(&request).into_owned()
    });

    (url, handle)
  }

  #[tokio::test]
  async fn test_posts_alert_as_json() {
    let (url, server) = one_shot_server("200 OK").await;
    let notifier = local_notifier(url);

    notifier
      .send_alert("Pipeline Task Failed: load", "Run ID: 1\nTask: load")
      .await
      .unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /alerts"));
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let alert: Alert = serde_json::from_str(body).unwrap();
    assert_eq!(alert, Alert::new("Pipeline Task Failed: load", "Run ID: 1\nTask: load"));
  }

  #[tokio::test]
  async fn test_non_success_status_is_error() {
    let (url, server) = one_shot_server("502 Bad Gateway").await;
    let notifier = local_notifier(url);

    let err = notifier.send_alert("subject", "body").await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, NotifyError::HttpStatus(502)));
    assert_eq!(err.to_string(), "alert endpoint returned HTTP 502");
  }

  #[tokio::test]
  async fn test_unreachable_endpoint_is_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/alerts", listener.local_addr().unwrap());
    drop(listener);

    let err = local_notifier(url)
      .send_alert("subject", "body")
      .await
      .unwrap_err();
    assert!(matches!(err, NotifyError::Request(_)));
  }
}
