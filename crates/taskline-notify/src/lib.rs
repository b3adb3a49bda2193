//! Operator alerts for taskline.
//!
//! The orchestrator reports setup failures, task failures and (optionally)
//! task successes through a [`Notifier`]. Delivery failures are returned to
//! the caller, which logs them and carries on.

mod error;
mod notifier;
mod webhook;

pub use error::NotifyError;
pub use notifier::{Alert, ChannelNotifier, LogNotifier, Notifier, NoopNotifier};
pub use webhook::WebhookNotifier;
