//! Notification sinks for status events and alerts.
//!
//! Both sinks are best-effort: a failure to deliver becomes a local
//! diagnostic and never propagates, so the transfer workflow continues
//! regardless of monitoring-backend health.

mod cloudwatch;
mod sns;

pub use cloudwatch::{CloudWatchLogSink, LOG_GROUP};
pub use sns::{ALERT_SUBJECT, SnsAlertSink};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::NotifyError;

/// Structured log sink accepting one plain-text event per call.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn append(&self, message: &str) -> Result<(), NotifyError>;
}

/// Alert sink accepting one plain-text message per call.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn publish(&self, message: &str) -> Result<(), NotifyError>;
}

/// Fire-and-forget facade over the two sinks.
#[derive(Clone)]
pub struct Notifier {
    log_sink: Arc<dyn LogSink>,
    alert_sink: Arc<dyn AlertSink>,
}

impl Notifier {
    pub fn new(log_sink: Arc<dyn LogSink>, alert_sink: Arc<dyn AlertSink>) -> Self {
        Self {
            log_sink,
            alert_sink,
        }
    }

    /// Append one event to the structured log sink.
    ///
    /// Delivery failures are logged locally and swallowed.
    pub async fn log_event(&self, message: &str) {
        if let Err(e) = self.log_sink.append(message).await {
            warn!("Failed to deliver log event: {e}");
        }
    }

    /// Publish one alert.
    ///
    /// Delivery failures are logged locally and swallowed.
    pub async fn alert(&self, message: &str) {
        if let Err(e) = self.alert_sink.publish(message).await {
            warn!("Failed to deliver alert: {e}");
        }
    }
}
