//! SNS alert sink.

use async_trait::async_trait;
use aws_sdk_sns::Client;
use snafu::prelude::*;
use tracing::debug;

use crate::error::{NotifyError, PublishSnafu};

use super::AlertSink;

/// Fixed subject attached to every alert.
pub const ALERT_SUBJECT: &str = "CSV Agent Alert";

/// Alert sink publishing to a single fixed SNS topic.
pub struct SnsAlertSink {
    client: Client,
    topic_arn: String,
}

impl SnsAlertSink {
    pub fn new(client: Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }
}

#[async_trait]
impl AlertSink for SnsAlertSink {
    async fn publish(&self, message: &str) -> Result<(), NotifyError> {
        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(ALERT_SUBJECT)
            .message(message)
            .send()
            .await
            .context(PublishSnafu {
                topic: self.topic_arn.as_str(),
            })?;

        debug!("Published alert: {message}");
        Ok(())
    }
}
