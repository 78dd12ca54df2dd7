//! CloudWatch Logs sink.
//!
//! Every agent writes to its own stream, named after its region, under one
//! shared log group. The stream is created lazily on first use.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::Client;
use aws_sdk_cloudwatchlogs::types::InputLogEvent;
use chrono::Utc;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::error::{
    CreateStreamSnafu, DescribeStreamSnafu, EventBuildSnafu, NotifyError, PutEventsSnafu,
};

use super::LogSink;

/// Log group shared by every agent.
pub const LOG_GROUP: &str = "CSV_Agent_Logs";

/// Wait after creating a stream before the first write, so the backend has
/// registered it.
const STREAM_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Structured log sink appending timestamped events to one CloudWatch
/// stream.
pub struct CloudWatchLogSink {
    client: Client,
    stream: String,
}

impl CloudWatchLogSink {
    pub fn new(client: Client, stream: impl Into<String>) -> Self {
        Self {
            client,
            stream: stream.into(),
        }
    }

    /// Create the log stream when no stream with this name exists yet.
    ///
    /// Runs before every write: the backend may not have durably registered
    /// a stream created by an earlier call, and creation tolerates the
    /// already-exists race. A missing log group surfaces here as an error.
    async fn ensure_stream(&self) -> Result<(), NotifyError> {
        let streams = self
            .client
            .describe_log_streams()
            .log_group_name(LOG_GROUP)
            .log_stream_name_prefix(&self.stream)
            .send()
            .await
            .context(DescribeStreamSnafu {
                stream: self.stream.as_str(),
            })?;

        if !streams.log_streams().is_empty() {
            return Ok(());
        }

        info!("Log stream {} not found, creating it", self.stream);
        match self
            .client
            .create_log_stream()
            .log_group_name(LOG_GROUP)
            .log_stream_name(&self.stream)
            .send()
            .await
        {
            Ok(_) => {}
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_already_exists_exception()) => {}
            Err(e) => {
                return Err(e).context(CreateStreamSnafu {
                    stream: self.stream.as_str(),
                });
            }
        }

        tokio::time::sleep(STREAM_SETTLE_DELAY).await;
        Ok(())
    }
}

#[async_trait]
impl LogSink for CloudWatchLogSink {
    async fn append(&self, message: &str) -> Result<(), NotifyError> {
        self.ensure_stream().await?;

        let event = InputLogEvent::builder()
            .timestamp(Utc::now().timestamp_millis())
            .message(message)
            .build()
            .context(EventBuildSnafu)?;

        self.client
            .put_log_events()
            .log_group_name(LOG_GROUP)
            .log_stream_name(&self.stream)
            .log_events(event)
            .send()
            .await
            .context(PutEventsSnafu {
                stream: self.stream.as_str(),
            })?;

        debug!("Logged to CloudWatch: {message}");
        Ok(())
    }
}
