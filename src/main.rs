//! courier: a single-file transfer agent.
//!
//! Gzips a fixed local file, uploads it to an SFTP endpoint with a bounded
//! retry budget, and reports status to CloudWatch Logs and SNS. Invocation
//! is parameterless; configuration comes from the environment and log
//! verbosity from `RUST_LOG`.
//!
//! Exit codes: 0 = upload succeeded, 1 = fatal local error before the
//! retry loop, 2 = retry budget exhausted.

use std::process::ExitCode;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use snafu::{Report, ResultExt};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use courier::agent;
use courier::config::AgentConfig;
use courier::error::ConfigSnafu;
use courier::notify::{CloudWatchLogSink, Notifier, SnsAlertSink};
use courier::upload::UploadOutcome;

/// Fatal local error: configuration, compression, or a missing archive.
const EXIT_FATAL: u8 = 1;
/// The retry budget was spent without a successful upload.
const EXIT_EXHAUSTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match AgentConfig::from_env().context(ConfigSnafu) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", Report::from_error(e));
            return ExitCode::from(EXIT_FATAL);
        }
    };

    // Backend clients are built once here and injected into the sinks; no
    // component reaches for ambient credentials on its own.
    let aws = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let notifier = Notifier::new(
        Arc::new(CloudWatchLogSink::new(
            aws_sdk_cloudwatchlogs::Client::new(&aws),
            config.region.as_str(),
        )),
        Arc::new(SnsAlertSink::new(
            aws_sdk_sns::Client::new(&aws),
            config.sns_topic_arn.as_str(),
        )),
    );

    match agent::run(&config, &notifier).await {
        Ok(UploadOutcome::Succeeded { attempts }) => {
            info!("Agent finished: upload succeeded after {attempts} attempt(s)");
            ExitCode::SUCCESS
        }
        Ok(UploadOutcome::Exhausted { attempts }) => {
            error!("Agent finished: upload exhausted after {attempts} attempt(s)");
            ExitCode::from(EXIT_EXHAUSTED)
        }
        Ok(UploadOutcome::Skipped) => {
            error!("Agent finished: upload skipped, archive missing");
            ExitCode::from(EXIT_FATAL)
        }
        Err(e) => {
            error!("Agent failed: {}", Report::from_error(e));
            ExitCode::from(EXIT_FATAL)
        }
    }
}
