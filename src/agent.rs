//! Top-level agent sequencing.
//!
//! One run, one file, one outcome, mirroring a cron-style batch
//! invocation: startup notifications, compress, then the retry loop.

use snafu::prelude::*;
use tracing::info;

use crate::compress;
use crate::config::AgentConfig;
use crate::error::{AgentError, CompressSnafu};
use crate::notify::Notifier;
use crate::transfer::{RemoteEndpoint, SftpTransferClient, TransferClient, TransferJob};
use crate::upload::{self, UploadOutcome};

/// Run the agent end to end with the production SFTP client.
pub async fn run(config: &AgentConfig, notifier: &Notifier) -> Result<UploadOutcome, AgentError> {
    let client = SftpTransferClient::new(RemoteEndpoint::from_config(config));
    run_with(config, notifier, &client).await
}

/// Run the agent end to end against an arbitrary transfer client.
///
/// Startup notifications go out unconditionally, before anything that can
/// fail. A compression failure is fatal: the run ends without entering the
/// retry loop. Everything past compression is an outcome, not an error.
pub async fn run_with<C: TransferClient>(
    config: &AgentConfig,
    notifier: &Notifier,
    client: &C,
) -> Result<UploadOutcome, AgentError> {
    info!("Agent started in region {}", config.region);
    let startup = format!("Agent started in {}", config.region);
    notifier.log_event(&startup).await;
    notifier.alert(&startup).await;

    let job = TransferJob::from_config(config);
    compress::compress_file(&job, notifier)
        .await
        .context(CompressSnafu)?;

    Ok(upload::run_with_retries(&job, client, notifier, config.retry).await)
}
