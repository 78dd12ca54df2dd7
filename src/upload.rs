//! Upload retry orchestration.
//!
//! Drives a [`TransferClient`](crate::transfer::TransferClient) through a
//! fixed attempt budget with a fixed inter-attempt delay; no exponential
//! backoff. Each failed attempt is logged through the notifier; the single
//! alert is reserved for exhaustion.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::notify::Notifier;
use crate::transfer::{TransferClient, TransferJob};

/// Message published when every attempt has failed.
pub const EXHAUSTION_ALERT: &str = "SFTP upload failed after multiple attempts.";

/// Attempt budget and inter-attempt delay for the upload loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts before giving up.
    pub max_attempts: u32,
    /// Fixed pause between consecutive attempts; no exponential backoff.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(3),
        }
    }
}

/// Terminal state of the upload workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// An attempt succeeded; no further attempts were made.
    Succeeded { attempts: u32 },
    /// Every attempt failed and the budget is spent.
    Exhausted { attempts: u32 },
    /// The archive was missing; no attempt was consumed.
    Skipped,
}

/// Run the upload loop against `client`.
///
/// Precondition: the archive must exist on local storage; when it does not,
/// the loop returns [`UploadOutcome::Skipped`] without consuming an
/// attempt. A failed attempt sleeps [`RetryPolicy::delay`] before the next
/// one, so `n` failures incur exactly `n - 1` delays. Exhaustion is the
/// only path that raises an alert.
pub async fn run_with_retries<C: TransferClient + ?Sized>(
    job: &TransferJob,
    client: &C,
    notifier: &Notifier,
    policy: RetryPolicy,
) -> UploadOutcome {
    let archive = job.archive_path.display();

    if !tokio::fs::try_exists(&job.archive_path).await.unwrap_or(false) {
        warn!("Archive {archive} does not exist, aborting upload");
        notifier
            .log_event(&format!("Upload skipped: archive {archive} does not exist"))
            .await;
        return UploadOutcome::Skipped;
    }

    for attempt in 1..=policy.max_attempts {
        match client.upload(job).await {
            Ok(()) => {
                info!(
                    "Uploaded {archive} to SFTP (attempt {attempt}/{})",
                    policy.max_attempts
                );
                notifier
                    .log_event(&format!("Uploaded {archive} to SFTP"))
                    .await;
                return UploadOutcome::Succeeded { attempts: attempt };
            }
            Err(e) => {
                warn!(
                    "Upload failed (attempt {attempt}/{}): {e}",
                    policy.max_attempts
                );
                notifier
                    .log_event(&format!(
                        "SFTP upload failed (attempt {attempt}/{}): {e}",
                        policy.max_attempts
                    ))
                    .await;
                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    error!(
        "SFTP upload failed after {} attempts, giving up",
        policy.max_attempts
    );
    notifier.alert(EXHAUSTION_ALERT).await;
    UploadOutcome::Exhausted {
        attempts: policy.max_attempts,
    }
}
