//! courier: a single-file transfer agent.
//!
//! Compresses a fixed local file, uploads it to an SFTP endpoint with a
//! bounded retry budget, and reports status to CloudWatch Logs and SNS.
//! The core of the crate is the retry-and-notify upload workflow in
//! [`upload`]; compression, transfer, and notification are its
//! collaborators.
//!
//! # Example
//!
//! ```ignore
//! use courier::{AgentConfig, UploadOutcome, agent};
//!
//! let config = AgentConfig::from_env()?;
//! let notifier = build_notifier(&config).await;
//! match agent::run(&config, &notifier).await? {
//!     UploadOutcome::Succeeded { attempts } => println!("done in {attempts}"),
//!     other => eprintln!("upload did not complete: {other:?}"),
//! }
//! ```

pub mod agent;
pub mod compress;
pub mod config;
pub mod error;
pub mod notify;
pub mod transfer;
pub mod upload;

// Re-export main types
pub use config::AgentConfig;
pub use upload::{RetryPolicy, UploadOutcome};
