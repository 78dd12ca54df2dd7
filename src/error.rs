//! Error types for the transfer agent using snafu.
//!
//! One enum per concern, with context selectors and source chains.
//! Transfer errors are absorbed by the retry loop and never reach the
//! top-level `AgentError`; notification errors are swallowed at the
//! notifier boundary and never propagate at all.

use std::net::SocketAddr;

use aws_sdk_cloudwatchlogs::error::{BuildError, SdkError};
use aws_sdk_cloudwatchlogs::operation::create_log_stream::CreateLogStreamError;
use aws_sdk_cloudwatchlogs::operation::describe_log_streams::DescribeLogStreamsError;
use aws_sdk_cloudwatchlogs::operation::put_log_events::PutLogEventsError;
use aws_sdk_sns::operation::publish::PublishError;
use snafu::prelude::*;

// ============ Config Errors ============

/// Errors that can occur while building the agent configuration from the
/// environment.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// One or more required environment variables are unset or empty.
    #[snafu(display("Missing required environment variables: {}", missing.join(", ")))]
    MissingVars { missing: Vec<String> },

    /// An optional override did not parse as a number.
    #[snafu(display("Invalid value for {name}: {value:?}"))]
    InvalidVar {
        name: String,
        value: String,
        source: std::num::ParseIntError,
    },

    /// The attempt budget must allow at least one attempt.
    #[snafu(display("{name} must be at least 1"))]
    InvalidAttemptBudget { name: String },
}

// ============ Compress Errors ============

/// Errors that can occur while compressing the source file.
///
/// All of these are fatal: the agent must not proceed to upload an
/// incomplete or absent archive.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CompressError {
    /// Source file missing or unreadable.
    #[snafu(display("Failed to open source file {path}"))]
    OpenSource {
        path: String,
        source: std::io::Error,
    },

    /// Archive could not be created (permissions, missing parent, disk full).
    #[snafu(display("Failed to create archive {path}"))]
    CreateArchive {
        path: String,
        source: std::io::Error,
    },

    /// The streamed copy through the gzip encoder failed.
    #[snafu(display("Failed to write compressed stream to {path}"))]
    StreamCopy {
        path: String,
        source: std::io::Error,
    },

    /// The blocking compression task did not complete.
    #[snafu(display("Compression task failed to complete"))]
    CompressJoin { source: tokio::task::JoinError },
}

// ============ Transfer Errors ============

/// Classified failure of a single upload attempt.
///
/// Every step of the connect→upload→close cycle maps to its own variant so
/// the retry loop can log a precise cause without letting any failure leak
/// past the attempt boundary.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TransferError {
    /// Hostname resolution failed.
    #[snafu(display("Failed to resolve host {host}"))]
    Dns {
        host: String,
        source: std::io::Error,
    },

    /// Hostname resolved to no addresses.
    #[snafu(display("Host {host} resolved to no addresses"))]
    DnsEmpty { host: String },

    /// TCP connection failed.
    #[snafu(display("Failed to connect to {addr}"))]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Could not allocate an SSH session.
    #[snafu(display("Failed to create SSH session"))]
    Session { source: ssh2::Error },

    /// SSH protocol handshake failed.
    #[snafu(display("SSH handshake with {host} failed"))]
    Handshake { host: String, source: ssh2::Error },

    /// Password authentication was rejected.
    #[snafu(display("Authentication failed for user {user}"))]
    Auth { user: String, source: ssh2::Error },

    /// Could not open the SFTP channel on an authenticated session.
    #[snafu(display("Failed to open SFTP channel"))]
    Channel { source: ssh2::Error },

    /// Remote directory probe failed with something other than not-found.
    #[snafu(display("Failed to stat remote directory {path}"))]
    RemoteStat { path: String, source: ssh2::Error },

    /// Remote directory creation failed.
    #[snafu(display("Failed to create remote directory {path}"))]
    RemoteMkdir { path: String, source: ssh2::Error },

    /// Local archive could not be opened for the transfer.
    #[snafu(display("Failed to open local archive {path}"))]
    LocalOpen {
        path: String,
        source: std::io::Error,
    },

    /// Remote file could not be created.
    #[snafu(display("Failed to create remote file {path}"))]
    RemoteCreate { path: String, source: ssh2::Error },

    /// The transfer itself failed mid-stream.
    #[snafu(display("Failed to write remote file {path}"))]
    RemoteWrite {
        path: String,
        source: std::io::Error,
    },

    /// The blocking upload task did not complete.
    #[snafu(display("Upload task failed to complete"))]
    UploadJoin { source: tokio::task::JoinError },
}

// ============ Notify Errors ============

/// Errors talking to the logging or alerting backend.
///
/// Always caught at the notifier boundary and surfaced as a local
/// diagnostic; the primary workflow continues regardless.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum NotifyError {
    /// Log stream lookup failed (including a missing log group).
    #[snafu(display("Failed to look up log stream {stream}"))]
    DescribeStream {
        stream: String,
        source: SdkError<DescribeLogStreamsError>,
    },

    /// Log stream creation failed with something other than already-exists.
    #[snafu(display("Failed to create log stream {stream}"))]
    CreateStream {
        stream: String,
        source: SdkError<CreateLogStreamError>,
    },

    /// The log event could not be assembled.
    #[snafu(display("Failed to build log event"))]
    EventBuild { source: BuildError },

    /// Appending the event to the stream failed.
    #[snafu(display("Failed to put log events to stream {stream}"))]
    PutEvents {
        stream: String,
        source: SdkError<PutLogEventsError>,
    },

    /// Publishing the alert failed.
    #[snafu(display("Failed to publish alert to {topic}"))]
    Publish {
        topic: String,
        source: SdkError<PublishError>,
    },
}

// ============ Agent Error (top-level) ============

/// Top-level errors for the fatal-local path.
///
/// Only configuration and compression failures abort the run; upload
/// exhaustion is an outcome, not an error, and transfer errors are
/// consumed by the retry loop.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum AgentError {
    /// Configuration error.
    #[snafu(display("Configuration error"))]
    Config { source: ConfigError },

    /// Compression failed; there is no archive to upload.
    #[snafu(display("Compression failed"))]
    Compress { source: CompressError },
}
