//! Remote transfer abstraction.
//!
//! [`TransferJob`] and [`RemoteEndpoint`] describe the one file this
//! process moves and where it goes; [`TransferClient`] is the seam between
//! the retry loop and the wire protocol, implemented for production by
//! [`SftpTransferClient`].

mod sftp;

pub use sftp::SftpTransferClient;

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::AgentConfig;
use crate::error::TransferError;

/// Standard secure-shell file-transfer port; the endpoint is always
/// addressed on it.
pub const SFTP_PORT: u16 = 22;

/// The one file this process moves, fixed at startup.
#[derive(Debug, Clone)]
pub struct TransferJob {
    /// Local file the archive is produced from.
    pub source_path: PathBuf,
    /// Local gzip archive (source path + `.gz`).
    pub archive_path: PathBuf,
    /// Remote directory the archive lands in.
    pub remote_dir: String,
}

impl TransferJob {
    /// Derive the job from configuration; the archive sits next to the
    /// source with a `.gz` suffix.
    pub fn from_config(config: &AgentConfig) -> Self {
        let mut archive = config.source_path.clone().into_os_string();
        archive.push(".gz");
        Self {
            source_path: config.source_path.clone(),
            archive_path: PathBuf::from(archive),
            remote_dir: config.ftp_target_dir.clone(),
        }
    }

    /// Remote destination: target directory joined with the archive's base
    /// name.
    pub fn remote_path(&self) -> String {
        let name = self
            .archive_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        format!("{}/{}", self.remote_dir.trim_end_matches('/'), name)
    }
}

/// Connection parameters for the remote endpoint.
///
/// Immutable for the process lifetime; the host is re-resolved inside every
/// attempt rather than cached here.
#[derive(Clone)]
pub struct RemoteEndpoint {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl RemoteEndpoint {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            host: config.ftp_host.clone(),
            port: SFTP_PORT,
            user: config.ftp_user.clone(),
            password: config.ftp_password.clone(),
        }
    }
}

impl fmt::Debug for RemoteEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteEndpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A single upload attempt against the remote endpoint.
///
/// Implementations open a fresh connection per call and must release it on
/// every exit path; nothing is shared between attempts, so a half-broken
/// connection cannot poison the next one.
#[async_trait]
pub trait TransferClient: Send + Sync {
    async fn upload(&self, job: &TransferJob) -> Result<(), TransferError>;
}
