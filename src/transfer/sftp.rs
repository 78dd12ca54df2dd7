//! SFTP transfer client over libssh2.
//!
//! libssh2 is a blocking library, so the whole connect→upload→close cycle
//! runs on the blocking thread pool. Session and channel handles close on
//! drop, which releases the connection on every exit path, including
//! mid-sequence failures.

use std::fs::File;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::Path;

use async_trait::async_trait;
use snafu::prelude::*;
use ssh2::{ErrorCode, Session, Sftp};
use tracing::{debug, info};

use crate::error::{
    AuthSnafu, ChannelSnafu, ConnectSnafu, DnsEmptySnafu, DnsSnafu, HandshakeSnafu, LocalOpenSnafu,
    RemoteCreateSnafu, RemoteMkdirSnafu, RemoteStatSnafu, RemoteWriteSnafu, SessionSnafu,
    TransferError, UploadJoinSnafu,
};

use super::{RemoteEndpoint, TransferClient, TransferJob};

/// SFTP status code for a missing remote path.
const SFTP_NO_SUCH_FILE: i32 = 2;

/// Production transfer client speaking SFTP.
pub struct SftpTransferClient {
    endpoint: RemoteEndpoint,
}

impl SftpTransferClient {
    pub fn new(endpoint: RemoteEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl TransferClient for SftpTransferClient {
    async fn upload(&self, job: &TransferJob) -> Result<(), TransferError> {
        let endpoint = self.endpoint.clone();
        let job = job.clone();
        tokio::task::spawn_blocking(move || upload_blocking(&endpoint, &job))
            .await
            .context(UploadJoinSnafu)?
    }
}

/// One complete connect→authenticate→ensure-directory→put cycle.
fn upload_blocking(endpoint: &RemoteEndpoint, job: &TransferJob) -> Result<(), TransferError> {
    let addr = resolve(endpoint)?;
    debug!("Resolved {} to {}", endpoint.host, addr.ip());

    let tcp = TcpStream::connect(addr).context(ConnectSnafu { addr })?;
    let mut session = Session::new().context(SessionSnafu)?;
    session.set_tcp_stream(tcp);
    session.handshake().context(HandshakeSnafu {
        host: endpoint.host.as_str(),
    })?;
    session
        .userauth_password(&endpoint.user, &endpoint.password)
        .context(AuthSnafu {
            user: endpoint.user.as_str(),
        })?;

    let sftp = session.sftp().context(ChannelSnafu)?;
    ensure_remote_dir(&sftp, &job.remote_dir)?;

    let remote_path = job.remote_path();
    debug!(
        "Uploading {} -> {remote_path}",
        job.archive_path.display()
    );
    let mut local = File::open(&job.archive_path).context(LocalOpenSnafu {
        path: job.archive_path.display().to_string(),
    })?;
    let mut remote = sftp
        .create(Path::new(&remote_path))
        .context(RemoteCreateSnafu {
            path: remote_path.as_str(),
        })?;
    io::copy(&mut local, &mut remote).context(RemoteWriteSnafu {
        path: remote_path.as_str(),
    })?;

    Ok(())
}

/// Resolve the endpoint host to a socket address.
///
/// Resolution runs fresh on every attempt so an address change between
/// retries is picked up.
fn resolve(endpoint: &RemoteEndpoint) -> Result<SocketAddr, TransferError> {
    let mut addrs = (endpoint.host.as_str(), endpoint.port)
        .to_socket_addrs()
        .context(DnsSnafu {
            host: endpoint.host.as_str(),
        })?;
    addrs.next().ok_or_else(|| {
        DnsEmptySnafu {
            host: endpoint.host.as_str(),
        }
        .build()
    })
}

/// Probe the remote directory, creating it when absent.
///
/// Creation is idempotent: when mkdir fails but the directory stats
/// afterwards, another writer won the race and the attempt proceeds.
fn ensure_remote_dir(sftp: &Sftp, dir: &str) -> Result<(), TransferError> {
    let path = Path::new(dir);
    match sftp.stat(path) {
        Ok(_) => Ok(()),
        Err(e) if is_not_found(&e) => {
            info!("Remote directory {dir} does not exist, creating it");
            match sftp.mkdir(path, 0o755) {
                Ok(()) => Ok(()),
                Err(mk) if sftp.stat(path).is_ok() => {
                    debug!("Remote directory {dir} appeared concurrently: {mk}");
                    Ok(())
                }
                Err(mk) => Err(mk).context(RemoteMkdirSnafu { path: dir }),
            }
        }
        Err(e) => Err(e).context(RemoteStatSnafu { path: dir }),
    }
}

/// True when the error is the SFTP "no such file" status.
fn is_not_found(error: &ssh2::Error) -> bool {
    matches!(error.code(), ErrorCode::SFTP(SFTP_NO_SUCH_FILE))
}
