//! Gzip compression of the source file.
//!
//! The copy is streamed through the encoder so memory stays bounded
//! regardless of source size. Encoding is CPU work and runs on the
//! blocking thread pool.

use std::fs::File;
use std::io;
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use snafu::prelude::*;
use tracing::info;

use crate::error::{
    CompressError, CompressJoinSnafu, CreateArchiveSnafu, OpenSourceSnafu, StreamCopySnafu,
};
use crate::notify::Notifier;
use crate::transfer::TransferJob;

/// Compress the job's source file into its archive path.
///
/// On success, reports the completed compression through the notifier and
/// returns the number of bytes read from the source. Any failure is fatal
/// to the run: the caller must not proceed to upload.
pub async fn compress_file(job: &TransferJob, notifier: &Notifier) -> Result<u64, CompressError> {
    let source = job.source_path.clone();
    let archive = job.archive_path.clone();
    let bytes = tokio::task::spawn_blocking(move || gzip_copy(&source, &archive))
        .await
        .context(CompressJoinSnafu)??;

    info!(
        "Compressed {} -> {} ({bytes} bytes in)",
        job.source_path.display(),
        job.archive_path.display()
    );
    notifier
        .log_event(&format!(
            "Compressed {} -> {}",
            job.source_path.display(),
            job.archive_path.display()
        ))
        .await;

    Ok(bytes)
}

/// Blocking streamed copy: source file → gzip encoder → archive file.
fn gzip_copy(source: &Path, archive: &Path) -> Result<u64, CompressError> {
    let mut input = File::open(source).context(OpenSourceSnafu {
        path: source.display().to_string(),
    })?;
    let output = File::create(archive).context(CreateArchiveSnafu {
        path: archive.display().to_string(),
    })?;

    let mut encoder = GzEncoder::new(output, Compression::default());
    let bytes = io::copy(&mut input, &mut encoder).context(StreamCopySnafu {
        path: archive.display().to_string(),
    })?;
    encoder.finish().context(StreamCopySnafu {
        path: archive.display().to_string(),
    })?;

    Ok(bytes)
}
