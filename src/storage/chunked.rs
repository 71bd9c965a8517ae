//! Chunked transfers for files larger than a backend's per-request limit.
//!
//! A file of `total` bytes moved with a limit of `max` bytes is split into
//! `ceil(total / max)` contiguous ranges. Uploads write the ranges in order
//! through a single writer; downloads fetch each range into its own temp file
//! and stitch them together once every range has arrived.

use crate::error::{Error, LocalAlreadyExistsSnafu, Result};
use crate::storage::Backend;
use crate::storage::utils::error::local;
use futures::stream::TryStreamExt;
use opendal::Operator;
use snafu::ensure;
use std::ops::Range;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt, SeekFrom};

/// One chunk of a transfer: inclusive byte range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub index: u64,
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Half-open form accepted by ranged reads.
    pub fn as_range(&self) -> Range<u64> {
        self.start..self.end + 1
    }
}

/// Partition of `total_size` bytes into chunks of at most `chunk_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total_size: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    pub fn new(total_size: u64, chunk_size: u64) -> Self {
        Self {
            total_size,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn chunk_count(&self) -> u64 {
        self.total_size.div_ceil(self.chunk_size)
    }

    /// More than one request is needed.
    pub fn is_chunked(&self) -> bool {
        self.chunk_count() > 1
    }

    pub fn ranges(&self) -> impl Iterator<Item = ChunkRange> + use<> {
        let ChunkPlan {
            total_size,
            chunk_size,
        } = *self;
        (0..self.chunk_count()).map(move |index| {
            let start = index * chunk_size;
            ChunkRange {
                index,
                start,
                end: (start + chunk_size - 1).min(total_size - 1),
            }
        })
    }
}

/// Upload `local_path` to `remote_path`, one in-order write per chunk.
///
/// Any failure aborts the writer, so backends with atomic finalization never
/// expose a partial object. Returns the ranges that were written.
pub async fn upload_chunked(
    operator: &Operator,
    backend: Backend,
    local_path: &Path,
    remote_path: &str,
    chunk_size: u64,
) -> Result<Vec<ChunkRange>> {
    let mut file = fs::File::open(local_path)
        .await
        .map_err(|e| local(local_path, e))?;
    let total_size = file
        .metadata()
        .await
        .map_err(|e| local(local_path, e))?
        .len();
    let plan = ChunkPlan::new(total_size, chunk_size);

    log::debug!(
        "upload_chunked backend={:?} local_path={} remote_path={} size={} chunks={}",
        backend,
        local_path.display(),
        remote_path,
        total_size,
        plan.chunk_count()
    );

    let mut writer = operator
        .writer_with(remote_path)
        .chunk(plan.chunk_size() as usize)
        .await
        .map_err(|e| backend.translate(e, remote_path))?;

    let mut written = Vec::with_capacity(plan.chunk_count() as usize);
    for range in plan.ranges() {
        let mut buffer = vec![0u8; range.len() as usize];
        let outcome = match file.read_exact(&mut buffer).await {
            Ok(_) => writer
                .write(buffer)
                .await
                .map_err(|e| backend.translate(e, remote_path)),
            Err(e) => Err(local(local_path, e)),
        };
        if let Err(err) = outcome {
            if let Err(abort_err) = writer.abort().await {
                log::warn!("failed to abort upload of {remote_path}: {abort_err}");
            }
            return Err(err);
        }
        log::debug!(
            "uploaded chunk {} [{}, {}] of {remote_path}",
            range.index,
            range.start,
            range.end
        );
        written.push(range);
    }

    writer
        .close()
        .await
        .map_err(|e| backend.translate(e, remote_path))?;
    Ok(written)
}

/// Download `remote_path` (of `total_size` bytes) into `local_path`.
///
/// `local_path` must not exist. A single chunk is streamed straight into the
/// destination; several chunks are staged in temp files that are removed on
/// every exit path. Returns the ranges that were read.
pub async fn download_chunked(
    operator: &Operator,
    backend: Backend,
    remote_path: &str,
    local_path: &Path,
    total_size: u64,
    chunk_size: u64,
) -> Result<Vec<ChunkRange>> {
    let exists = fs::try_exists(local_path)
        .await
        .map_err(|e| local(local_path, e))?;
    ensure!(
        !exists,
        LocalAlreadyExistsSnafu {
            path: local_path.to_path_buf()
        }
    );

    let plan = ChunkPlan::new(total_size, chunk_size);
    log::debug!(
        "download_chunked backend={:?} remote_path={} local_path={} size={} chunks={}",
        backend,
        remote_path,
        local_path.display(),
        total_size,
        plan.chunk_count()
    );

    if !plan.is_chunked() {
        let mut stream = operator
            .reader(remote_path)
            .await
            .map_err(|e| backend.translate(e, remote_path))?
            .into_bytes_stream(..)
            .await
            .map_err(|e| backend.translate(e, remote_path))?;
        let mut dest = create_new(local_path).await?;
        let mut streamed = Ok(());
        loop {
            let bytes = match stream.try_next().await {
                Ok(Some(bytes)) => bytes,
                Ok(None) => break,
                Err(e) => {
                    streamed = Err(stream_error(backend, remote_path, e));
                    break;
                }
            };
            if let Err(e) = dest.write_all(&bytes).await {
                streamed = Err(local(local_path, e));
                break;
            }
        }
        finish(dest, local_path, streamed).await?;
        return Ok(plan.ranges().collect());
    }

    let mut parts = Vec::with_capacity(plan.chunk_count() as usize);
    for range in plan.ranges() {
        let data = operator
            .read_with(remote_path)
            .range(range.as_range())
            .await
            .map_err(|e| backend.translate(e, remote_path))?;
        let staged = tempfile::tempfile().map_err(|e| local(&std::env::temp_dir(), e))?;
        let mut part = fs::File::from_std(staged);
        part.write_all(&data.to_vec())
            .await
            .map_err(|e| local(&std::env::temp_dir(), e))?;
        log::debug!(
            "downloaded chunk {} [{}, {}] of {remote_path}",
            range.index,
            range.start,
            range.end
        );
        parts.push((range, part));
    }

    let mut dest = create_new(local_path).await?;
    let mut copied = Ok(());
    for (_, part) in parts.iter_mut() {
        copied = concatenate(part, &mut dest)
            .await
            .map_err(|e| local(local_path, e));
        if copied.is_err() {
            break;
        }
    }
    finish(dest, local_path, copied).await?;
    Ok(parts.into_iter().map(|(range, _)| range).collect())
}

/// Recover the backend error carried by a byte-stream failure.
fn stream_error(backend: Backend, remote_path: &str, err: std::io::Error) -> Error {
    let message = err.to_string();
    match err.into_inner().map(|inner| inner.downcast::<opendal::Error>()) {
        Some(Ok(inner)) => backend.translate(*inner, remote_path),
        _ => Error::NetworkOrConfig {
            backend: backend.friendly_name().to_string(),
            message: format!("reading '{remote_path}' failed: {message}"),
        },
    }
}

async fn create_new(path: &Path) -> Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| local(path, e))
}

async fn concatenate(part: &mut fs::File, dest: &mut fs::File) -> std::io::Result<()> {
    part.seek(SeekFrom::Start(0)).await?;
    tokio::io::copy(part, dest).await?;
    Ok(())
}

/// Flush the destination, removing it if anything went wrong.
async fn finish(mut dest: fs::File, path: &Path, outcome: Result<()>) -> Result<()> {
    let outcome = match outcome {
        Ok(()) => dest.flush().await.map_err(|e| local(path, e)),
        Err(e) => Err(e),
    };
    drop(dest);
    if outcome.is_err() {
        if let Err(cleanup) = fs::remove_file(path).await {
            log::warn!("failed to remove partial download {}: {cleanup}", path.display());
        }
    }
    outcome
}
