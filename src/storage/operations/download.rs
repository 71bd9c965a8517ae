use crate::error::{LocalAlreadyExistsSnafu, Result};
use crate::storage::Backend;
use crate::storage::chunked::{ChunkRange, download_chunked};
use crate::storage::tree::TreeNode;
use crate::storage::utils::error::local;
use crate::storage::utils::path::build_remote_path;
use opendal::Operator;
use snafu::ensure;
use std::path::Path;
use tokio::fs;

/// Trait for downloading files and directories from storage.
pub trait Downloader {
    /// Download a single remote file into a new local file.
    ///
    /// # Arguments
    /// * `remote_path` - Source key in storage
    /// * `local_path` - Destination on the local filesystem; must not exist
    ///
    /// # Returns
    /// * `Result<Vec<ChunkRange>>` - The byte ranges that were read
    async fn download_file(&self, remote_path: &str, local_path: &Path)
    -> Result<Vec<ChunkRange>>;

    /// Download every file below `tree`, rooted at `remote_root`, into a new
    /// local directory mirroring its layout.
    async fn download_tree(&self, remote_root: &str, tree: &TreeNode, local_path: &Path)
    -> Result<()>;
}

/// Implementation of Downloader for OpenDAL Operator.
pub struct OpenDalDownloader {
    operator: Operator,
    backend: Backend,
    chunk_size: Option<u64>,
}

impl OpenDalDownloader {
    /// Create a downloader that reads each file in one request.
    pub fn new(operator: Operator, backend: Backend) -> Self {
        Self {
            operator,
            backend,
            chunk_size: None,
        }
    }

    /// Read files larger than `chunk_size` in ranged pieces.
    pub fn ranged(mut self, chunk_size: u64) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }
}

impl Downloader for OpenDalDownloader {
    async fn download_file(
        &self,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<Vec<ChunkRange>> {
        let meta = self
            .operator
            .stat(remote_path)
            .await
            .map_err(|e| self.backend.translate(e, remote_path))?;
        let total_size = meta.content_length();
        log::debug!(
            "download backend={:?} remote_path={} local_path={} size={}",
            self.backend,
            remote_path,
            local_path.display(),
            total_size
        );
        download_chunked(
            &self.operator,
            self.backend,
            remote_path,
            local_path,
            total_size,
            self.chunk_size.unwrap_or(total_size),
        )
        .await
    }

    async fn download_tree(
        &self,
        remote_root: &str,
        tree: &TreeNode,
        local_path: &Path,
    ) -> Result<()> {
        let exists = fs::try_exists(local_path)
            .await
            .map_err(|e| local(local_path, e))?;
        ensure!(
            !exists,
            LocalAlreadyExistsSnafu {
                path: local_path.to_path_buf()
            }
        );
        fs::create_dir(local_path)
            .await
            .map_err(|e| local(local_path, e))?;

        for dir in tree.dir_paths() {
            let target = local_path.join(&dir);
            fs::create_dir_all(&target)
                .await
                .map_err(|e| local(&target, e))?;
        }
        for file in tree.file_paths() {
            self.download_file(
                &build_remote_path(remote_root, &file),
                &local_path.join(&file),
            )
            .await?;
        }
        Ok(())
    }
}
