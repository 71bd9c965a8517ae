use crate::error::{AlreadyExistsSnafu, Error, RecursiveRequiredSnafu, Result};
use crate::storage::Backend;
use crate::storage::chunked::{ChunkRange, upload_chunked};
use crate::storage::utils::error::local;
use crate::storage::utils::path::{build_remote_path, dir_key, file_key};
use opendal::Operator;
use snafu::ensure;
use std::path::{Path, PathBuf};
use tokio::fs;

/// One local file and the remote key it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    pub local_path: PathBuf,
    pub remote_path: String,
}

/// Everything a push will create, resolved before any byte is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPlan {
    /// Remote directory keys ("a/b/"), parents before children.
    pub dirs: Vec<String>,
    pub files: Vec<PlannedUpload>,
}

impl UploadPlan {
    /// Resolve `source` against the remote destination `dest`.
    ///
    /// A file maps to `dest` itself. A directory (only with `recursive`) maps
    /// to `dest/` plus every non-hidden entry below it, walked without
    /// recursion.
    pub async fn build(source: &Path, dest: &str, recursive: bool) -> Result<Self> {
        let meta = fs::metadata(source).await.map_err(|e| local(source, e))?;
        if !meta.is_dir() {
            return Ok(Self {
                dirs: Vec::new(),
                files: vec![PlannedUpload {
                    local_path: source.to_path_buf(),
                    remote_path: file_key(dest),
                }],
            });
        }
        ensure!(
            recursive,
            RecursiveRequiredSnafu {
                path: source.display().to_string()
            }
        );

        let mut plan = Self::default();
        let mut pending = vec![(source.to_path_buf(), file_key(dest))];
        while let Some((local_dir, remote_dir)) = pending.pop() {
            plan.dirs.push(dir_key(&remote_dir));
            let mut entries = fs::read_dir(&local_dir)
                .await
                .map_err(|e| local(&local_dir, e))?;
            let mut children = Vec::new();
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| local(&local_dir, e))?
            {
                children.push(entry);
            }
            children.sort_by_key(|entry| entry.file_name());

            for entry in children {
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    log::debug!("skipping hidden entry {}", entry.path().display());
                    continue;
                }
                let remote_path = build_remote_path(&remote_dir, &name);
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| local(&entry.path(), e))?;
                if file_type.is_dir() {
                    pending.push((entry.path(), remote_path));
                } else {
                    plan.files.push(PlannedUpload {
                        local_path: entry.path(),
                        remote_path,
                    });
                }
            }
        }
        plan.dirs.sort();
        Ok(plan)
    }

    /// Fail with `AlreadyExists` on the first destination `exists` reports.
    pub fn ensure_absent(&self, mut exists: impl FnMut(&str) -> bool) -> Result<()> {
        for file in &self.files {
            ensure!(
                !exists(&file.remote_path),
                AlreadyExistsSnafu {
                    path: file.remote_path.clone()
                }
            );
        }
        Ok(())
    }
}

/// Trait for uploading local files to storage.
pub trait Uploader {
    /// Upload a single local file to `remote_path`.
    ///
    /// # Arguments
    /// * `local_path` - Source file on the local filesystem
    /// * `remote_path` - Destination key in storage
    ///
    /// # Returns
    /// * `Result<Vec<ChunkRange>>` - The byte ranges that were sent
    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<Vec<ChunkRange>>;
}

/// Implementation of Uploader for OpenDAL Operator.
pub struct OpenDalUploader {
    operator: Operator,
    backend: Backend,
    chunk_size: u64,
    remove_partial: bool,
}

impl OpenDalUploader {
    /// Create a new uploader sending at most `chunk_size` bytes per request.
    pub fn new(operator: Operator, backend: Backend, chunk_size: u64) -> Self {
        Self {
            operator,
            backend,
            chunk_size,
            remove_partial: false,
        }
    }

    /// Delete whatever a failed upload left behind at the destination.
    pub fn removing_partial(mut self) -> Self {
        self.remove_partial = true;
        self
    }

    /// Stat every destination of `plan`; `AlreadyExists` on the first hit.
    pub async fn ensure_absent(&self, plan: &UploadPlan) -> Result<()> {
        for file in &plan.files {
            match self.operator.stat(&file.remote_path).await {
                Ok(_) => {
                    return AlreadyExistsSnafu {
                        path: file.remote_path.clone(),
                    }
                    .fail();
                }
                Err(e) if e.kind() == opendal::ErrorKind::NotFound => {}
                Err(e) => return Err(self.backend.translate(e, &file.remote_path)),
            }
        }
        Ok(())
    }

    /// Upload every file of `plan`, creating its directories first when asked.
    pub async fn upload_plan(&self, plan: &UploadPlan, create_dirs: bool) -> Result<()> {
        if create_dirs {
            for dir in plan.dirs.iter().filter(|dir| !dir.is_empty()) {
                match self.operator.create_dir(dir).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == opendal::ErrorKind::AlreadyExists => {}
                    Err(e) => return Err(self.backend.translate(e, dir)),
                }
            }
        }
        for file in &plan.files {
            self.upload(&file.local_path, &file.remote_path).await?;
        }
        Ok(())
    }
}

impl Uploader for OpenDalUploader {
    async fn upload(&self, local_path: &Path, remote_path: &str) -> Result<Vec<ChunkRange>> {
        log::debug!(
            "upload backend={:?} local_path={} remote_path={}",
            self.backend,
            local_path.display(),
            remote_path
        );
        let outcome = upload_chunked(
            &self.operator,
            self.backend,
            local_path,
            remote_path,
            self.chunk_size,
        )
        .await;

        let failed_remotely = outcome
            .as_ref()
            .is_err_and(|err| !matches!(err, Error::LocalNotFound { .. } | Error::Io { .. }));
        if self.remove_partial && failed_remotely {
            if let Err(cleanup) = self.operator.delete(remote_path).await {
                log::warn!("failed to remove partial upload {remote_path}: {cleanup}");
            }
        }
        outcome
    }
}
