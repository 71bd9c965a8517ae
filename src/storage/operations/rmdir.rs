use super::{dir_present, first_child};
use crate::error::{DirectoryNotEmptySnafu, NotFoundSnafu, Result, UnsupportedSnafu};
use crate::storage::Backend;
use crate::storage::utils::path::dir_key;
use opendal::Operator;
use snafu::ensure;

/// Trait for removing directories from storage.
pub trait DirRemover {
    /// Remove the directory at `path`.
    ///
    /// # Arguments
    /// * `path` - Directory to remove
    /// * `recursive` - Whether a non-empty directory may be removed with its contents
    ///
    /// # Returns
    /// * `Result<()>` - `NotFound` or `DirectoryNotEmpty` on refusal
    async fn rmdir(&self, path: &str, recursive: bool) -> Result<()>;
}

/// Implementation of DirRemover for OpenDAL Operator.
pub struct OpenDalDirRemover {
    operator: Operator,
    backend: Backend,
}

impl OpenDalDirRemover {
    pub fn new(operator: Operator, backend: Backend) -> Self {
        Self { operator, backend }
    }
}

impl DirRemover for OpenDalDirRemover {
    async fn rmdir(&self, path: &str, recursive: bool) -> Result<()> {
        let key = dir_key(path);
        log::debug!(
            "rmdir backend={:?} path={} recursive={}",
            self.backend,
            key,
            recursive
        );
        ensure!(
            !key.is_empty(),
            UnsupportedSnafu {
                operation: "rmdir of the root directory",
                backend: self.backend.friendly_name(),
            }
        );
        ensure!(
            dir_present(&self.operator, self.backend, &key).await?,
            NotFoundSnafu { path: key.clone() }
        );
        if !recursive {
            let child = first_child(&self.operator, self.backend, &key).await?;
            ensure!(child.is_none(), DirectoryNotEmptySnafu { path: key.clone() });
        }

        self.operator
            .remove_all(&key)
            .await
            .map_err(|e| self.backend.translate(e, &key))
    }
}
