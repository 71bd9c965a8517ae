// Delete operation trait and implementation
use crate::error::{NotFoundSnafu, Result};
use crate::storage::Backend;
use opendal::Operator;
use snafu::ensure;

/// Trait for deleting single files from storage.
pub trait Deleter {
    /// Delete one remote file.
    ///
    /// # Arguments
    /// * `path` - Key of the file to delete
    ///
    /// # Returns
    /// * `Result<()>` - `NotFound` when no file lives at `path`
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Implementation of Deleter for OpenDAL Operator.
pub struct OpenDalDeleter {
    operator: Operator,
    backend: Backend,
}

impl OpenDalDeleter {
    /// Create a new deleter with the given OpenDAL operator.
    pub fn new(operator: Operator, backend: Backend) -> Self {
        Self { operator, backend }
    }
}

impl Deleter for OpenDalDeleter {
    async fn delete(&self, path: &str) -> Result<()> {
        log::debug!("delete backend={:?} path={}", self.backend, path);
        // Directories are removed through rmdir, never here.
        let meta = self
            .operator
            .stat(path)
            .await
            .map_err(|e| self.backend.translate(e, path))?;
        ensure!(
            !meta.mode().is_dir(),
            NotFoundSnafu {
                path: path.to_string()
            }
        );
        self.operator
            .delete(path)
            .await
            .map_err(|e| self.backend.translate(e, path))
    }
}
