// Directory creation operation trait and implementation
use super::dir_present;
use crate::error::{AlreadyExistsSnafu, NotFoundSnafu, Result};
use crate::storage::Backend;
use crate::storage::utils::path::{dir_key, parent, segments};
use opendal::Operator;
use snafu::ensure;

/// What creating a directory that already exists means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingDir {
    /// Fail with `AlreadyExists`.
    Reject,
    /// Treat as success.
    Accept,
}

/// Trait for creating directories in storage.
pub trait Mkdirer {
    /// Create a directory in storage.
    ///
    /// # Arguments
    /// * `path` - Path of the directory to create
    /// * `parents` - Whether to create missing parent directories
    ///
    /// # Returns
    /// * `Result<()>` - `NotFound` for a missing parent without `parents`
    async fn mkdir(&self, path: &str, parents: bool) -> Result<()>;
}

/// Implementation of Mkdirer for OpenDAL Operator.
pub struct OpenDalMkdirer {
    operator: Operator,
    backend: Backend,
    existing: ExistingDir,
}

impl OpenDalMkdirer {
    /// Create a new mkdirer with the given OpenDAL operator.
    pub fn new(operator: Operator, backend: Backend, existing: ExistingDir) -> Self {
        Self {
            operator,
            backend,
            existing,
        }
    }

    async fn create(&self, key: &str) -> Result<()> {
        self.operator
            .create_dir(key)
            .await
            .map_err(|e| self.backend.translate(e, key))
    }
}

impl Mkdirer for OpenDalMkdirer {
    async fn mkdir(&self, path: &str, parents: bool) -> Result<()> {
        let key = dir_key(path);
        log::debug!(
            "mkdir backend={:?} path={} parents={}",
            self.backend,
            key,
            parents
        );

        if dir_present(&self.operator, self.backend, &key).await? {
            ensure!(
                self.existing == ExistingDir::Accept,
                AlreadyExistsSnafu {
                    path: if key.is_empty() { "/".to_string() } else { key.clone() }
                }
            );
            return Ok(());
        }

        if parents {
            let segs = segments(&key);
            for depth in 1..segs.len() {
                let ancestor = dir_key(&segs[..depth].join("/"));
                if !dir_present(&self.operator, self.backend, &ancestor).await? {
                    self.create(&ancestor).await?;
                }
            }
        } else {
            let parent_key = dir_key(&parent(&key));
            ensure!(
                dir_present(&self.operator, self.backend, &parent_key).await?,
                NotFoundSnafu {
                    path: parent(&key)
                }
            );
        }

        self.create(&key).await
    }
}
