use crate::error::{Result, UnsupportedSnafu};
use crate::storage::Backend;
use std::path::{Path, PathBuf};

/// Operations every storage backend offers.
///
/// Paths are slash-delimited and relative to the backend root; a leading slash
/// is optional. Implementations connect on first use and keep a cached
/// directory tree that they refresh after every mutation.
#[allow(async_fn_in_trait)]
pub trait Client {
    fn backend(&self) -> Backend;

    /// Listing of the directory at `path`: immediate children, or the whole
    /// subtree drawn as a tree.
    async fn list(&mut self, path: &str, as_tree: bool) -> Result<String>;

    /// Copy the remote file (or, with `recursive`, directory) at `source` to
    /// the new local path `dest`, which is returned.
    async fn pull(&mut self, source: &str, dest: &Path, recursive: bool) -> Result<PathBuf>;

    /// Copy the local file (or, with `recursive`, directory) at `source` to
    /// the remote path `dest`, which is returned normalized.
    async fn push(&mut self, source: &Path, dest: &str, recursive: bool) -> Result<String>;

    /// Delete the remote file at `path`.
    async fn delete(&mut self, path: &str) -> Result<String>;

    async fn mkdir(&mut self, _path: &str, _make_parents: bool) -> Result<String> {
        UnsupportedSnafu {
            operation: "mkdir",
            backend: self.backend().friendly_name(),
        }
        .fail()
    }

    async fn rmdir(&mut self, _path: &str, _recursive: bool) -> Result<String> {
        UnsupportedSnafu {
            operation: "rmdir",
            backend: self.backend().friendly_name(),
        }
        .fail()
    }

    /// Human-readable total size of the file or directory at `path`.
    async fn filesize(&mut self, path: &str) -> Result<String>;
}
