// Storage operation traits and their opendal implementations
use crate::error::Result;
use crate::storage::Backend;
use futures::stream::TryStreamExt;
use opendal::Operator;

pub mod delete;
pub mod download;
pub mod list;
pub mod mkdir;
pub mod rmdir;
pub mod upload;
pub mod usage;

pub use delete::Deleter;
pub use download::Downloader;
pub use list::Lister;
pub use mkdir::Mkdirer;
pub use rmdir::DirRemover;
pub use upload::Uploader;
pub use usage::UsageCalculator;

/// Whether the directory `key` ("a/b/") exists. The root always exists.
///
/// Object stores may hold a prefix without a marker object, so a failed stat
/// falls back to looking for any entry under the prefix.
pub async fn dir_present(operator: &Operator, backend: Backend, key: &str) -> Result<bool> {
    if key.is_empty() {
        return Ok(true);
    }
    match operator.stat(key).await {
        Ok(meta) => return Ok(meta.mode().is_dir()),
        Err(e) if e.kind() == opendal::ErrorKind::NotFound => {}
        Err(e) => return Err(backend.translate(e, key)),
    }
    Ok(first_child(operator, backend, key).await?.is_some())
}

/// First entry listed under the directory `key`, skipping the directory itself.
pub async fn first_child(
    operator: &Operator,
    backend: Backend,
    key: &str,
) -> Result<Option<String>> {
    let mut lister = match operator.lister(key).await {
        Ok(lister) => lister,
        Err(e) if e.kind() == opendal::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(backend.translate(e, key)),
    };
    while let Some(entry) = lister
        .try_next()
        .await
        .map_err(|e| backend.translate(e, key))?
    {
        if entry.path() != key {
            return Ok(Some(entry.path().to_string()));
        }
    }
    Ok(None)
}
