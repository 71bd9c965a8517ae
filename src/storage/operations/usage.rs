use super::dir_present;
use crate::error::{NotFoundSnafu, Result};
use crate::storage::Backend;
use crate::storage::utils::path::{dir_key, file_key, listing_root};
use futures::stream::TryStreamExt;
use opendal::Operator;
use snafu::ensure;

/// Trait for calculating storage usage.
pub trait UsageCalculator {
    /// Total size in bytes of the file at `path`, or of everything below the
    /// directory or prefix at `path`.
    ///
    /// # Returns
    /// * `Result<u64>` - `NotFound` when nothing lives at `path`
    async fn total_size(&self, path: &str) -> Result<u64>;
}

/// Implementation of UsageCalculator for OpenDAL Operator.
pub struct OpenDalUsageCalculator {
    operator: Operator,
    backend: Backend,
}

impl OpenDalUsageCalculator {
    /// Create a new usage calculator with the given OpenDAL operator.
    pub fn new(operator: Operator, backend: Backend) -> Self {
        Self { operator, backend }
    }
}

impl UsageCalculator for OpenDalUsageCalculator {
    async fn total_size(&self, path: &str) -> Result<u64> {
        let key = file_key(path);
        if !key.is_empty() && !path.ends_with('/') {
            match self.operator.stat(&key).await {
                Ok(meta) if meta.mode().is_file() => return Ok(meta.content_length()),
                Ok(_) => {}
                Err(e) if e.kind() == opendal::ErrorKind::NotFound => {}
                Err(e) => return Err(self.backend.translate(e, &key)),
            }
        }

        let prefix = dir_key(path);
        let listing = listing_root(path);
        let listing_path = listing.as_str();
        let lister = match self.operator.lister_with(listing_path).recursive(true).await {
            Ok(lister) => lister,
            Err(e) if e.kind() == opendal::ErrorKind::NotFound => {
                return NotFoundSnafu { path: key }.fail();
            }
            Err(e) => return Err(self.backend.translate(e, listing_path)),
        };

        let (total, matched) = lister
            .map_err(|e| self.backend.translate(e, listing_path))
            .try_fold((0u64, 0usize), |(size, count), entry| async move {
                if entry.path() == listing_path {
                    return Ok((size, count));
                }
                let meta = entry.metadata();
                if !meta.mode().is_file() {
                    return Ok((size, count + 1));
                }
                let length = match meta.content_length() {
                    // Some listings omit lengths; ask for the object itself.
                    0 => self
                        .operator
                        .stat(entry.path())
                        .await
                        .map_err(|e| self.backend.translate(e, entry.path()))?
                        .content_length(),
                    known => known,
                };
                Ok((size + length, count + 1))
            })
            .await?;

        if matched == 0 {
            // An empty directory holds nothing but still exists.
            ensure!(
                dir_present(&self.operator, self.backend, &prefix).await?,
                NotFoundSnafu { path: key }
            );
        }
        log::debug!(
            "total_size backend={:?} path={} entries={} bytes={}",
            self.backend,
            listing_path,
            matched,
            total
        );
        Ok(total)
    }
}
