//! Network file share adapter (Azure Files).
//!
//! The share has real directories, so the tree is built one directory listing
//! at a time and a file can only be created inside an existing directory.
//! Uploads are written as in-order 4 MiB ranges and large downloads are fetched
//! in ranged pieces. A range write that fails part way leaves a partially
//! written file on the share; the adapter deletes it on a best-effort basis.

use super::{list_from_tree, pull_from_tree};
use crate::error::{NotFoundSnafu, Result};
use crate::storage::Backend;
use crate::storage::client::Client;
use crate::storage::constants::{FILE_SHARE_MAX_RANGE_READ, FILE_SHARE_MAX_RANGE_WRITE};
use crate::storage::credentials::Credentials;
use crate::storage::operations::delete::OpenDalDeleter;
use crate::storage::operations::dir_present;
use crate::storage::operations::mkdir::{ExistingDir, OpenDalMkdirer};
use crate::storage::operations::rmdir::OpenDalDirRemover;
use crate::storage::operations::upload::{OpenDalUploader, UploadPlan};
use crate::storage::operations::usage::OpenDalUsageCalculator;
use crate::storage::operations::{Deleter, DirRemover, Mkdirer, UsageCalculator};
use crate::storage::session::{ListingStyle, Session};
use crate::storage::utils::path::{dir_key, file_key, parent};
use crate::storage::utils::size::format_size;
use opendal::Operator;
use snafu::ensure;
use std::path::{Path, PathBuf};

const LISTING: ListingStyle = ListingStyle::PerDirectory;

pub struct FileShareClient {
    session: Session,
}

impl FileShareClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            session: Session::new(Backend::AzureFile, credentials),
        }
    }

    pub fn with_operator(operator: Operator) -> Self {
        Self {
            session: Session::with_operator(Backend::AzureFile, operator),
        }
    }
}

impl Client for FileShareClient {
    fn backend(&self) -> Backend {
        Backend::AzureFile
    }

    async fn list(&mut self, path: &str, as_tree: bool) -> Result<String> {
        list_from_tree(&mut self.session, LISTING, path, as_tree).await
    }

    async fn pull(&mut self, source: &str, dest: &Path, recursive: bool) -> Result<PathBuf> {
        pull_from_tree(
            &mut self.session,
            LISTING,
            Some(FILE_SHARE_MAX_RANGE_READ),
            source,
            dest,
            recursive,
        )
        .await
    }

    async fn push(&mut self, source: &Path, dest: &str, recursive: bool) -> Result<String> {
        let operator = self.session.operator().await?;
        let plan = UploadPlan::build(source, dest, recursive).await?;

        let target = file_key(dest);
        let parent_dir = parent(&target);
        ensure!(
            dir_present(&operator, Backend::AzureFile, &dir_key(&parent_dir)).await?,
            NotFoundSnafu { path: parent_dir }
        );

        let uploader =
            OpenDalUploader::new(operator, Backend::AzureFile, FILE_SHARE_MAX_RANGE_WRITE)
                .removing_partial();
        uploader.ensure_absent(&plan).await?;

        let outcome = uploader.upload_plan(&plan, true).await;
        self.session.invalidate();
        outcome?;
        Ok(target)
    }

    async fn delete(&mut self, path: &str) -> Result<String> {
        let operator = self.session.operator().await?;
        let key = file_key(path);
        let outcome = OpenDalDeleter::new(operator, Backend::AzureFile)
            .delete(&key)
            .await;
        self.session.invalidate();
        outcome?;
        Ok(key)
    }

    /// Creating a directory that already exists succeeds.
    async fn mkdir(&mut self, path: &str, make_parents: bool) -> Result<String> {
        let operator = self.session.operator().await?;
        let outcome = OpenDalMkdirer::new(operator, Backend::AzureFile, ExistingDir::Accept)
            .mkdir(path, make_parents)
            .await;
        self.session.invalidate();
        outcome?;
        Ok(dir_key(path))
    }

    async fn rmdir(&mut self, path: &str, recursive: bool) -> Result<String> {
        let operator = self.session.operator().await?;
        let outcome = OpenDalDirRemover::new(operator, Backend::AzureFile)
            .rmdir(path, recursive)
            .await;
        self.session.invalidate();
        outcome?;
        Ok(dir_key(path))
    }

    async fn filesize(&mut self, path: &str) -> Result<String> {
        let operator = self.session.operator().await?;
        let total = OpenDalUsageCalculator::new(operator, Backend::AzureFile)
            .total_size(path)
            .await?;
        Ok(format_size(total))
    }
}
