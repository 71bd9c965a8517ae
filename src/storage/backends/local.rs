//! Local filesystem adapter, rooted at a directory.

use super::{list_from_tree, pull_from_tree};
use crate::error::Result;
use crate::storage::Backend;
use crate::storage::client::Client;
use crate::storage::constants::LOCAL_WRITE_CHUNK;
use crate::storage::credentials::Credentials;
use crate::storage::operations::delete::OpenDalDeleter;
use crate::storage::operations::mkdir::{ExistingDir, OpenDalMkdirer};
use crate::storage::operations::rmdir::OpenDalDirRemover;
use crate::storage::operations::upload::{OpenDalUploader, UploadPlan};
use crate::storage::operations::usage::OpenDalUsageCalculator;
use crate::storage::operations::{Deleter, DirRemover, Mkdirer, UsageCalculator};
use crate::storage::session::{ListingStyle, Session};
use crate::storage::utils::path::{dir_key, file_key};
use crate::storage::utils::size::format_size;
use opendal::Operator;
use std::path::{Path, PathBuf};

const LISTING: ListingStyle = ListingStyle::Recursive;

pub struct LocalClient {
    session: Session,
}

impl LocalClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            session: Session::new(Backend::Fs, credentials),
        }
    }

    pub fn with_operator(operator: Operator) -> Self {
        Self {
            session: Session::with_operator(Backend::Fs, operator),
        }
    }
}

impl Client for LocalClient {
    fn backend(&self) -> Backend {
        Backend::Fs
    }

    async fn list(&mut self, path: &str, as_tree: bool) -> Result<String> {
        list_from_tree(&mut self.session, LISTING, path, as_tree).await
    }

    async fn pull(&mut self, source: &str, dest: &Path, recursive: bool) -> Result<PathBuf> {
        pull_from_tree(&mut self.session, LISTING, None, source, dest, recursive).await
    }

    async fn push(&mut self, source: &Path, dest: &str, recursive: bool) -> Result<String> {
        let operator = self.session.operator().await?;
        let plan = UploadPlan::build(source, dest, recursive).await?;
        let uploader = OpenDalUploader::new(operator, Backend::Fs, LOCAL_WRITE_CHUNK);
        uploader.ensure_absent(&plan).await?;

        let outcome = uploader.upload_plan(&plan, true).await;
        self.session.invalidate();
        outcome?;
        Ok(file_key(dest))
    }

    async fn delete(&mut self, path: &str) -> Result<String> {
        let operator = self.session.operator().await?;
        let key = file_key(path);
        let outcome = OpenDalDeleter::new(operator, Backend::Fs).delete(&key).await;
        self.session.invalidate();
        outcome?;
        Ok(key)
    }

    async fn mkdir(&mut self, path: &str, make_parents: bool) -> Result<String> {
        let operator = self.session.operator().await?;
        let outcome = OpenDalMkdirer::new(operator, Backend::Fs, ExistingDir::Reject)
            .mkdir(path, make_parents)
            .await;
        self.session.invalidate();
        outcome?;
        Ok(dir_key(path))
    }

    async fn rmdir(&mut self, path: &str, recursive: bool) -> Result<String> {
        let operator = self.session.operator().await?;
        let outcome = OpenDalDirRemover::new(operator, Backend::Fs)
            .rmdir(path, recursive)
            .await;
        self.session.invalidate();
        outcome?;
        Ok(dir_key(path))
    }

    async fn filesize(&mut self, path: &str) -> Result<String> {
        let operator = self.session.operator().await?;
        let total = OpenDalUsageCalculator::new(operator, Backend::Fs)
            .total_size(path)
            .await?;
        Ok(format_size(total))
    }
}
