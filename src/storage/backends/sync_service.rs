//! Consumer file-sync service adapter (Dropbox).
//!
//! The whole namespace comes back from one recursive listing that carries
//! folder metadata, and destination checks are answered from that tree. The
//! service has no directory operations exposed here.

use super::{list_from_tree, pull_from_tree};
use crate::error::Result;
use crate::storage::Backend;
use crate::storage::client::Client;
use crate::storage::constants::SYNC_SERVICE_UPLOAD_CHUNK;
use crate::storage::credentials::Credentials;
use crate::storage::operations::delete::OpenDalDeleter;
use crate::storage::operations::upload::{OpenDalUploader, UploadPlan};
use crate::storage::operations::usage::OpenDalUsageCalculator;
use crate::storage::operations::{Deleter, UsageCalculator};
use crate::storage::session::{ListingStyle, Session};
use crate::storage::utils::path::file_key;
use crate::storage::utils::size::format_size;
use opendal::Operator;
use std::path::{Path, PathBuf};

const LISTING: ListingStyle = ListingStyle::Recursive;

pub struct SyncServiceClient {
    session: Session,
}

impl SyncServiceClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            session: Session::new(Backend::Dropbox, credentials),
        }
    }

    pub fn with_operator(operator: Operator) -> Self {
        Self {
            session: Session::with_operator(Backend::Dropbox, operator),
        }
    }
}

impl Client for SyncServiceClient {
    fn backend(&self) -> Backend {
        Backend::Dropbox
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
        let tree = self.session.tree(LISTING).await?;
        plan.ensure_absent(|path| tree.file_exists(path))?;

        // Uploads create missing parent folders on their own.
        let uploader = OpenDalUploader::new(operator, Backend::Dropbox, SYNC_SERVICE_UPLOAD_CHUNK);
        let outcome = uploader.upload_plan(&plan, false).await;
        self.session.invalidate();
        outcome?;
        Ok(file_key(dest))
    }

    async fn delete(&mut self, path: &str) -> Result<String> {
        let operator = self.session.operator().await?;
        let key = file_key(path);
        let outcome = OpenDalDeleter::new(operator, Backend::Dropbox)
            .delete(&key)
            .await;
        self.session.invalidate();
        outcome?;
        Ok(key)
    }

    async fn filesize(&mut self, path: &str) -> Result<String> {
        let operator = self.session.operator().await?;
        let total = OpenDalUsageCalculator::new(operator, Backend::Dropbox)
            .total_size(path)
            .await?;
        Ok(format_size(total))
    }
}
