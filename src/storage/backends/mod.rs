// Backend adapters and the opendal operators behind them
use crate::error::{Error, RecursiveRequiredSnafu, Result};
use crate::storage::Backend;
use crate::storage::credentials::Credentials;
use crate::storage::operations::Downloader;
use crate::storage::operations::Lister;
use crate::storage::operations::download::OpenDalDownloader;
use crate::storage::session::{ListingStyle, Session};
use crate::storage::utils::path::file_key;
use opendal::Operator;
use snafu::ensure;
use std::path::{Path, PathBuf};

pub mod file_share;
pub mod local;
pub mod object_store;
pub mod sync_service;

pub use file_share::FileShareClient;
pub use local::LocalClient;
pub use object_store::ObjectStoreClient;
pub use sync_service::SyncServiceClient;

/// Build the opendal operator for `backend` from a validated credential record.
pub fn build_operator(backend: Backend, credentials: &Credentials) -> Result<Operator> {
    let field = |name: &str| credentials.get_str(name).unwrap_or_default();
    let config_error = |e: opendal::Error| Error::NetworkOrConfig {
        backend: backend.friendly_name().to_string(),
        message: e.to_string(),
    };

    match backend {
        Backend::S3 => {
            #[cfg(feature = "s3")]
            {
                let mut builder = opendal::services::S3::default()
                    .bucket(field("bucket_name"))
                    .region(field("region"))
                    .access_key_id(field("access_key"))
                    .secret_access_key(field("secret_access_key"))
                    .disable_config_load();
                if let Some(endpoint) = credentials.get_str("endpoint") {
                    builder = builder.endpoint(endpoint);
                }
                Ok(Operator::new(builder).map_err(config_error)?.finish())
            }

            #[cfg(not(feature = "s3"))]
            {
                Err(feature_disabled(backend))
            }
        }
        Backend::AzureFile => {
            #[cfg(feature = "azfile")]
            {
                let account = field("storage_account_name");
                let endpoint = credentials
                    .get_str("endpoint")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("https://{account}.file.core.windows.net"));
                let builder = opendal::services::Azfile::default()
                    .endpoint(&endpoint)
                    .account_name(account)
                    .account_key(field("storage_access_key"))
                    .share_name(field("file_share_name"));
                Ok(Operator::new(builder).map_err(config_error)?.finish())
            }

            #[cfg(not(feature = "azfile"))]
            {
                Err(feature_disabled(backend))
            }
        }
        Backend::Dropbox => {
            #[cfg(feature = "dropbox")]
            {
                let builder =
                    opendal::services::Dropbox::default().access_token(field("access_token"));
                Ok(Operator::new(builder).map_err(config_error)?.finish())
            }

            #[cfg(not(feature = "dropbox"))]
            {
                Err(feature_disabled(backend))
            }
        }
        Backend::Fs => {
            let builder = opendal::services::Fs::default().root(field("root_path"));
            Ok(Operator::new(builder).map_err(config_error)?.finish())
        }
    }
}

#[cfg(not(all(feature = "s3", feature = "azfile", feature = "dropbox")))]
fn feature_disabled(backend: Backend) -> Error {
    Error::NetworkOrConfig {
        backend: backend.friendly_name().to_string(),
        message: format!("support for '{}' was not compiled in (feature disabled)", backend.id()),
    }
}

/// Listing of `path` from the session's tree.
pub(crate) async fn list_from_tree(
    session: &mut Session,
    style: ListingStyle,
    path: &str,
    as_tree: bool,
) -> Result<String> {
    log::debug!(
        "list backend={:?} path={} as_tree={}",
        session.backend(),
        path,
        as_tree
    );
    session.tree(style).await?.list(path, as_tree)
}

/// Pull `source` into `dest`, using the session's tree to tell files from
/// directories. Files above `range_size` bytes are read in ranged pieces.
pub(crate) async fn pull_from_tree(
    session: &mut Session,
    style: ListingStyle,
    range_size: Option<u64>,
    source: &str,
    dest: &Path,
    recursive: bool,
) -> Result<PathBuf> {
    let operator = session.operator().await?;
    let mut downloader = OpenDalDownloader::new(operator, session.backend());
    if let Some(range_size) = range_size {
        downloader = downloader.ranged(range_size);
    }
    let key = file_key(source);
    log::debug!(
        "pull backend={:?} source={} dest={} recursive={}",
        session.backend(),
        key,
        dest.display(),
        recursive
    );

    let tree = session.tree(style).await?;
    if tree.file_exists(&key) {
        downloader.download_file(&key, dest).await?;
    } else {
        let node = tree.lookup_path(&key)?;
        ensure!(recursive, RecursiveRequiredSnafu { path: key.clone() });
        downloader.download_tree(&key, node, dest).await?;
    }
    Ok(dest.to_path_buf())
}
