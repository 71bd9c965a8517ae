use crate::error::{Error, InvalidCredentialsSnafu, Result};
use snafu::ensure;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub mod backends;
pub mod chunked;
pub mod client;
pub mod constants;
pub mod credentials;
pub mod operations;
pub mod session;
pub mod tree;
pub mod utils;

use self::backends::{FileShareClient, LocalClient, ObjectStoreClient, SyncServiceClient};
pub use self::client::Client;
use self::credentials::{CredentialField, Credentials};

/// Storage backend families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    S3,
    AzureFile,
    Dropbox,
    Fs,
}

const S3_SCHEMA: &[CredentialField] = &[
    CredentialField::string("access_key"),
    CredentialField::string("secret_access_key"),
    CredentialField::string("region"),
    CredentialField::string("bucket_name"),
];

const AZURE_FILE_SCHEMA: &[CredentialField] = &[
    CredentialField::string("storage_account_name"),
    CredentialField::string("storage_access_key"),
    CredentialField::string("file_share_name"),
];

const DROPBOX_SCHEMA: &[CredentialField] = &[CredentialField::string("access_token")];

const FS_SCHEMA: &[CredentialField] = &[CredentialField::string("root_path")];

impl Backend {
    /// Canonical registry id.
    pub fn id(self) -> &'static str {
        self.registration().id
    }

    pub fn friendly_name(self) -> &'static str {
        self.registration().friendly_name
    }

    /// Fields a credential record must carry for this backend.
    pub fn schema(self) -> &'static [CredentialField] {
        self.registration().schema
    }

    pub fn registration(self) -> &'static Registration {
        match self {
            Backend::S3 => &REGISTRY[0],
            Backend::AzureFile => &REGISTRY[1],
            Backend::Dropbox => &REGISTRY[2],
            Backend::Fs => &REGISTRY[3],
        }
    }

    /// Map an opendal failure on `path` into the crate's error taxonomy.
    pub fn translate(self, err: opendal::Error, path: &str) -> Error {
        utils::error::translate(self, err, path)
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "s3" | "aws_s3" | "minio" => Ok(Self::S3),
            "azure" | "azfile" => Ok(Self::AzureFile),
            "dropbox" => Ok(Self::Dropbox),
            "local" | "fs" => Ok(Self::Fs),
            _ => Err(Error::InvalidBackend {
                backend: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One entry of the backend registry.
pub struct Registration {
    pub backend: Backend,
    pub id: &'static str,
    pub friendly_name: &'static str,
    pub schema: &'static [CredentialField],
    pub connect: fn(Credentials) -> StorageClient,
}

fn connect_s3(credentials: Credentials) -> StorageClient {
    StorageClient::ObjectStore(ObjectStoreClient::new(credentials))
}

fn connect_azure_file(credentials: Credentials) -> StorageClient {
    StorageClient::FileShare(FileShareClient::new(credentials))
}

fn connect_dropbox(credentials: Credentials) -> StorageClient {
    StorageClient::SyncService(SyncServiceClient::new(credentials))
}

fn connect_fs(credentials: Credentials) -> StorageClient {
    StorageClient::Local(LocalClient::new(credentials))
}

/// Every backend this build knows about, in display order.
pub static REGISTRY: &[Registration] = &[
    Registration {
        backend: Backend::S3,
        id: "s3",
        friendly_name: "Amazon S3",
        schema: S3_SCHEMA,
        connect: connect_s3,
    },
    Registration {
        backend: Backend::AzureFile,
        id: "azure",
        friendly_name: "Azure Storage",
        schema: AZURE_FILE_SCHEMA,
        connect: connect_azure_file,
    },
    Registration {
        backend: Backend::Dropbox,
        id: "dropbox",
        friendly_name: "Dropbox",
        schema: DROPBOX_SCHEMA,
        connect: connect_dropbox,
    },
    Registration {
        backend: Backend::Fs,
        id: "local",
        friendly_name: "Local Filesystem",
        schema: FS_SCHEMA,
        connect: connect_fs,
    },
];

/// Resolves a backend id and credential record into a client.
pub struct ClientFactory;

impl ClientFactory {
    /// Validate `credentials` against the backend's schema and construct its
    /// adapter. Nothing is sent over the network until the first operation.
    pub fn for_backend(id: &str, credentials: &Credentials) -> Result<StorageClient> {
        let backend = Backend::from_str(id)?;
        let registration = backend.registration();
        let valid = credentials::validate(registration.schema, credentials);
        if !valid {
            log::debug!(
                "rejecting credentials for {}: {}",
                registration.id,
                credentials::problems(registration.schema, credentials).join(", ")
            );
        }
        ensure!(
            valid,
            InvalidCredentialsSnafu {
                backend: registration.friendly_name
            }
        );
        log::debug!("constructing client backend={backend:?}");
        Ok((registration.connect)(credentials.clone()))
    }

    /// Registered backends, in display order.
    pub fn available() -> impl Iterator<Item = &'static Registration> {
        REGISTRY.iter()
    }
}

/// A client for any registered backend.
pub enum StorageClient {
    ObjectStore(ObjectStoreClient),
    FileShare(FileShareClient),
    SyncService(SyncServiceClient),
    Local(LocalClient),
}

macro_rules! dispatch {
    ($self:ident, $client:ident => $call:expr) => {
        match $self {
            StorageClient::ObjectStore($client) => $call,
            StorageClient::FileShare($client) => $call,
            StorageClient::SyncService($client) => $call,
            StorageClient::Local($client) => $call,
        }
    };
}

impl Client for StorageClient {
    fn backend(&self) -> Backend {
        dispatch!(self, client => client.backend())
    }

    async fn list(&mut self, path: &str, as_tree: bool) -> Result<String> {
        dispatch!(self, client => client.list(path, as_tree).await)
    }

    async fn pull(&mut self, source: &str, dest: &Path, recursive: bool) -> Result<PathBuf> {
        dispatch!(self, client => client.pull(source, dest, recursive).await)
    }

    async fn push(&mut self, source: &Path, dest: &str, recursive: bool) -> Result<String> {
        dispatch!(self, client => client.push(source, dest, recursive).await)
    }

    async fn delete(&mut self, path: &str) -> Result<String> {
        dispatch!(self, client => client.delete(path).await)
    }

    async fn mkdir(&mut self, path: &str, make_parents: bool) -> Result<String> {
        dispatch!(self, client => client.mkdir(path, make_parents).await)
    }

    async fn rmdir(&mut self, path: &str, recursive: bool) -> Result<String> {
        dispatch!(self, client => client.rmdir(path, recursive).await)
    }

    async fn filesize(&mut self, path: &str) -> Result<String> {
        dispatch!(self, client => client.filesize(path).await)
    }
}
