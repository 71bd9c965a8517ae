use snafu::Snafu;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid credentials given for '{backend}'"))]
    InvalidCredentials { backend: String },

    #[snafu(display("Credentials for '{backend}' have expired"))]
    ExpiredCredentials { backend: String },

    #[snafu(display("Unsupported storage backend: {backend}"))]
    InvalidBackend { backend: String },

    #[snafu(display("Remote resource '{path}' not found"))]
    NotFound { path: String },

    #[snafu(display("Remote resource already exists at '{path}'"))]
    AlreadyExists { path: String },

    #[snafu(display(
        "Directory '{path}' is non-empty, use the recursive option to delete it and all contents"
    ))]
    DirectoryNotEmpty { path: String },

    #[snafu(display("Local resource '{}' not found", path.display()))]
    LocalNotFound { path: PathBuf },

    #[snafu(display("Resource already exists at local path '{}'", path.display()))]
    LocalAlreadyExists { path: PathBuf },

    #[snafu(display("{backend}: {message}"))]
    NetworkOrConfig { backend: String, message: String },

    #[snafu(display("'{operation}' is not supported by {backend}"))]
    Unsupported { operation: String, backend: String },

    #[snafu(display("'{path}' is a directory, use the recursive option to transfer it"))]
    RecursiveRequired { path: String },

    #[snafu(display("Environment variable '{key}' is required but not found"))]
    MissingEnvVar { key: String },

    #[snafu(display("Failed to download '{remote_path}' to '{local_path}': {source}"))]
    DownloadFailed {
        remote_path: String,
        local_path: String,
        source: Box<Error>,
    },

    #[snafu(display("Failed to upload '{local_path}' to '{remote_path}': {source}"))]
    UploadFailed {
        local_path: String,
        remote_path: String,
        source: Box<Error>,
    },

    #[snafu(display("IO error on '{}': {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Flat classification of [`Error`], stable across context wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidCredentials,
    ExpiredCredentials,
    InvalidBackend,
    NotFound,
    AlreadyExists,
    DirectoryNotEmpty,
    LocalNotFound,
    LocalAlreadyExists,
    NetworkOrConfig,
    Unsupported,
    RecursiveRequired,
    Config,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidCredentials { .. } => ErrorKind::InvalidCredentials,
            Error::ExpiredCredentials { .. } => ErrorKind::ExpiredCredentials,
            Error::InvalidBackend { .. } => ErrorKind::InvalidBackend,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Error::DirectoryNotEmpty { .. } => ErrorKind::DirectoryNotEmpty,
            Error::LocalNotFound { .. } => ErrorKind::LocalNotFound,
            Error::LocalAlreadyExists { .. } => ErrorKind::LocalAlreadyExists,
            Error::NetworkOrConfig { .. } => ErrorKind::NetworkOrConfig,
            Error::Unsupported { .. } => ErrorKind::Unsupported,
            Error::RecursiveRequired { .. } => ErrorKind::RecursiveRequired,
            Error::MissingEnvVar { .. } => ErrorKind::Config,
            Error::DownloadFailed { source, .. } | Error::UploadFailed { source, .. } => {
                source.kind()
            }
            Error::Io { .. } => ErrorKind::Io,
        }
    }
}
