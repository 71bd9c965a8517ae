// Error translation helpers and wrapping macro for Snafu-based errors
use crate::error::Error;
use crate::storage::Backend;
use std::io;
use std::path::Path;

/// Translate a backend-native error into the unified taxonomy.
///
/// Backend-specific signals (expired tokens, rejected signatures) are matched on
/// the rendered message first, since opendal folds them into generic kinds.
pub fn translate(backend: Backend, err: opendal::Error, path: &str) -> Error {
    let message = err.to_string();
    if let Some(error) = backend_specific(backend, &message) {
        return error;
    }

    match err.kind() {
        opendal::ErrorKind::NotFound => Error::NotFound {
            path: path.to_string(),
        },
        opendal::ErrorKind::AlreadyExists => Error::AlreadyExists {
            path: path.to_string(),
        },
        opendal::ErrorKind::PermissionDenied => Error::InvalidCredentials {
            backend: backend.friendly_name().to_string(),
        },
        _ => Error::NetworkOrConfig {
            backend: backend.friendly_name().to_string(),
            message,
        },
    }
}

fn backend_specific(backend: Backend, message: &str) -> Option<Error> {
    const S3_REJECTED: &[&str] = &["InvalidAccessKeyId", "SignatureDoesNotMatch"];

    let backend_name = backend.friendly_name().to_string();
    match backend {
        Backend::Dropbox if message.contains("expired_access_token") => {
            Some(Error::ExpiredCredentials {
                backend: backend_name,
            })
        }
        Backend::Dropbox if message.contains("invalid_access_token") => {
            Some(Error::InvalidCredentials {
                backend: backend_name,
            })
        }
        Backend::S3 if S3_REJECTED.iter().any(|code| message.contains(code)) => {
            Some(Error::InvalidCredentials {
                backend: backend_name,
            })
        }
        Backend::AzureFile if message.contains("AuthenticationFailed") => {
            Some(Error::InvalidCredentials {
                backend: backend_name,
            })
        }
        _ => None,
    }
}

/// Translate a local filesystem error, keeping not-found/exists as typed kinds.
pub fn local(path: &Path, err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::NotFound => Error::LocalNotFound {
            path: path.to_path_buf(),
        },
        io::ErrorKind::AlreadyExists => Error::LocalAlreadyExists {
            path: path.to_path_buf(),
        },
        _ => Error::Io {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

/// Macro to wrap a Result-producing expression into a Snafu variant with `source: Box<Error>`.
/// Example:
/// wrap_err!(client.pull(src, dest, false).await, DownloadFailed { remote_path: rp, local_path: lp })?
#[macro_export]
macro_rules! wrap_err {
    ($expr:expr, $variant:ident { $($field:ident : $value:expr),* $(,)? }) => {{
        $expr.map_err(|e: $crate::error::Error| {
            $crate::error::Error::$variant { $($field: $value),*, source: Box::new(e) }
        })
    }};
}
