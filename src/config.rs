use crate::error::{MissingEnvVarSnafu, Result};
use crate::storage::Backend;
use crate::storage::constants::DEFAULT_FS_ROOT;
use crate::storage::credentials::Credentials;
use snafu::OptionExt;
use std::env;
use std::str::FromStr;

/// Backend selection plus the credential record handed to the client factory.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: Backend,
    pub credentials: Credentials,
}

/// Provider-native variables consulted when `STORAGE_<FIELD>` is unset.
fn fallback_keys(backend: Backend, field: &str) -> &'static [&'static str] {
    match (backend, field) {
        (Backend::S3, "access_key") => &["AWS_ACCESS_KEY_ID", "MINIO_ACCESS_KEY"],
        (Backend::S3, "secret_access_key") => &["AWS_SECRET_ACCESS_KEY", "MINIO_SECRET_KEY"],
        (Backend::S3, "region") => &["AWS_DEFAULT_REGION", "AWS_REGION", "MINIO_DEFAULT_REGION"],
        (Backend::S3, "bucket_name") => &["AWS_S3_BUCKET", "MINIO_BUCKET"],
        (Backend::AzureFile, "storage_account_name") => &["AZURE_STORAGE_ACCOUNT"],
        (Backend::AzureFile, "storage_access_key") => &["AZURE_STORAGE_KEY"],
        (Backend::AzureFile, "file_share_name") => &["AZURE_STORAGE_SHARE"],
        (Backend::Dropbox, "access_token") => &["DROPBOX_ACCESS_TOKEN"],
        _ => &[],
    }
}

// Helper function to reduce repetitive environment variable loading logic.
fn get_env_var(
    lookup: &impl Fn(&str) -> Option<String>,
    primary_key: &str,
    secondary_keys: &[&str],
) -> Option<String> {
    lookup(primary_key).or_else(|| secondary_keys.iter().find_map(|key| lookup(key)))
}

/// Load storage configuration from environment variables
pub fn load_storage_config() -> Result<StorageConfig> {
    StorageConfig::from_lookup(|key| env::var(key).ok())
}

impl StorageConfig {
    /// Build a configuration from any key/value source.
    ///
    /// `STORAGE_PROVIDER` is required. Each schema field is read from
    /// `STORAGE_<FIELD>` and then from the provider's own variables; fields
    /// that are nowhere to be found are left out so the factory reports
    /// invalid credentials.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let provider = lookup("STORAGE_PROVIDER").context(MissingEnvVarSnafu {
            key: "STORAGE_PROVIDER",
        })?;
        let backend = Backend::from_str(&provider)?;

        let mut credentials = Credentials::new();
        for field in backend.schema() {
            let primary = format!("STORAGE_{}", field.name.to_uppercase());
            if let Some(value) = get_env_var(&lookup, &primary, fallback_keys(backend, field.name)) {
                credentials.insert(field.name, value);
            }
        }

        match backend {
            Backend::S3 => {
                let endpoint = match provider.to_lowercase().as_str() {
                    "minio" => get_env_var(&lookup, "STORAGE_ENDPOINT", &["MINIO_ENDPOINT"])
                        .or_else(|| Some("http://localhost:9000".to_string())),
                    _ => lookup("STORAGE_ENDPOINT"),
                };
                if let Some(endpoint) = endpoint {
                    credentials.insert("endpoint", endpoint);
                }
            }
            Backend::AzureFile => {
                if let Some(endpoint) = lookup("STORAGE_ENDPOINT") {
                    credentials.insert("endpoint", endpoint);
                }
            }
            Backend::Fs => {
                if !credentials.contains("root_path") {
                    credentials.insert("root_path", DEFAULT_FS_ROOT);
                }
            }
            Backend::Dropbox => {}
        }

        log::debug!(
            "loaded storage config backend={backend:?} fields={}",
            credentials.len()
        );
        Ok(Self {
            backend,
            credentials,
        })
    }
}
