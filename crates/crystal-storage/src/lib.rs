//! Blob storage for product images and the PDF catalogue.

pub mod error;
pub mod gcs;
pub mod local;

use std::path::Path;

use bytes::Bytes;
use crystal_core::StorageConfig;

pub use error::StorageError;
pub use gcs::GcsClient;
pub use local::{LocalStore, UPLOADS_ROUTE};

const GCS_TIMEOUT_SECS: u64 = 60;

/// Where uploads are written and the catalogue is read from.
#[derive(Debug, Clone)]
pub enum BlobStore {
    Gcs(GcsClient),
    Local(LocalStore),
}

impl BlobStore {
    /// Builds the store selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Http`] if the GCS HTTP client cannot be built.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        match config {
            StorageConfig::Local {
                dir,
                public_base_url,
            } => Ok(Self::Local(LocalStore::new(dir.clone(), public_base_url))),
            StorageConfig::Gcs {
                bucket,
                access_token,
                api_base,
            } => Ok(Self::Gcs(GcsClient::new(
                bucket,
                api_base,
                access_token.clone(),
                GCS_TIMEOUT_SECS,
            )?)),
        }
    }

    /// Stores an object and returns its public URL.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`StorageError`].
    pub async fn put(
        &self,
        object_name: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        match self {
            Self::Gcs(client) => client.put(object_name, body, content_type).await,
            Self::Local(store) => store.put(object_name, body).await,
        }
    }

    /// Fetches an object, `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`StorageError`].
    pub async fn get(&self, object_name: &str) -> Result<Option<Bytes>, StorageError> {
        match self {
            Self::Gcs(client) => client.get(object_name).await,
            Self::Local(store) => store.get(object_name).await,
        }
    }

    /// Directory to publish under [`UPLOADS_ROUTE`], for the local backend only.
    #[must_use]
    pub fn local_dir(&self) -> Option<&Path> {
        match self {
            Self::Gcs(_) => None,
            Self::Local(store) => Some(store.dir()),
        }
    }
}

/// Object name for an uploaded file: `{unix_millis}-{sanitized file name}`.
#[must_use]
pub fn object_name_for_upload(original_file_name: &str, unix_millis: i64) -> String {
    format!("{unix_millis}-{}", sanitize_file_name(original_file_name))
}

/// Same as [`object_name_for_upload`] stamped with the current time.
#[must_use]
pub fn object_name_now(original_file_name: &str) -> String {
    object_name_for_upload(original_file_name, chrono::Utc::now().timestamp_millis())
}

/// Reduces a client-supplied file name to `[A-Za-z0-9._-]`.
///
/// Directory components are discarded, other characters become `_`, and
/// leading dots are removed. An empty result becomes `upload`.
#[must_use]
pub fn sanitize_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_owned()
    } else {
        cleaned.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn object_name_prefixes_timestamp() {
        assert_eq!(
            object_name_for_upload("Cable Tie (black).png", 1_700_000_000_123),
            "1700000000123-Cable_Tie__black_.png"
        );
    }

    #[test]
    fn sanitize_strips_directories_and_dots() {
        assert_eq!(sanitize_file_name("C:\\photos\\tie.jpg"), "tie.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name(".htaccess"), "htaccess");
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("..."), "upload");
        assert_eq!(sanitize_file_name("tié.png"), "ti_.png");
    }

    #[test]
    fn from_config_selects_backend() {
        let local = BlobStore::from_config(&StorageConfig::Local {
            dir: PathBuf::from("/tmp/crystal-uploads"),
            public_base_url: "http://localhost:3000".to_owned(),
        })
        .expect("local store");
        assert_eq!(local.local_dir(), Some(Path::new("/tmp/crystal-uploads")));

        let gcs = BlobStore::from_config(&StorageConfig::Gcs {
            bucket: "crystal-media".to_owned(),
            access_token: None,
            api_base: "https://storage.googleapis.com".to_owned(),
        })
        .expect("gcs store");
        assert!(gcs.local_dir().is_none());
    }
}
