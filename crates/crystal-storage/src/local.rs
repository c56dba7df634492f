use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::StorageError;

/// URL path prefix under which the server publishes local uploads.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// Filesystem-backed store for development.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn public_url(&self, object_name: &str) -> String {
        format!("{}{UPLOADS_ROUTE}/{object_name}", self.public_base_url)
    }

    /// Writes `body` to `<dir>/<object_name>` and returns its public URL.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidObjectName`] for names that would
    /// escape the directory, or [`StorageError::Io`] if the write fails.
    pub async fn put(&self, object_name: &str, body: Bytes) -> Result<String, StorageError> {
        let path = self.object_path(object_name)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, &body).await?;
        tracing::info!(path = %path.display(), size = body.len(), "stored object");
        Ok(self.public_url(object_name))
    }

    /// Reads an object. Returns `None` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidObjectName`] for names that would
    /// escape the directory, or [`StorageError::Io`] if the read fails.
    pub async fn get(&self, object_name: &str) -> Result<Option<Bytes>, StorageError> {
        let path = self.object_path(object_name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn object_path(&self, object_name: &str) -> Result<PathBuf, StorageError> {
        let invalid = object_name.is_empty()
            || object_name.contains(['/', '\\'])
            || object_name.starts_with('.');
        if invalid {
            return Err(StorageError::InvalidObjectName {
                name: object_name.to_owned(),
            });
        }
        Ok(self.dir.join(object_name))
    }
}
