use std::time::Duration;

use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, StatusCode};

use crate::error::StorageError;

/// Characters escaped in an object name used as a path segment.
const OBJECT_NAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'~');

/// Host that serves publicly readable objects.
pub const PUBLIC_HOST: &str = "https://storage.googleapis.com";

/// Client for the Google Cloud Storage JSON API, bound to one bucket.
///
/// Uploads are made with `predefinedAcl=publicRead` so the returned URL can
/// be embedded directly in product pages. Authentication is an optional
/// OAuth bearer token; obtaining and refreshing it is the deployment's job.
#[derive(Clone)]
pub struct GcsClient {
    client: Client,
    bucket: String,
    api_base: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for GcsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsClient")
            .field("bucket", &self.bucket)
            .field("api_base", &self.api_base)
            .field("access_token", &self.access_token.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

impl GcsClient {
    /// Creates a client for `bucket` talking to `api_base`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        bucket: &str,
        api_base: &str,
        access_token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            bucket: bucket.to_owned(),
            api_base: api_base.trim_end_matches('/').to_owned(),
            access_token,
        })
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Public URL of an object in this bucket.
    #[must_use]
    pub fn public_url(&self, object_name: &str) -> String {
        format!("{PUBLIC_HOST}/{}/{object_name}", self.bucket)
    }

    /// Uploads `body` as `object_name` and returns its public URL.
    ///
    /// # Errors
    ///
    /// - [`StorageError::UnexpectedStatus`] for any non-2xx response.
    /// - [`StorageError::Http`] on network or TLS failure.
    pub async fn put(
        &self,
        object_name: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = format!("{}/upload/storage/v1/b/{}/o", self.api_base, self.bucket);
        let size = body.len();

        let request = self
            .client
            .post(&url)
            .query(&[
                ("uploadType", "media"),
                ("predefinedAcl", "publicRead"),
                ("name", object_name),
            ])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body);

        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        tracing::info!(bucket = %self.bucket, object = object_name, size, "uploaded object");
        Ok(self.public_url(object_name))
    }

    /// Downloads an object. Returns `None` when the object does not exist.
    ///
    /// # Errors
    ///
    /// - [`StorageError::UnexpectedStatus`] for any non-2xx, non-404 response.
    /// - [`StorageError::Http`] on network or TLS failure.
    pub async fn get(&self, object_name: &str) -> Result<Option<Bytes>, StorageError> {
        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.api_base,
            self.bucket,
            utf8_percent_encode(object_name, OBJECT_NAME)
        );

        let request = self.client.get(&url).query(&[("alt", "media")]);
        let response = self.authorize(request).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        Ok(Some(response.bytes().await?))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}
