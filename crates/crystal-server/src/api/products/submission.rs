//! Extractor for product create/update bodies.
//!
//! The admin form posts `multipart/form-data` (with image files); API
//! clients post JSON. Both end up as a map of [`FieldInput`] values plus
//! any uploaded image files.

use std::collections::HashMap;

use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use bytes::Bytes;
use crystal_core::FieldInput;
use serde_json::Value;

use crate::middleware::RequestId;

use super::super::ApiError;

/// Multipart name for both kept image URLs (text) and new image files.
pub(super) const IMAGES_FIELD: &str = "images";

static MISSING: FieldInput = FieldInput::Missing;

/// An image file received in a multipart submission.
#[derive(Debug)]
pub(super) struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Default)]
pub(in crate::api) struct ProductSubmission {
    fields: HashMap<String, FieldInput>,
    pub(super) uploads: Vec<Upload>,
}

impl ProductSubmission {
    pub(super) fn field(&self, name: &str) -> &FieldInput {
        self.fields.get(name).unwrap_or(&MISSING)
    }

    pub(super) fn contains(&self, name: &str) -> bool {
        !self.field(name).is_missing()
    }

    /// Trimmed text of a scalar field, `None` when absent.
    pub(super) fn text(&self, name: &str) -> Option<String> {
        self.field(name).as_text().map(|t| t.trim().to_owned())
    }

    fn from_json(value: Value) -> Option<Self> {
        let Value::Object(map) = value else {
            return None;
        };
        Some(Self {
            fields: map
                .into_iter()
                .map(|(key, value)| (key, FieldInput::from(value)))
                .collect(),
            uploads: Vec::new(),
        })
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        let mut uploads = Vec::new();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(ToOwned::to_owned) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let data = field.bytes().await?;
                // Browsers send an empty part when no file was chosen.
                if name == IMAGES_FIELD && !data.is_empty() {
                    uploads.push(Upload {
                        file_name,
                        content_type,
                        data,
                    });
                } else if !data.is_empty() {
                    tracing::debug!(field = %name, "ignoring file in non-image field");
                }
                continue;
            }

            let text = field.text().await?;
            values.entry(name).or_default().push(text);
        }

        Ok(Self {
            fields: values
                .into_iter()
                .map(|(key, list)| (key, FieldInput::from_form_values(list)))
                .collect(),
            uploads,
        })
    }
}

impl<S> FromRequest<S> for ProductSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let rid = req
            .extensions()
            .get::<RequestId>()
            .map(|r| r.0.clone())
            .unwrap_or_default();

        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| rejection(&rid, e.status(), e.body_text()))?;
            return Self::from_multipart(multipart)
                .await
                .map_err(|e| rejection(&rid, e.status(), e.body_text()));
        }

        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| rejection(&rid, e.status(), e.body_text()))?;
        Self::from_json(value)
            .ok_or_else(|| ApiError::new(rid, "bad_request", "request body must be a JSON object"))
    }
}

fn rejection(request_id: &str, status: StatusCode, message: String) -> ApiError {
    let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "payload_too_large"
    } else {
        "bad_request"
    };
    ApiError::new(request_id, code, message)
}
