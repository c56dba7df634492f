//! Product write handlers: create, update, delete.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use crystal_core::{
    coerce_flag, merge_images, normalize_images, normalize_key_features, normalize_sizes, Product,
    ProductFields,
};
use crystal_storage::{object_name_now, BlobStore};
use serde::Serialize;

use crate::middleware::RequestId;

use super::super::{map_db_error, ApiError, ApiResponse, AppState};
use super::submission::{ProductSubmission, Upload, IMAGES_FIELD};

const TEXT_FIELDS: [&str; 4] = ["name", "brand", "finish", "description"];

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(in crate::api) struct ProductIdResponse {
    pub id: i64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(req_id: &str) -> ApiError {
    ApiError::new(req_id, "not_found", "product not found")
}

fn required_text(
    req_id: &str,
    submission: &ProductSubmission,
    field: &str,
) -> Result<String, ApiError> {
    submission
        .text(field)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            ApiError::new(req_id, "validation_error", format!("{field} is required"))
        })
}

fn set_text(fields: &mut ProductFields, field: &str, value: String) {
    match field {
        "name" => fields.name = value,
        "brand" => fields.brand = value,
        "finish" => fields.finish = value,
        "description" => fields.description = value,
        _ => {}
    }
}

/// Uploads every file in order and returns their public URLs.
///
/// Files stored before a failure are not removed.
async fn store_uploads(
    req_id: &str,
    storage: &BlobStore,
    uploads: Vec<Upload>,
) -> Result<Vec<String>, ApiError> {
    let mut urls = Vec::with_capacity(uploads.len());

    for upload in uploads {
        let object_name = object_name_now(&upload.file_name);
        match storage
            .put(&object_name, upload.data, &upload.content_type)
            .await
        {
            Ok(url) => urls.push(url),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    object = %object_name,
                    already_stored = urls.len(),
                    "image upload failed"
                );
                return Err(ApiError::new(req_id, "internal_error", "image upload failed"));
            }
        }
    }

    Ok(urls)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/products: create a product from a JSON or multipart body.
pub(in crate::api) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    mut submission: ProductSubmission,
) -> Result<(StatusCode, Json<ApiResponse<ProductIdResponse>>), ApiError> {
    let rid = &req_id.0;

    let mut fields = ProductFields::default();
    for field in TEXT_FIELDS {
        let value = required_text(rid, &submission, field)?;
        set_text(&mut fields, field, value);
    }

    fields.sizes = normalize_sizes(submission.field("sizes"));
    if fields.sizes.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "at least one size is required",
        ));
    }
    fields.key_features = normalize_key_features(submission.field("key_features"));
    fields.featured = coerce_flag(submission.field("featured"));

    let kept = normalize_images(submission.field(IMAGES_FIELD));
    let uploads = std::mem::take(&mut submission.uploads);
    let uploaded = store_uploads(rid, &state.storage, uploads).await?;
    fields.images = merge_images(kept, uploaded);

    let id = crystal_db::insert_product(&state.pool, &fields)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(product_id = id, images = fields.images.len(), "product created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(req_id.0, ProductIdResponse { id })),
    ))
}

/// PATCH /api/v1/products/{id}: partial update.
///
/// Fields absent from the submission keep their stored values; text fields
/// that are present must not be blank. The image list is only rebuilt when
/// the submission names `images` or carries files.
pub(in crate::api) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    mut submission: ProductSubmission,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let rid = &req_id.0;

    let existing = crystal_db::get_product(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let mut fields = existing.fields;

    for field in TEXT_FIELDS {
        if submission.contains(field) {
            let value = required_text(rid, &submission, field)?;
            set_text(&mut fields, field, value);
        }
    }
    if submission.contains("featured") {
        fields.featured = coerce_flag(submission.field("featured"));
    }
    if submission.contains("sizes") {
        fields.sizes = normalize_sizes(submission.field("sizes"));
    }
    if submission.contains("key_features") {
        fields.key_features = normalize_key_features(submission.field("key_features"));
    }

    if submission.contains(IMAGES_FIELD) || !submission.uploads.is_empty() {
        let kept = normalize_images(submission.field(IMAGES_FIELD));
        let uploads = std::mem::take(&mut submission.uploads);
        let uploaded = store_uploads(rid, &state.storage, uploads).await?;
        fields.images = merge_images(kept, uploaded);
    }

    let updated = crystal_db::update_product(&state.pool, id, &fields)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !updated {
        return Err(not_found(rid));
    }

    let product = crystal_db::get_product(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(product_id = id, "product updated");
    Ok(Json(ApiResponse::new(req_id.0, product)))
}

/// DELETE /api/v1/products/{id}
pub(in crate::api) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProductIdResponse>>, ApiError> {
    let rid = &req_id.0;

    let deleted = crystal_db::delete_product(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !deleted {
        return Err(not_found(rid));
    }

    tracing::info!(product_id = id, "product deleted");
    Ok(Json(ApiResponse::new(req_id.0, ProductIdResponse { id })))
}
