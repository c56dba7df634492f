use axum::{
    extract::{Path, State},
    Extension, Json,
};
use crystal_core::{Product, ProductSummary};

use crate::middleware::RequestId;

use super::super::{map_db_error, ApiError, ApiResponse, AppState};

/// GET /api/v1/products: summaries of every product, ordered by id.
pub(in crate::api) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProductSummary>>>, ApiError> {
    let products = crystal_db::list_products(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = products.iter().map(ProductSummary::from).collect();
    Ok(Json(ApiResponse::new(req_id.0, data)))
}

/// GET /api/v1/products/{id}: a single product with decoded list fields.
pub(in crate::api) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = crystal_db::get_product(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, product)))
}
