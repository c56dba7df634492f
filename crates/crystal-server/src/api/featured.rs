use axum::{extract::State, Extension, Json};
use crystal_core::FeaturedProduct;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

/// GET /api/v1/featured-products: featured products that have an image.
pub(super) async fn list_featured(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<FeaturedProduct>>>, ApiError> {
    let products = crystal_db::list_featured_products(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = products
        .iter()
        .filter_map(FeaturedProduct::from_product)
        .collect();
    Ok(Json(ApiResponse::new(req_id.0, data)))
}
