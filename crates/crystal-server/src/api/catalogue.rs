use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension,
};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

pub(super) const CATALOGUE_OBJECT: &str = "catalogue.pdf";

/// GET /api/v1/catalogue: the PDF catalogue, shown inline.
pub(super) async fn get_catalogue(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError> {
    match state.storage.get(CATALOGUE_OBJECT).await {
        Ok(Some(pdf)) => Ok((
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (header::CONTENT_DISPOSITION, "inline; filename=\"catalogue.pdf\""),
            ],
            pdf,
        )
            .into_response()),
        Ok(None) => Err(ApiError::new(req_id.0, "not_found", "catalogue not found")),
        Err(e) => {
            tracing::error!(error = %e, object = CATALOGUE_OBJECT, "failed to fetch catalogue");
            Err(ApiError::new(req_id.0, "internal_error", "failed to fetch catalogue"))
        }
    }
}
