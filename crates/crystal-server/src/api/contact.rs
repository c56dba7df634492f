use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::mail::{ContactMessage, MailError};
use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ContactResponse {
    sent: bool,
}

/// POST /api/v1/contact: forward a visitor message to the sales inbox.
pub(super) async fn send_contact(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ContactRequest>,
) -> Result<Json<ApiResponse<ContactResponse>>, ApiError> {
    let rid = &req_id.0;

    let contact = ContactMessage {
        name: body.name.trim().to_owned(),
        email: body.email.trim().to_owned(),
        message: body.message.trim().to_owned(),
    };
    if contact.name.is_empty() || contact.email.is_empty() || contact.message.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "name, email and message are required",
        ));
    }

    match state.mailer.send_contact(&contact).await {
        Ok(()) => Ok(Json(ApiResponse::new(
            req_id.0,
            ContactResponse { sent: true },
        ))),
        Err(MailError::InvalidAddress(_)) => Err(ApiError::new(
            rid,
            "validation_error",
            "email is not a valid address",
        )),
        Err(e) => {
            tracing::error!(error = %e, "failed to send contact message");
            Err(ApiError::new(rid, "internal_error", "failed to send message"))
        }
    }
}
