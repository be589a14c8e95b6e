use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::error;

use crate::domains::itinerary::workflow::{self, CaptureRequest, WorkflowError};
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct CaptureResponse {
    pub success: bool,
    #[serde(rename = "pageId", skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    pub message: String,
}

/// Quick capture: persist the minimum immediately, enrichment happens on a
/// later `/analyze` call.
pub async fn capture_handler(
    State(state): State<AppState>,
    Json(request): Json<CaptureRequest>,
) -> (StatusCode, Json<CaptureResponse>) {
    match workflow::capture(&state.deps, request).await {
        Ok(outcome) => {
            let message = if outcome.enqueued {
                "Captured; queued for analysis".to_string()
            } else {
                "Captured".to_string()
            };
            (
                StatusCode::OK,
                Json(CaptureResponse {
                    success: true,
                    page_id: Some(outcome.page_id),
                    message,
                }),
            )
        }
        Err(WorkflowError::MissingInput) => (
            StatusCode::BAD_REQUEST,
            Json(CaptureResponse {
                success: false,
                page_id: None,
                message: WorkflowError::MissingInput.to_string(),
            }),
        ),
        Err(e) => {
            error!(error = %e, "Capture failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CaptureResponse {
                    success: false,
                    page_id: None,
                    message: "Failed to save the record".to_string(),
                }),
            )
        }
    }
}
