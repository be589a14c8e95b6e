use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;

use crate::domains::itinerary::workflow::{self, EnrichOutcome, WorkflowError};
use crate::domains::itinerary::{ItineraryItem, StoreError};
use crate::server::app::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub page_id: String,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ItineraryItem>,
    #[serde(rename = "aiStatus", skip_serializing_if = "Option::is_none")]
    pub ai_status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeStatusQuery {
    pub page_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeStatusResponse {
    pub page_id: String,
    pub ai_status: String,
    pub title: String,
}

/// Run enrichment on one record.
pub async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> (StatusCode, Json<AnalyzeResponse>) {
    match workflow::enrich(&state.deps, &request.page_id).await {
        Ok(EnrichOutcome::Enriched { item }) => (
            StatusCode::OK,
            Json(AnalyzeResponse {
                status: "success".to_string(),
                message: "Analysis complete".to_string(),
                data: Some(item),
                ai_status: None,
            }),
        ),
        Ok(EnrichOutcome::Skipped { ai_status, message }) => (
            StatusCode::OK,
            Json(AnalyzeResponse {
                status: "skipped".to_string(),
                message,
                data: None,
                ai_status: Some(ai_status.as_str().to_string()),
            }),
        ),
        Err(e) => {
            let status = match &e {
                WorkflowError::NoUrl { .. } => StatusCode::BAD_REQUEST,
                WorkflowError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
                _ => {
                    error!(error = %e, page_id = %request.page_id, "Analysis failed");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (
                status,
                Json(AnalyzeResponse {
                    status: "error".to_string(),
                    message: e.to_string(),
                    data: None,
                    ai_status: None,
                }),
            )
        }
    }
}

/// Poll the enrichment state of one record.
pub async fn analyze_status_handler(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeStatusQuery>,
) -> Result<Json<AnalyzeStatusResponse>, (StatusCode, Json<Value>)> {
    match workflow::enrich_status(&state.deps, &query.page_id).await {
        Ok(report) => Ok(Json(AnalyzeStatusResponse {
            page_id: report.page_id,
            ai_status: report.ai_status,
            title: report.title,
        })),
        Err(WorkflowError::Store(StoreError::NotFound { page_id })) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("record not found: {page_id}") })),
        )),
        Err(e) => {
            error!(error = %e, "Status probe failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to read record status" })),
            ))
        }
    }
}
