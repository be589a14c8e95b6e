use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::domains::itinerary::workflow::{self, WorkflowError};
use crate::domains::itinerary::{ItemDraft, ItemPatch, ListFilter, StoreError};
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct ItemMutationResponse {
    pub id: String,
    pub status: String,
}

/// List all open itinerary records, date ascending. Records with planning
/// status Done are excluded; this feeds the trip inbox view.
pub async fn inbox_list_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.deps.store.list(ListFilter::default()).await {
        Ok(items) => Ok(Json(json!(items))),
        Err(e) => {
            error!(error = %e, "Inbox list failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to load records" })),
            ))
        }
    }
}

/// Create a full record with explicit fields.
pub async fn inbox_create_handler(
    State(state): State<AppState>,
    Json(draft): Json<ItemDraft>,
) -> Result<(StatusCode, Json<ItemMutationResponse>), (StatusCode, Json<Value>)> {
    match workflow::create_item(&state.deps, draft).await {
        Ok(id) => Ok((
            StatusCode::OK,
            Json(ItemMutationResponse {
                id,
                status: "success".to_string(),
            }),
        )),
        Err(e) => Err(map_mutation_error(e, "Failed to create the record")),
    }
}

/// Apply a partial update to one record.
pub async fn update_item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<ItemMutationResponse>, (StatusCode, Json<Value>)> {
    match state.deps.store.update(&id, patch).await {
        Ok(()) => Ok(Json(ItemMutationResponse {
            id,
            status: "success".to_string(),
        })),
        Err(e) => Err(map_mutation_error(e.into(), "Failed to update the record")),
    }
}

/// Soft-delete one record.
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemMutationResponse>, (StatusCode, Json<Value>)> {
    match state.deps.store.archive(&id).await {
        Ok(()) => Ok(Json(ItemMutationResponse {
            id,
            status: "success".to_string(),
        })),
        Err(e) => Err(map_mutation_error(e.into(), "Failed to delete the record")),
    }
}

fn map_mutation_error(e: WorkflowError, fallback: &str) -> (StatusCode, Json<Value>) {
    match &e {
        WorkflowError::MissingInput | WorkflowError::Store(StoreError::Invalid(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        ),
        WorkflowError::Store(StoreError::NotFound { .. }) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": e.to_string() })),
        ),
        _ => {
            error!(error = %e, "Inbox mutation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": fallback })),
            )
        }
    }
}
