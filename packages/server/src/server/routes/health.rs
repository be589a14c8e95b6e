use axum::{http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
}

/// Health check endpoint
pub async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}
