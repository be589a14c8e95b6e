//! Application setup and router construction.

use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    analyze_handler, analyze_status_handler, capture_handler, delete_item_handler, health_handler,
    inbox_create_handler, inbox_list_handler, update_item_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the Axum application router
pub fn build_app(deps: Arc<ServerDeps>) -> Router {
    let state = AppState { deps };

    // CORS - the capture surface is called from browser share targets
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/capture", post(capture_handler))
        .route("/inbox", get(inbox_list_handler).post(inbox_create_handler))
        .route(
            "/inbox/:id",
            axum::routing::patch(update_item_handler).delete(delete_item_handler),
        )
        .route(
            "/analyze",
            post(analyze_handler).get(analyze_status_handler),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
