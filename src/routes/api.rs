use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::api;
use crate::state::AppState;
use std::sync::Arc;

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Protected routes (auth required)
        .route(
            "/queues/{doctor_id}/{hospital_id}",
            get(api::queue_snapshot),
        )
        .layer(TraceLayer::new_for_http())
}
