//! API Routes
//!
//! Configures the Axum router with all upload registry endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, list_uploads_handler, record_upload_handler, renditions_handler,
    stats_handler, upload_signature_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/upload-signature` - Signed-upload authorization
/// - `GET /api/uploads` - Page of recent uploads
/// - `POST /api/uploads` - Record a finished upload
/// - `GET /api/renditions` - Delivery URLs for one asset
/// - `GET /api/stats` - Signature cache statistics
/// - `GET /api/health` - Store round-trip health check
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/upload-signature", get(upload_signature_handler))
        .route(
            "/api/uploads",
            get(list_uploads_handler).post(record_upload_handler),
        )
        .route("/api/renditions", get(renditions_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
