//! API Routes
//!
//! Configures the Axum router with all image server endpoints.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    copy_handler, delete_handler, image_handler, list_handler, stats_handler, upload_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /` - List source images older than `age` seconds
/// - `PUT /` - Get cache statistics
/// - `GET /:name` - Render a thumbnail
/// - `POST /:name` - Upload a source image
/// - `DELETE /:name` - Delete a source image
/// - `PUT /:src/:dst` - Copy a source image
///
/// # Middleware
/// - Body limit: Caps upload size at `state.max_upload`
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(list_handler).put(stats_handler))
        .route(
            "/:name",
            get(image_handler).post(upload_handler).delete(delete_handler),
        )
        .route("/:src/:dst", put(copy_handler))
        .layer(DefaultBodyLimit::max(state.max_upload))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
