//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/", get(handlers::banner))
        .route(
            "/ipfs/{cid}",
            get(handlers::get_content).head(handlers::head_content),
        )
        .route("/upload", post(handlers::upload))
        .fallback(handlers::not_found)
        // Apply middleware
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware));

    let router = if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any);
        router.layer(cors)
    } else {
        router
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .with_state(state)
}
