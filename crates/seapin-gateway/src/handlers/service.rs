//! Service-level handlers (banner, fallback)

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};

/// Body served at `GET /`
pub const BANNER: &str = "seapin ipfs gateway\n";

/// GET / - Banner
pub async fn banner() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.to_string())],
        BANNER,
    )
}

/// Any unmatched path
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.to_string())],
        "404 page not found\n",
    )
}
