//! Content retrieval handlers (`/ipfs/{cid}`)
//!
//! Content under a CID never changes, so successful responses are marked
//! immutable for caches. The body is not re-hashed on the way out; the key was
//! derived from the bytes when they were written.

use crate::{ApiError, AppState};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use seapin_store::{ContentId, ObjectInfo, DEFAULT_CONTENT_TYPE};
use std::sync::Arc;
use tracing::debug;

/// Cache directive for content-addressed responses (48 weeks, immutable)
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=29030400, immutable";

/// Header echoing the canonical content path
pub const X_IPFS_PATH: HeaderName = HeaderName::from_static("x-ipfs-path");

/// GET /ipfs/{cid} - Stream content
pub async fn get_content(
    State(state): State<Arc<AppState>>,
    Path(cid): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_cid(&cid)?;
    let key = id.to_string();

    let reader = state
        .store
        .get(&key)
        .await
        .map_err(|e| ApiError::from_store(e, "get", &key))?;
    let (info, body) = reader.into_parts();

    debug!(cid = %key, size = info.size, "Serving content");

    Ok((
        StatusCode::OK,
        content_headers(&id, &info),
        Body::from_stream(body),
    )
        .into_response())
}

/// HEAD /ipfs/{cid} - Content metadata only
pub async fn head_content(
    State(state): State<Arc<AppState>>,
    Path(cid): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_cid(&cid)?;
    let key = id.to_string();

    let info = state
        .store
        .stat(&key)
        .await
        .map_err(|e| ApiError::from_store(e, "stat", &key))?;

    Ok((StatusCode::OK, content_headers(&id, &info), Body::empty()).into_response())
}

fn parse_cid(raw: &str) -> Result<ContentId, ApiError> {
    ContentId::parse(raw).map_err(|e| {
        debug!(cid = %raw, error = %e, "Rejected CID");
        ApiError::InvalidCid
    })
}

/// Headers sent ahead of any body byte
fn content_headers(id: &ContentId, info: &ObjectInfo) -> HeaderMap {
    let content_type = HeaderValue::from_str(info.content_type_or_default())
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(info.size));
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(IMMUTABLE_CACHE_CONTROL),
    );
    if let Ok(path) = HeaderValue::from_str(&id.gateway_path()) {
        headers.insert(X_IPFS_PATH, path);
    }
    headers
}
