//! Gateway error taxonomy and its HTTP mapping
//!
//! Client input errors never reach storage. Storage failures are split into
//! "object absent" (404) and everything else (502) so caches never record a
//! transient failure as a permanent absence. Backend detail is logged here and
//! never sent to the client.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use seapin_store::StoreError;
use thiserror::Error;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    /// Path segment is not a CIDv1/raw/SHA2-256 identifier
    #[error("invalid CID")]
    InvalidCid,

    /// Upload has no `file` field (or is not multipart at all)
    #[error("missing file field")]
    MissingFile,

    /// Upload body could not be read
    #[error("failed to read file")]
    UnreadableFile,

    /// Upload body exceeded the configured limit
    #[error("file too large")]
    PayloadTooLarge,

    /// Valid identifier, no such object
    #[error("not found")]
    NotFound,

    /// Any other storage failure
    #[error("storage error")]
    Storage(#[source] StoreError),

    /// Identifier derivation failed (encoding fault, never caller input)
    #[error("failed to compute CID")]
    CidComputation(#[source] StoreError),
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCid | Self::MissingFile | Self::UnreadableFile => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::CidComputation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a storage error raised while handling `key`, logging backend detail
    pub fn from_store(err: StoreError, operation: &'static str, key: &str) -> Self {
        if err.is_not_found() {
            tracing::debug!(key = %key, operation, "object not found");
            return Self::NotFound;
        }
        if err.is_transient() {
            tracing::warn!(error = %err, key = %key, operation, "storage backend unavailable");
        } else {
            tracing::error!(error = %err, key = %key, operation, "storage backend error");
        }
        Self::from(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            e if e.is_not_found() => Self::NotFound,
            e if e.is_client_error() => Self::InvalidCid,
            e @ StoreError::Encoding(_) => Self::CidComputation(e),
            e => Self::Storage(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.to_string())],
            format!("{self}\n"),
        )
            .into_response()
    }
}
