//! Upload handler (`POST /upload`)

use crate::{ApiError, AppState};
use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use seapin_store::{ContentId, DEFAULT_CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

/// Body returned for a stored upload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Canonical CID string
    pub cid: String,
    /// Gateway path serving the content
    pub url: String,
}

/// POST /upload - Store a file under its CID
///
/// The whole file is buffered before hashing since the key depends on every
/// byte of it. The size is bounded by the router's body limit.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut multipart = multipart.map_err(|e| {
        debug!(error = %e, "Upload is not a multipart form");
        ApiError::MissingFile
    })?;

    let (data, content_type) = read_file_field(&mut multipart).await?;
    let size = data.len();

    let id = ContentId::compute(&data).map_err(|e| {
        error!(error = %e, size, "Failed to compute CID");
        ApiError::from(e)
    })?;
    let key = id.to_string();

    state
        .store
        .put(&key, data, &content_type)
        .await
        .map_err(|e| ApiError::from_store(e, "put", &key))?;

    info!(cid = %key, size, content_type = %content_type, "Stored upload");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: id.gateway_path(),
            cid: key,
        }),
    ))
}

/// Find the `file` field and buffer it, along with its declared content type
async fn read_file_field(multipart: &mut Multipart) -> Result<(Bytes, String), ApiError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, ApiError::MissingFile))?
            .ok_or(ApiError::MissingFile)?;

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = declared_content_type(&field);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, ApiError::UnreadableFile))?;
        return Ok((data, content_type));
    }
}

fn declared_content_type(field: &Field<'_>) -> String {
    field
        .content_type()
        .filter(|ct| !ct.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string()
}

/// Body-limit overruns surface as 413; every other multipart fault is `fallback`
fn multipart_error(err: MultipartError, fallback: ApiError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        debug!(error = %err, "Upload exceeds body limit");
        ApiError::PayloadTooLarge
    } else {
        debug!(error = %err, "Malformed multipart upload");
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_shape() {
        let id = ContentId::compute(b"hello world").unwrap();
        let response = UploadResponse {
            cid: id.to_string(),
            url: id.gateway_path(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cid": "bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5e",
                "url": "/ipfs/bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5e",
            })
        );
    }
}
