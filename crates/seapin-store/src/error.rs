//! Error types for the seapin-store crate

use thiserror::Error;

/// Result type alias using `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while computing identifiers or talking to a backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// Object not found
    #[error("object not found: {0}")]
    NotFound(String),

    /// Bucket does not exist
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    /// Identifier is not a CIDv1/raw/SHA2-256 string
    #[error("invalid CID: {0}")]
    InvalidCid(String),

    /// Multihash or CID construction failed
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Backend refused the credentials or the operation
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Connection error
    #[error("connection error: {0}")]
    Connection(String),

    /// Timeout error
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Any other backend failure
    #[error("backend error: {0}")]
    Backend(String),

    /// Operation not offered by this backend
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    /// The object is absent. A missing bucket is a misconfigured backend, not
    /// a missing object, and does not count.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// The failure may clear up on its own (network, timeouts, backend hiccups).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout(_) | Self::Backend(_) | Self::Io(_)
        )
    }

    /// The caller sent something malformed.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidCid(_))
    }
}

impl From<object_store::Error> for StoreError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StoreError::NotFound(path),
            object_store::Error::PermissionDenied { path, source } => {
                StoreError::PermissionDenied(format!("{path}: {source}"))
            }
            object_store::Error::Unauthenticated { path, source } => {
                StoreError::PermissionDenied(format!("{path}: {source}"))
            }
            object_store::Error::NotSupported { source } => {
                StoreError::Unsupported(source.to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<cid::Error> for StoreError {
    fn from(err: cid::Error) -> Self {
        StoreError::InvalidCid(err.to_string())
    }
}
