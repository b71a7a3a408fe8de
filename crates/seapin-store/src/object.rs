//! Stored object descriptors

use crate::{Result, DEFAULT_CONTENT_TYPE};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use std::fmt;

/// Stream of body chunks read from a backend
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Metadata of a stored object
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object key (the canonical CID string)
    pub key: String,
    /// Size in bytes
    pub size: u64,
    /// Content type declared at upload, if the backend kept it
    pub content_type: Option<String>,
}

impl ObjectInfo {
    /// Create a new descriptor
    pub fn new(key: impl Into<String>, size: u64, content_type: Option<String>) -> Self {
        Self {
            key: key.into(),
            size,
            content_type: content_type.filter(|ct| !ct.is_empty()),
        }
    }

    /// Declared content type, or `application/octet-stream`
    pub fn content_type_or_default(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// An open object: metadata plus its body stream
///
/// Dropping the reader drops the stream and releases whatever the backend
/// holds open for it.
pub struct ObjectReader {
    /// Object metadata
    pub info: ObjectInfo,
    /// Body chunks
    pub body: ByteStream,
}

impl ObjectReader {
    /// Create a reader from a backend stream
    pub fn new(info: ObjectInfo, body: ByteStream) -> Self {
        Self { info, body }
    }

    /// Create a reader over an in-memory buffer
    pub fn from_bytes(info: ObjectInfo, data: Bytes) -> Self {
        let body = stream::once(async move { Ok(data) }).boxed();
        Self { info, body }
    }

    /// Split into metadata and body
    pub fn into_parts(self) -> (ObjectInfo, ByteStream) {
        (self.info, self.body)
    }

    /// Drain the body into a single buffer
    pub async fn read_to_end(mut self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.info.size as usize);
        while let Some(chunk) = self.body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl fmt::Debug for ObjectReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectReader")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
