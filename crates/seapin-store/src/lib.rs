//! # Seapin Store
//!
//! Content identifiers and object storage for the Seapin IPFS gateway.
//!
//! This crate provides:
//! - **CID derivation**: CIDv1 / raw / SHA2-256 identifiers, bit-exact with
//!   `ipfs add --cid-version=1 --raw-leaves` for single-chunk content
//! - **CID validation**: strict parsing that rejects every other scheme
//! - **Storage adapters**: a `ContentStore` trait over an object-store bucket
//!   with in-memory, S3-compatible and local-filesystem backends
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Gateway Handlers             │
//! ├───────────────────┬─────────────────────┤
//! │     ContentId     │ ContentStore Trait  │
//! ├───────────────────┼──────────┬──────────┤
//! │  sha2 + multihash │  Memory  │ S3/Local │
//! └───────────────────┴──────────┴──────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use seapin_store::{ContentId, ContentStore, MemoryObjectStore};
//!
//! let store = MemoryObjectStore::new("ipfs");
//! store.ensure_bucket().await?;
//! let id = ContentId::compute(&data)?;
//! store.put(&id.to_string(), data.into(), "text/plain").await?;
//! let reader = store.get(&id.to_string()).await?;
//! ```

pub mod backend;
pub mod cid_utils;
pub mod error;
pub mod memory;
pub mod object;

pub use backend::{ObjectStoreBackend, S3Settings};
pub use cid_utils::ContentId;
pub use error::{Result, StoreError};
pub use memory::MemoryObjectStore;
pub use object::{ByteStream, ObjectInfo, ObjectReader};

use async_trait::async_trait;
use bytes::Bytes;

/// Content type used when none was declared
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Capability interface over one object-store bucket
///
/// Implementations must be safe to share across concurrent requests; the
/// gateway holds a single handle for the life of the process.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Name of the bucket this store reads and writes
    fn bucket(&self) -> &str;

    /// Check whether the bucket exists
    async fn bucket_exists(&self) -> Result<bool>;

    /// Create the bucket
    async fn create_bucket(&self) -> Result<()>;

    /// Store `data` under `key`, replacing any previous object
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<ObjectInfo>;

    /// Open an object for streaming
    async fn get(&self, key: &str) -> Result<ObjectReader>;

    /// Fetch object metadata without the body
    async fn stat(&self, key: &str) -> Result<ObjectInfo>;

    /// Create the bucket if it is missing. Returns `true` if it was created.
    async fn ensure_bucket(&self) -> Result<bool> {
        if self.bucket_exists().await? {
            return Ok(false);
        }
        self.create_bucket().await?;
        tracing::info!(bucket = %self.bucket(), "created bucket");
        Ok(true)
    }
}
