//! In-memory object store for testing and development

use crate::{ContentStore, ObjectInfo, ObjectReader, Result, StoreError};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// An in-memory object store
///
/// Clones share the same buckets. Every bucket must be created before objects
/// can be written to it, mirroring a real object store.
#[derive(Clone, Debug)]
pub struct MemoryObjectStore {
    bucket: String,
    buckets: Arc<DashMap<String, DashMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    /// Create a new store bound to `bucket`. The bucket itself does not exist yet.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            buckets: Arc::new(DashMap::new()),
        }
    }

    /// Another handle over the same buckets, bound to a different bucket
    pub fn with_bucket(&self, bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            buckets: Arc::clone(&self.buckets),
        }
    }

    /// Get the number of objects in the bound bucket
    pub fn len(&self) -> usize {
        self.buckets
            .get(&self.bucket)
            .map(|objects| objects.len())
            .unwrap_or(0)
    }

    /// Check if the bound bucket holds no objects
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get total size of all objects in the bound bucket
    pub fn total_size(&self) -> u64 {
        self.buckets
            .get(&self.bucket)
            .map(|objects| objects.iter().map(|entry| entry.value().data.len() as u64).sum())
            .unwrap_or(0)
    }

    /// List all keys in the bound bucket
    pub fn list_keys(&self) -> Vec<String> {
        self.buckets
            .get(&self.bucket)
            .map(|objects| objects.iter().map(|entry| entry.key().clone()).collect())
            .unwrap_or_default()
    }

    fn lookup(&self, key: &str) -> Result<StoredObject> {
        let objects = self
            .buckets
            .get(&self.bucket)
            .ok_or_else(|| StoreError::BucketNotFound(self.bucket.clone()))?;
        objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

#[async_trait]
impl ContentStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn bucket_exists(&self) -> Result<bool> {
        Ok(self.buckets.contains_key(&self.bucket))
    }

    async fn create_bucket(&self) -> Result<()> {
        self.buckets.entry(self.bucket.clone()).or_default();
        Ok(())
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<ObjectInfo> {
        let objects = self
            .buckets
            .get(&self.bucket)
            .ok_or_else(|| StoreError::BucketNotFound(self.bucket.clone()))?;
        let info = ObjectInfo::new(key, data.len() as u64, Some(content_type.to_string()));
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(info)
    }

    async fn get(&self, key: &str) -> Result<ObjectReader> {
        let object = self.lookup(key)?;
        let info = ObjectInfo::new(key, object.data.len() as u64, Some(object.content_type));
        Ok(ObjectReader::from_bytes(info, object.data))
    }

    async fn stat(&self, key: &str) -> Result<ObjectInfo> {
        let object = self.lookup(key)?;
        Ok(ObjectInfo::new(
            key,
            object.data.len() as u64,
            Some(object.content_type),
        ))
    }
}
