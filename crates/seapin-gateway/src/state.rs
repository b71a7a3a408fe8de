//! Application state

use crate::config::{GatewayConfig, StorageKind};
use seapin_store::{ContentStore, MemoryObjectStore, ObjectStoreBackend};
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across handlers
///
/// Built once at startup; handlers only read it.
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Object store holding content, keyed by CID
    pub store: Arc<dyn ContentStore>,
}

impl AppState {
    /// Create the application state, connecting the configured backend
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ContentStore> = match config.storage {
            StorageKind::S3 => {
                let settings = config.s3_settings();
                info!(
                    endpoint = %settings.endpoint_url(),
                    bucket = %settings.bucket,
                    "Using S3 object store"
                );
                Arc::new(ObjectStoreBackend::s3(&settings)?)
            }
            StorageKind::Local => {
                info!(root = %config.local_root.display(), "Using local filesystem store");
                Arc::new(ObjectStoreBackend::local(&config.local_root, &config.s3_bucket)?)
            }
            StorageKind::Memory => {
                warn!("⚠ Storage mode: In-memory (NOT persistent - for development only)");
                Arc::new(MemoryObjectStore::new(&config.s3_bucket))
            }
        };

        Ok(Self::with_store(config, store))
    }

    /// Create the application state around an existing store
    pub fn with_store(config: GatewayConfig, store: Arc<dyn ContentStore>) -> Self {
        Self { config, store }
    }
}
