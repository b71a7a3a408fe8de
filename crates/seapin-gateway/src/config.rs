//! Gateway configuration

use seapin_store::S3Settings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which storage backend the gateway writes to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// S3-compatible endpoint (MinIO, AWS)
    S3,
    /// Process memory, lost on exit
    Memory,
    /// Directory tree on local disk
    Local,
}

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Listen address, `host:port` or `:port`
    pub listen_addr: String,
    /// Storage backend
    pub storage: StorageKind,
    /// S3 endpoint as `host:port`
    pub s3_endpoint: String,
    /// Bucket holding content objects
    pub s3_bucket: String,
    /// S3 access key
    pub s3_access_key: String,
    /// S3 secret key
    #[serde(skip_serializing)]
    pub s3_secret_key: String,
    /// S3 region
    pub s3_region: String,
    /// Use HTTPS for the S3 endpoint
    pub s3_use_ssl: bool,
    /// Root directory for the local backend
    pub local_root: PathBuf,
    /// Maximum upload request body size (bytes)
    pub max_upload_size: usize,
    /// Enable CORS
    pub cors_enabled: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: ":8080".to_string(),
            storage: StorageKind::S3,
            s3_endpoint: "minio:9000".to_string(),
            s3_bucket: "ipfs".to_string(),
            s3_access_key: "minioadmin".to_string(),
            s3_secret_key: "minioadmin".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_use_ssl: false,
            local_root: PathBuf::from("./seapin-data"),
            max_upload_size: 256 * 1024 * 1024, // 256 MiB
            cors_enabled: true,
        }
    }
}

impl GatewayConfig {
    /// Get the bind address; a bare `:port` listens on every interface
    pub fn bind_addr(&self) -> String {
        if self.listen_addr.starts_with(':') {
            format!("0.0.0.0{}", self.listen_addr)
        } else {
            self.listen_addr.clone()
        }
    }

    /// Settings for the S3 backend
    pub fn s3_settings(&self) -> S3Settings {
        S3Settings {
            endpoint: self.s3_endpoint.clone(),
            bucket: self.s3_bucket.clone(),
            access_key: self.s3_access_key.clone(),
            secret_key: self.s3_secret_key.clone(),
            region: self.s3_region.clone(),
            use_ssl: self.s3_use_ssl,
        }
    }
}
