//! Object store backends built on the `object_store` crate
//!
//! Two layouts are supported:
//! - **S3**: object I/O goes through `object_store`, bound to one bucket on an
//!   S3-compatible endpoint (AWS, MinIO). Bucket checks and creation use the
//!   AWS SDK, which `object_store` does not cover.
//! - **Local**: buckets are directories under a root path.

use crate::{ContentStore, ObjectInfo, ObjectReader, Result, StoreError};
use async_trait::async_trait;
use aws_sdk_s3::{
    config::{BehaviorVersion, Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client as S3Client,
};
use bytes::Bytes;
use futures::StreamExt;
use object_store::{
    aws::AmazonS3Builder, local::LocalFileSystem, path::Path, Attribute, AttributeValue,
    Attributes, GetOptions, GetResult, ObjectStore, PutOptions, PutPayload,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Connection settings for an S3-compatible endpoint
#[derive(Clone, Debug)]
pub struct S3Settings {
    /// Endpoint as `host:port`, or a full URL
    pub endpoint: String,
    /// Bucket name
    pub bucket: String,
    /// Access key ID
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
    /// Region (MinIO accepts any)
    pub region: String,
    /// Use HTTPS
    pub use_ssl: bool,
}

impl Default for S3Settings {
    fn default() -> Self {
        Self {
            endpoint: "minio:9000".to_string(),
            bucket: "ipfs".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            region: "us-east-1".to_string(),
            use_ssl: false,
        }
    }
}

impl S3Settings {
    /// Endpoint URL with the scheme implied by `use_ssl`
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            self.endpoint.clone()
        } else if self.use_ssl {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }
}

/// Region that takes no location constraint on `CreateBucket`
const DEFAULT_REGION: &str = "us-east-1";

#[derive(Clone, Debug)]
enum Layout {
    /// Bucket on an S3 endpoint, managed through the SDK client
    S3 { admin: S3Client, region: String },
    /// Client already scoped to a bucket that is known to exist
    Scoped,
    /// Bucket is a directory under `root`
    Local { root: PathBuf },
}

/// A `ContentStore` over any `object_store::ObjectStore`
#[derive(Clone)]
pub struct ObjectStoreBackend {
    inner: Arc<dyn ObjectStore>,
    bucket: String,
    layout: Layout,
}

impl ObjectStoreBackend {
    /// Connect to an S3-compatible endpoint
    pub fn s3(settings: &S3Settings) -> Result<Self> {
        let endpoint = settings.endpoint_url();
        let client = AmazonS3Builder::new()
            .with_endpoint(&endpoint)
            .with_bucket_name(&settings.bucket)
            .with_access_key_id(&settings.access_key)
            .with_secret_access_key(&settings.secret_key)
            .with_region(&settings.region)
            .with_allow_http(!settings.use_ssl)
            .with_virtual_hosted_style_request(false)
            .build()
            .map_err(|e| StoreError::Configuration(e.to_string()))?;

        let credentials = Credentials::new(
            settings.access_key.clone(),
            settings.secret_key.clone(),
            None,
            None,
            "seapin",
        );
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .endpoint_url(&endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        debug!(endpoint = %endpoint, bucket = %settings.bucket, "configured S3 backend");

        Ok(Self {
            inner: Arc::new(client),
            bucket: settings.bucket.clone(),
            layout: Layout::S3 {
                admin: S3Client::from_conf(config),
                region: settings.region.clone(),
            },
        })
    }

    /// Use a directory tree on local disk, creating `root` if needed
    pub fn local(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let fs = LocalFileSystem::new_with_prefix(&root)
            .map_err(|e| StoreError::Configuration(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(fs),
            bucket: bucket.into(),
            layout: Layout::Local { root },
        })
    }

    /// Wrap an existing client that is already scoped to `bucket`
    pub fn from_store(inner: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            inner,
            bucket: bucket.into(),
            layout: Layout::Scoped,
        }
    }

    fn location(&self, key: &str) -> Path {
        match &self.layout {
            Layout::S3 { .. } | Layout::Scoped => Path::from(key),
            Layout::Local { .. } => Path::from(self.bucket.as_str()).child(key),
        }
    }

    fn info_from(key: &str, result: &GetResult) -> ObjectInfo {
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| value.to_string());
        ObjectInfo::new(key, result.meta.size, content_type)
    }

    /// A miss on a bucket that has since vanished is a backend fault, not an
    /// absent object.
    async fn classify_miss(&self, err: object_store::Error) -> StoreError {
        let err = StoreError::from(err);
        if err.is_not_found() && !matches!(self.layout, Layout::Scoped) {
            if let Ok(false) = self.bucket_exists().await {
                return StoreError::BucketNotFound(self.bucket.clone());
            }
        }
        err
    }
}

/// Classify an SDK failure by transport outcome first, then by S3 error code
fn sdk_error<E, R>(bucket: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let detail = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) => StoreError::Timeout(detail),
        SdkError::DispatchFailure(failure) if failure.is_timeout() => StoreError::Timeout(detail),
        SdkError::DispatchFailure(_) => StoreError::Connection(detail),
        _ => match err.code() {
            Some("NoSuchBucket") => StoreError::BucketNotFound(bucket.to_string()),
            Some("AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch") => {
                StoreError::PermissionDenied(detail)
            }
            _ => StoreError::Backend(detail),
        },
    }
}

#[async_trait]
impl ContentStore for ObjectStoreBackend {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn bucket_exists(&self) -> Result<bool> {
        match &self.layout {
            Layout::S3 { admin, .. } => {
                match admin.head_bucket().bucket(&self.bucket).send().await {
                    Ok(_) => Ok(true),
                    Err(SdkError::ServiceError(e)) if e.err().is_not_found() => Ok(false),
                    Err(e) => Err(sdk_error(&self.bucket, e)),
                }
            }
            Layout::Scoped => Ok(true),
            Layout::Local { root } => Ok(tokio::fs::try_exists(root.join(&self.bucket)).await?),
        }
    }

    async fn create_bucket(&self) -> Result<()> {
        match &self.layout {
            Layout::S3 { admin, region } => {
                let mut request = admin.create_bucket().bucket(&self.bucket);
                if region != DEFAULT_REGION {
                    request = request.create_bucket_configuration(
                        CreateBucketConfiguration::builder()
                            .location_constraint(BucketLocationConstraint::from(region.as_str()))
                            .build(),
                    );
                }
                match request.send().await {
                    Ok(_) => Ok(()),
                    // Another instance won the race
                    Err(SdkError::ServiceError(e)) if e.err().is_bucket_already_owned_by_you() => {
                        Ok(())
                    }
                    Err(e) => Err(sdk_error(&self.bucket, e)),
                }
            }
            Layout::Scoped => Ok(()),
            Layout::Local { root } => {
                tokio::fs::create_dir_all(root.join(&self.bucket)).await?;
                Ok(())
            }
        }
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<ObjectInfo> {
        let size = data.len() as u64;
        let mut options = PutOptions::default();
        // LocalFileSystem has nowhere to keep attributes
        if !matches!(self.layout, Layout::Local { .. }) {
            let mut attributes = Attributes::new();
            attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(content_type.to_string()),
            );
            options.attributes = attributes;
        }

        self.inner
            .put_opts(&self.location(key), PutPayload::from(data), options)
            .await?;

        Ok(ObjectInfo::new(key, size, Some(content_type.to_string())))
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<ObjectReader> {
        let result = match self.inner.get(&self.location(key)).await {
            Ok(result) => result,
            Err(e) => return Err(self.classify_miss(e).await),
        };
        let info = Self::info_from(key, &result);
        let body = result
            .into_stream()
            .map(|chunk| chunk.map_err(StoreError::from))
            .boxed();
        Ok(ObjectReader::new(info, body))
    }

    #[instrument(skip(self))]
    async fn stat(&self, key: &str) -> Result<ObjectInfo> {
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result = match self.inner.get_opts(&self.location(key), options).await {
            Ok(result) => result,
            Err(e) => return Err(self.classify_miss(e).await),
        };
        Ok(Self::info_from(key, &result))
    }
}
