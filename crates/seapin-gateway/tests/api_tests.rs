use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client, StatusCode};
use seapin_gateway::{provision_bucket, routes, AppState, GatewayConfig, StorageKind};
use seapin_store::{
    ContentStore, MemoryObjectStore, ObjectInfo, ObjectReader, Result as StoreResult, StoreError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

const HELLO_WORLD_CID: &str = "bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5e";
const IMMUTABLE: &str = "public, max-age=29030400, immutable";

/// Counts every object operation before delegating to an in-memory store
struct CountingStore {
    inner: MemoryObjectStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryObjectStore::new("ipfs"),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for CountingStore {
    fn bucket(&self) -> &str {
        self.inner.bucket()
    }

    async fn bucket_exists(&self) -> StoreResult<bool> {
        self.inner.bucket_exists().await
    }

    async fn create_bucket(&self) -> StoreResult<()> {
        self.inner.create_bucket().await
    }

    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StoreResult<ObjectInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str) -> StoreResult<ObjectReader> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn stat(&self, key: &str) -> StoreResult<ObjectInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.stat(key).await
    }
}

/// A backend that is reachable for bucket checks but fails every object call
struct UnreachableStore;

#[async_trait]
impl ContentStore for UnreachableStore {
    fn bucket(&self) -> &str {
        "ipfs"
    }

    async fn bucket_exists(&self) -> StoreResult<bool> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn create_bucket(&self) -> StoreResult<()> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn put(&self, _key: &str, _data: Bytes, _content_type: &str) -> StoreResult<ObjectInfo> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> StoreResult<ObjectReader> {
        Err(StoreError::Connection("connection refused".to_string()))
    }

    async fn stat(&self, _key: &str) -> StoreResult<ObjectInfo> {
        Err(StoreError::PermissionDenied("access denied".to_string()))
    }
}

// Helper to spawn a server on a random port
async fn spawn_server_with(store: Arc<dyn ContentStore>, config: GatewayConfig) -> String {
    let state = Arc::new(AppState::with_store(config, store));
    let app = routes::create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn spawn_server(store: Arc<dyn ContentStore>) -> String {
    let config = GatewayConfig {
        storage: StorageKind::Memory,
        ..Default::default()
    };
    spawn_server_with(store, config).await
}

async fn memory_store() -> Arc<CountingStore> {
    let store = Arc::new(CountingStore::new());
    provision_bucket(store.as_ref()).await.unwrap();
    store
}

fn file_form(data: &'static [u8], mime: Option<&str>) -> multipart::Form {
    let mut part = multipart::Part::bytes(data).file_name("upload.bin");
    if let Some(mime) = mime {
        part = part.mime_str(mime).unwrap();
    }
    multipart::Form::new().part("file", part)
}

#[tokio::test]
async fn test_banner() {
    let base_url = spawn_server(memory_store().await).await;

    let res = Client::new().get(&base_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "seapin ipfs gateway\n");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let base_url = spawn_server(memory_store().await).await;

    let res = Client::new()
        .get(format!("{}/does/not/exist", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hello_world_roundtrip() {
    let base_url = spawn_server(memory_store().await).await;
    let client = Client::new();

    // 1. Upload
    let res = client
        .post(format!("{}/upload", base_url))
        .multipart(file_form(b"hello world", Some("text/plain")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["cid"], HELLO_WORLD_CID);
    assert_eq!(body["url"], format!("/ipfs/{}", HELLO_WORLD_CID));

    // 2. Retrieve
    let res = client
        .get(format!("{}/ipfs/{}", base_url, HELLO_WORLD_CID))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.headers()["content-length"], "11");
    assert_eq!(res.headers()["cache-control"], IMMUTABLE);
    assert_eq!(
        res.headers()["x-ipfs-path"],
        format!("/ipfs/{}", HELLO_WORLD_CID).as_str()
    );
    assert_eq!(res.text().await.unwrap(), "hello world");
}

#[tokio::test]
async fn test_head_returns_headers_only() {
    let base_url = spawn_server(memory_store().await).await;
    let client = Client::new();

    client
        .post(format!("{}/upload", base_url))
        .multipart(file_form(b"hello world", Some("text/plain")))
        .send()
        .await
        .unwrap();

    let res = client
        .head(format!("{}/ipfs/{}", base_url, HELLO_WORLD_CID))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["cache-control"], IMMUTABLE);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert!(res.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_without_content_type_defaults_to_octet_stream() {
    let base_url = spawn_server(memory_store().await).await;
    let client = Client::new();

    let res = client
        .post(format!("{}/upload", base_url))
        .multipart(file_form(&[0u8, 1, 2, 3, 255], None))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    let cid = body["cid"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/ipfs/{}", base_url, cid))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/octet-stream");
    assert_eq!(res.content_length(), Some(5));
    assert_eq!(res.bytes().await.unwrap().as_ref(), &[0u8, 1, 2, 3, 255]);
}

#[tokio::test]
async fn test_reupload_is_idempotent() {
    let store = memory_store().await;
    let base_url = spawn_server(store.clone()).await;
    let client = Client::new();

    let mut cids = Vec::new();
    for _ in 0..2 {
        let res = client
            .post(format!("{}/upload", base_url))
            .multipart(file_form(b"same content twice", Some("text/plain")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = res.json().await.unwrap();
        cids.push(body["cid"].as_str().unwrap().to_string());
    }

    assert_eq!(cids[0], cids[1]);
    assert_eq!(store.inner.len(), 1);
    assert_eq!(store.inner.list_keys(), vec![cids[0].clone()]);
}

#[tokio::test]
async fn test_invalid_cid_never_reaches_storage() {
    let store = memory_store().await;
    let base_url = spawn_server(store.clone()).await;
    let client = Client::new();

    for cid in [
        "not-a-cid",
        "not-a-valid-identifier",
        // CIDv0 of "hello world"
        "QmaozNR7DZHQK1ZcU9p7QdrshMvXqWK6gpu5rmrkPdT3L4",
        // dag-pb codec over the same digest
        "bafybeifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5e",
        // sha2-512 multihash
        "bafkrgqbqt3gerhas23vuzrapkdeqf4vu2dwxp3srdj6hvg6nhsug2tgyn6mj3u23yx7utftq3i2ckw2fwdh5qmhid5qf3t35yvkc5e5ottlw6",
        // "hello world" CID followed by de ad be ef
        "bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5hpk3pxp",
        // "hello world" CID followed by a single zero byte
        "bafkreifzjut3te2nhyekklss27nh3k72ysco7y32koao5eei66wof36n5eaa",
    ] {
        let res = client
            .get(format!("{}/ipfs/{}", base_url, cid))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{cid}");
        assert_eq!(res.text().await.unwrap(), "invalid CID\n");

        let res = client
            .head(format!("{}/ipfs/{}", base_url, cid))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{cid}");
    }

    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_other_multibase_renderings_serve_canonical_object() {
    let store = memory_store().await;
    let base_url = spawn_server(store.clone()).await;
    let client = Client::new();

    let res = client
        .post(format!("{}/upload", base_url))
        .multipart(file_form(b"hello world", Some("text/plain")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let uppercase = HELLO_WORLD_CID.to_uppercase();
    for cid in [
        uppercase.as_str(),
        // base58btc
        "zb2rhj7crUKTQYRGCRATFaQ6YFLTde2YzdqbbhAASkL9uRDXn",
    ] {
        let res = client
            .get(format!("{}/ipfs/{}", base_url, cid))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "{cid}");
        assert_eq!(
            res.headers()["x-ipfs-path"],
            format!("/ipfs/{}", HELLO_WORLD_CID).as_str()
        );
        assert_eq!(res.text().await.unwrap(), "hello world");
    }

    assert_eq!(store.inner.list_keys(), vec![HELLO_WORLD_CID.to_string()]);
}

#[tokio::test]
async fn test_valid_cid_never_stored_is_not_found() {
    let base_url = spawn_server(memory_store().await).await;

    let res = Client::new()
        .get(format!("{}/ipfs/{}", base_url, HELLO_WORLD_CID))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "not found\n");
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let store = memory_store().await;
    let base_url = spawn_server(store.clone()).await;
    let client = Client::new();

    let form = multipart::Form::new().text("other", "value");
    let res = client
        .post(format!("{}/upload", base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text().await.unwrap(), "missing file field\n");

    // Not multipart at all
    let res = client
        .post(format!("{}/upload", base_url))
        .body("raw body")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_file_field_found_after_other_fields() {
    let base_url = spawn_server(memory_store().await).await;

    let form = multipart::Form::new()
        .text("note", "ignored")
        .part(
            "file",
            multipart::Part::bytes(&b"hello world"[..])
                .file_name("hello.txt")
                .mime_str("text/plain")
                .unwrap(),
        );
    let res = Client::new()
        .post(format!("{}/upload", base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["cid"], HELLO_WORLD_CID);
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let store = memory_store().await;
    let config = GatewayConfig {
        storage: StorageKind::Memory,
        max_upload_size: 64,
        ..Default::default()
    };
    let base_url = spawn_server_with(store.clone(), config).await;

    let res = Client::new()
        .post(format!("{}/upload", base_url))
        .multipart(file_form(&[7u8; 1024], None))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_storage_failure_is_bad_gateway() {
    let base_url = spawn_server(Arc::new(UnreachableStore)).await;
    let client = Client::new();

    let res = client
        .get(format!("{}/ipfs/{}", base_url, HELLO_WORLD_CID))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.text().await.unwrap(), "storage error\n");

    let res = client
        .head(format!("{}/ipfs/{}", base_url, HELLO_WORLD_CID))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    let res = client
        .post(format!("{}/upload", base_url))
        .multipart(file_form(b"hello world", Some("text/plain")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(res.text().await.unwrap(), "storage error\n");
}

#[tokio::test]
async fn test_provision_bucket_creates_missing_bucket() {
    let store = MemoryObjectStore::new("fresh");
    assert!(!store.bucket_exists().await.unwrap());

    provision_bucket(&store).await.unwrap();
    assert!(store.bucket_exists().await.unwrap());

    // Second run finds it
    provision_bucket(&store).await.unwrap();
}

#[tokio::test]
async fn test_provision_bucket_failure_is_fatal() {
    let err = provision_bucket(&UnreachableStore).await.unwrap_err();
    assert!(err.to_string().contains("ipfs"));
}

#[tokio::test]
async fn test_local_backend_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let config = GatewayConfig {
        storage: StorageKind::Local,
        local_root: dir.path().to_path_buf(),
        ..Default::default()
    };
    let state = AppState::new(config.clone()).unwrap();
    provision_bucket(state.store.as_ref()).await.unwrap();
    let base_url = spawn_server_with(state.store.clone(), config).await;
    let client = Client::new();

    let res = client
        .post(format!("{}/upload", base_url))
        .multipart(file_form(b"hello world", Some("text/plain")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(dir.path().join("ipfs").join(HELLO_WORLD_CID).is_file());

    let res = client
        .get(format!("{}/ipfs/{}", base_url, HELLO_WORLD_CID))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.content_length(), Some(11));
    assert_eq!(res.text().await.unwrap(), "hello world");
}
