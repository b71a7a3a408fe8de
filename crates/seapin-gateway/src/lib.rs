//! # Seapin Gateway
//!
//! HTTP gateway that stores uploads under their IPFS CID and serves them back
//! with immutable caching.
//!
//! This crate provides:
//! - **Retrieval**: `GET`/`HEAD /ipfs/{cid}` streaming from the object store
//! - **Upload**: `POST /upload` (multipart field `file`) returning the CID
//! - **Error mapping**: storage failures translated to 400/404/502/500
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP Clients                      │
//! │          (browsers, curl, IPFS tooling)             │
//! └─────────────────────────┬───────────────────────────┘
//!                           │
//! ┌─────────────────────────▼───────────────────────────┐
//! │                  Seapin Gateway                     │
//! ├─────────────────────────────────────────────────────┤
//! │   Request ID │ Request Logging │ CORS │ Body Limit  │
//! ├─────────────────────────────────────────────────────┤
//! │  Handlers (banner, get/head content, upload)        │
//! ├─────────────────────────────────────────────────────┤
//! │                   seapin-store                      │
//! │   (ContentId, ContentStore: S3 / local / memory)    │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{GatewayConfig, StorageKind};
pub use error::ApiError;
pub use server::{provision_bucket, run_server_with_shutdown};
pub use state::AppState;
