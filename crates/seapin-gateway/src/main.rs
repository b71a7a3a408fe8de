//! Seapin Gateway - content-addressed IPFS gateway over an object store

use clap::Parser;
use seapin_gateway::{run_server_with_shutdown, GatewayConfig, StorageKind};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "seapin-gateway")]
#[command(about = "Content-addressed IPFS gateway backed by an object store")]
#[command(version)]
struct Args {
    /// Address to listen on (`host:port` or `:port`)
    #[arg(short, long, default_value = ":8080", env = "LISTEN_ADDR")]
    listen_addr: String,

    /// Storage backend
    #[arg(long, value_enum, default_value = "s3", env = "SEAPIN_STORAGE")]
    storage: StorageKind,

    /// S3 endpoint (`host:port`)
    #[arg(long, default_value = "minio:9000", env = "S3_ENDPOINT")]
    s3_endpoint: String,

    /// Bucket holding content objects
    #[arg(long, default_value = "ipfs", env = "S3_BUCKET")]
    s3_bucket: String,

    /// S3 access key
    #[arg(long, default_value = "minioadmin", env = "S3_ACCESS_KEY")]
    s3_access_key: String,

    /// S3 secret key
    #[arg(long, default_value = "minioadmin", env = "S3_SECRET_KEY", hide_env_values = true)]
    s3_secret_key: String,

    /// S3 region
    #[arg(long, default_value = "us-east-1", env = "S3_REGION")]
    s3_region: String,

    /// Use HTTPS for the S3 endpoint
    #[arg(long, default_value_t = false, env = "S3_USE_SSL", action = clap::ArgAction::Set)]
    s3_use_ssl: bool,

    /// Root directory for the local storage backend
    #[arg(long, default_value = "./seapin-data", env = "SEAPIN_LOCAL_ROOT")]
    local_root: PathBuf,

    /// Maximum upload size in bytes
    #[arg(long, default_value_t = 256 * 1024 * 1024, env = "MAX_UPLOAD_SIZE")]
    max_upload_size: usize,

    /// Disable CORS headers
    #[arg(long, env = "SEAPIN_NO_CORS")]
    no_cors: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "SEAPIN_LOG_JSON")]
    log_json: bool,

    /// Enable debug logging
    #[arg(short, long, env = "SEAPIN_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "seapin_gateway={level},seapin_store={level},tower_http={level}",
            level = log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Seapin gateway on {}", args.listen_addr);

    let config = GatewayConfig {
        listen_addr: args.listen_addr,
        storage: args.storage,
        s3_endpoint: args.s3_endpoint,
        s3_bucket: args.s3_bucket,
        s3_access_key: args.s3_access_key,
        s3_secret_key: args.s3_secret_key,
        s3_region: args.s3_region,
        s3_use_ssl: args.s3_use_ssl,
        local_root: args.local_root,
        max_upload_size: args.max_upload_size,
        cors_enabled: !args.no_cors,
    };

    run_server_with_shutdown(config, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
