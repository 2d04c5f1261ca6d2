//! MockS3 server - an S3-compatible mock for local development and tests.
//!
//! Serves the [`mocks3_http::MockS3Service`] over HTTP/1.1 and HTTP/2 with
//! an in-memory object store that spills large bodies to disk.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:4567 S3_HOSTNAME=s3.mock.local mocks3-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:4567` | Bind address |
//! | `S3_HOSTNAME` | `s3.amazonaws.com` | Hostname that selects path-style addressing |
//! | `S3_AUTO_CREATE_BUCKETS` | `true` | Create missing buckets on PUT/copy |
//! | `S3_MAX_MEMORY_OBJECT_SIZE` | `524288` | Bodies above this size are spilled to disk |
//! | `DATA_DIR` | OS temp dir | Directory for spilled bodies |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use mocks3_core::{InMemoryObjectStore, MockS3Config};
use mocks3_http::MockS3Service;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the service and its store from configuration.
async fn build_service(config: &MockS3Config) -> Result<MockS3Service> {
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("failed to create data directory {}", config.data_dir))?;

    let store = Arc::new(InMemoryObjectStore::from_config(config));
    Ok(MockS3Service::new(store, config))
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: MockS3Service) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

const HEALTH_CHECK_REQUEST: &str =
    "GET /_health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n";

/// Probe the health endpoint of a running server.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    // The health endpoint only answers path-style requests, so name a root host.
    writer.write_all(HEALTH_CHECK_REQUEST.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if is_healthy_response(&response) {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

fn is_healthy_response(response: &str) -> bool {
    response.starts_with("HTTP/1.1 200") && response.contains(r#""status":"running""#)
}

/// The address to probe for `--health-check`; a wildcard bind becomes loopback.
fn health_check_addr(gateway_listen: &str) -> String {
    gateway_listen.replace("0.0.0.0", "127.0.0.1")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --health-check flag for container health probes.
    if std::env::args().any(|a| a == "--health-check") {
        let config = MockS3Config::from_env();
        let healthy = run_health_check(&health_check_addr(&config.gateway_listen))
            .await
            .is_ok();
        std::process::exit(i32::from(!healthy));
    }

    let config = MockS3Config::from_env();

    init_tracing(&config.log_level)?;

    info!(
        gateway_listen = %config.gateway_listen,
        hostname = %config.hostname,
        auto_create_buckets = config.auto_create_buckets,
        max_memory_object_size = config.max_memory_object_size,
        data_dir = %config.data_dir,
        version = VERSION,
        "starting MockS3 server",
    );

    let service = build_service(&config).await?;

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}
