use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::api::{self, AppState};
use crate::config::ServerConfig;

/// Full application: API under `/api`, optional frontend for everything else
pub fn app(config: &ServerConfig, state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .nest("/api", api::router(state))
        .layer(DefaultBodyLimit::max(config.body_limit_bytes));
    if let Some(dir) = &config.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(cors)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(u64::from(config.request_timeout_seconds)),
            )),
    )
}

pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = app(config, state);
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    if let (Some(cert), Some(key)) = (&config.tls_cert_path, &config.tls_key_path) {
        return serve_tls(addr, app, cert, key).await;
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")
}

#[cfg(feature = "tls")]
async fn serve_tls(addr: SocketAddr, app: Router, cert: &str, key: &str) -> Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let _ = rustls::crypto::ring::default_provider().install_default();
    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("Failed to load TLS certificate {cert} / key {key}"))?;

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    info!("Web server running at https://{}", addr);
    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .context("Web server failed")
}

#[cfg(not(feature = "tls"))]
async fn serve_tls(_addr: SocketAddr, _app: Router, _cert: &str, _key: &str) -> Result<()> {
    anyhow::bail!("TLS was configured but this build has the `tls` feature disabled")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down web server");
}
