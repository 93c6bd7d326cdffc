//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Turn a router's bound routes into an axum app
//! - Wire up tower-http layers (tracing, timeout, body limit)
//! - Keep axum's buffering limit in step with the configured body limit
//! - Serve plain HTTP or HTTPS until shutdown is triggered

use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ServerConfig, TlsConfig};
use crate::routing::Router;

/// How long in-flight TLS connections may drain after shutdown.
const TLS_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Listener could not be bound.
    #[error("Failed to bind: {0}")]
    Bind(#[source] std::io::Error),

    /// Address string did not parse.
    #[error("Invalid address {0:?}: {1}")]
    InvalidAddress(String, #[source] AddrParseError),

    /// Certificate or key could not be loaded.
    #[error("TLS setup failed: {0}")]
    Tls(#[source] std::io::Error),

    /// Serving failed.
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for a router.
pub struct HttpServer {
    app: axum::Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Snapshot the routes registered on `router` so far and wrap them.
    pub fn new(router: &Router, config: ServerConfig) -> Self {
        let app = Self::build_app(router, &config);
        Self { app, config }
    }

    fn build_app(router: &Router, config: &ServerConfig) -> axum::Router {
        let max_body = config.limits.max_body_bytes;
        router
            .service()
            .layer(DefaultBodyLimit::max(max_body))
            .layer(RequestBodyLimitLayer::new(max_body))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// The layered app, for in-process use.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.app.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: &TlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
            .await
            .map_err(ServerError::Tls)?;

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            shutdown_handle.graceful_shutdown(Some(TLS_GRACE_PERIOD));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.app.into_make_service_with_connect_info::<SocketAddr>())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
