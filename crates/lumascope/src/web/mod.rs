//! Web layer
//!
//! The HTTP interface for preview retrieval: a small axum router with the
//! histogram endpoint, a health check, and Swagger UI documentation. Handlers
//! stay thin and delegate to the analysis engine and the preview cache; the
//! shared state is constructed once at startup and cloned into every handler.

use std::net::SocketAddr;

use anyhow::Result;
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::services::preview_cache::SharedPreviewCache;

pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod responses;

pub use responses::{ErrorResponse, HealthResponse, HistogramResponse, handle_error};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The preview cache both entry points share; one mutex guards the whole
    /// prune-insert-evict sequence.
    pub cache: SharedPreviewCache,
    /// Start time for uptime reporting.
    pub start_time: chrono::DateTime<chrono::Utc>,
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Config, cache: SharedPreviewCache) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        let app = Self::create_router(AppState {
            config,
            cache,
            start_time: chrono::Utc::now(),
        });
        Ok(Self { app, addr })
    }

    /// The router with all routes and middleware.
    fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health::health_check))
            .route(
                "/api/histogram/generate",
                get(handlers::histogram::generate_histogram),
            )
            .merge(Self::openapi_routes())
            .layer(CorsLayer::permissive())
            .layer(axum::middleware::from_fn(
                middleware::request_logging_middleware,
            ))
            .with_state(state)
    }

    fn openapi_routes() -> Router<AppState> {
        Router::new().merge(
            SwaggerUi::new("/docs").url("/api/openapi.json", openapi::ApiDoc::openapi()),
        )
    }

    /// A clone of the router, for driving the API in tests without binding.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until SIGINT/SIGTERM, then shut down gracefully.
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        tracing::info!("Listening on http://{}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT (Ctrl+C), shutting down gracefully");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        tracing::info!("Received Ctrl+C, shutting down gracefully");
    }
}
