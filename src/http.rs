//! HTTP server for the metrics endpoint.
//!
//! Each request to the metrics path triggers one scrape across every
//! configured collector; nothing is cached between requests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::collector::NamespaceCollector;
use crate::exposition;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    collectors: Arc<Vec<NamespaceCollector>>,
}

/// Create the HTTP router.
fn create_router(collectors: Arc<Vec<NamespaceCollector>>, metrics_path: &str) -> Router {
    let state = AppState { collectors };

    Router::new()
        .route(metrics_path, get(metrics_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for the metrics endpoint: scrape, flatten, render.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    let mut families = Vec::new();
    for collector in state.collectors.iter() {
        families.extend(collector.collect());
    }

    let body = exposition::render(&families);

    (
        StatusCode::OK,
        [("content-type", exposition::CONTENT_TYPE)],
        body,
    )
        .into_response()
}

/// Handler for the /health endpoint.
async fn health_handler() -> Response {
    (StatusCode::OK, "healthy\n").into_response()
}

/// HTTP server serving one or more role collectors.
pub struct HttpServer {
    collectors: Arc<Vec<NamespaceCollector>>,
    listen_addr: SocketAddr,
    metrics_path: String,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(
        collectors: Vec<NamespaceCollector>,
        listen_addr: SocketAddr,
        metrics_path: String,
    ) -> Self {
        Self {
            collectors: Arc::new(collectors),
            listen_addr,
            metrics_path,
        }
    }

    /// Run the HTTP server until the shutdown signal is received.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
        let router = create_router(self.collectors, &self.metrics_path);

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.listen_addr, e))?;

        info!(
            addr = %self.listen_addr,
            path = %self.metrics_path,
            "HTTP server listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                loop {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                    if *shutdown.borrow() {
                        break;
                    }
                }
                info!("HTTP server shutting down");
            })
            .await
            .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

        info!("HTTP server stopped");
        Ok(())
    }
}
