mod error;
mod handlers;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use log::info;
use tower_http::trace::TraceLayer;

use crate::core::BenchError;
use crate::service::BenchService;

pub use error::ApiError;
pub use types::{ErrorResponse, HealthResponse, RunAllQuery, RunQuery, RunResponse};

pub struct BenchApi {
    service: Arc<BenchService>,
}

impl BenchApi {
    pub fn new(service: BenchService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/v1/benchmark/info", get(handlers::info))
            .route("/api/v1/benchmark/all", post(handlers::run_all))
            .route("/api/v1/benchmark/{backend}", post(handlers::run_single))
            .route("/api/v1/sharding/status", get(handlers::sharding_status))
            .route("/api/v1/sharding/enable", post(handlers::enable_sharding))
            .route(
                "/api/v1/sharding/comparison",
                post(handlers::sharding_comparison),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.service.clone())
    }

    pub async fn serve(self, addr: &str) -> Result<(), BenchError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| BenchError::IoError(format!("binding to {addr}: {e}")))?;
        info!("Listening on {addr}");
        axum::serve(listener, self.router())
            .await
            .map_err(|e| BenchError::IoError(format!("serving: {e}")))?;
        Ok(())
    }
}
