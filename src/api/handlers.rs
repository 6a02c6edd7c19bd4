use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use chrono::Utc;
use log::warn;

use crate::core::BenchError;
use crate::report::ComparisonResult;
use crate::service::{BenchService, BenchmarkInfo};
use crate::topology::ShardingStatus;
use crate::workload::WorkloadSpec;

use super::error::ApiError;
use super::types::{
    EnableShardingResponse, HealthResponse, RunAllQuery, RunQuery, RunResponse,
    ShardingComparisonResponse,
};

/// An empty body selects the configured workload.
fn workload_override(body: &Bytes) -> Result<Option<WorkloadSpec>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let spec: WorkloadSpec = serde_json::from_slice(body)
        .map_err(|e| BenchError::WorkloadError(format!("invalid JSON: {e}")))?;
    Ok(Some(spec))
}

pub async fn health(State(service): State<Arc<BenchService>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        backends: service.backend_ids(),
    })
}

pub async fn info(State(service): State<Arc<BenchService>>) -> Json<BenchmarkInfo> {
    Json(service.info())
}

pub async fn run_all(
    State(service): State<Arc<BenchService>>,
    Query(query): Query<RunAllQuery>,
    body: Bytes,
) -> Result<Json<ComparisonResult>, ApiError> {
    let workload = workload_override(&body)?;
    let mut result = service.run_all(workload).await?;
    if !query.detailed {
        result.detailed_results.clear();
    }
    Ok(Json(result))
}

pub async fn run_single(
    State(service): State<Arc<BenchService>>,
    Path(backend): Path<String>,
    Query(query): Query<RunQuery>,
    body: Bytes,
) -> Result<Json<RunResponse>, ApiError> {
    let workload = workload_override(&body)?;
    let report = service.run_single(&backend, workload).await?;
    Ok(Json(RunResponse {
        metrics: report.metrics,
        timestamp: Utc::now(),
        detailed_results: query.detailed.then_some(report.samples),
    }))
}

pub async fn sharding_status(
    State(service): State<Arc<BenchService>>,
) -> Result<Json<ShardingStatus>, ApiError> {
    Ok(Json(service.sharding_status().await?))
}

pub async fn enable_sharding(
    State(service): State<Arc<BenchService>>,
) -> Result<Json<EnableShardingResponse>, ApiError> {
    let outcome = service.enable_sharding().await?;
    let sharding_status = match service.sharding_status().await {
        Ok(status) => Some(status),
        Err(e) => {
            warn!("Sharding {outcome:?} but status is unavailable: {e}");
            None
        }
    };
    Ok(Json(EnableShardingResponse {
        outcome,
        sharding_status,
        timestamp: Utc::now(),
    }))
}

pub async fn sharding_comparison(
    State(service): State<Arc<BenchService>>,
) -> Result<Json<ShardingComparisonResponse>, ApiError> {
    let comparison = service.sharding_comparison().await?;
    Ok(Json(ShardingComparisonResponse {
        comparison,
        timestamp: Utc::now(),
    }))
}
