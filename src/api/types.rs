use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::BackendId;
use crate::service::ShardingComparison;
use crate::timing::{RunMetrics, Sample};
use crate::topology::{ShardingOutcome, ShardingStatus};

/// Query string of the single-backend run endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RunQuery {
    #[serde(default)]
    pub detailed: bool,
}

fn detailed_by_default() -> bool {
    true
}

/// Query string of the all-backends run endpoint. Samples are included unless
/// `detailed=false`.
#[derive(Debug, Deserialize)]
pub struct RunAllQuery {
    #[serde(default = "detailed_by_default")]
    pub detailed: bool,
}

/// Result of a single-backend run.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    #[serde(flatten)]
    pub metrics: RunMetrics,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_results: Option<Vec<Sample>>,
}

/// Outcome of a sharding toggle. `sharding_status` is absent when the status
/// could not be read back after the toggle.
#[derive(Debug, Serialize)]
pub struct EnableShardingResponse {
    pub outcome: ShardingOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharding_status: Option<ShardingStatus>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ShardingComparisonResponse {
    #[serde(flatten)]
    pub comparison: ShardingComparison,
    pub timestamp: DateTime<Utc>,
}

/// Error response format.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub backends: Vec<BackendId>,
}
