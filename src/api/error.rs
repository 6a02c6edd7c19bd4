use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::core::BenchError;

use super::types::ErrorResponse;

/// HTTP mapping of [`BenchError`].
#[derive(Debug)]
pub struct ApiError(pub BenchError);

impl From<BenchError> for ApiError {
    fn from(err: BenchError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            BenchError::UnknownBackend(_) => (StatusCode::NOT_FOUND, "UNKNOWN_BACKEND"),
            BenchError::WorkloadError(_) => (StatusCode::BAD_REQUEST, "INVALID_WORKLOAD"),
            BenchError::ConfigParsingError(_) => (StatusCode::BAD_REQUEST, "INVALID_CONFIG"),
            BenchError::ConnectionError { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "BACKEND_UNREACHABLE")
            }
            BenchError::TimeoutError { .. } => (StatusCode::SERVICE_UNAVAILABLE, "TIMEOUT"),
            BenchError::TopologyError(_) => (StatusCode::BAD_GATEWAY, "TOPOLOGY_ERROR"),
            BenchError::RunInProgress(_) => (StatusCode::CONFLICT, "RUN_IN_PROGRESS"),
            BenchError::OperationError(_) | BenchError::IoError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = ErrorResponse {
            error: self.0.to_string(),
            code: code.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
