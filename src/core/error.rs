use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BenchError {
    #[error("Cannot parse config: {0}")]
    ConfigParsingError(String),
    #[error("Cannot connect to {backend}: {message}")]
    ConnectionError { backend: String, message: String },
    #[error("Operation failed: {0}")]
    OperationError(String),
    #[error("Timed out during {phase} after {after:?}")]
    TimeoutError { phase: &'static str, after: Duration },
    #[error("Topology change failed: {0}")]
    TopologyError(String),
    #[error("Invalid workload: {0}")]
    WorkloadError(String),
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),
    #[error("Run still in progress for {0}")]
    RunInProgress(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl BenchError {
    pub fn connection(backend: impl Into<String>, err: impl ToString) -> Self {
        BenchError::ConnectionError {
            backend: backend.into(),
            message: err.to_string(),
        }
    }

    pub fn operation(err: impl ToString) -> Self {
        BenchError::OperationError(err.to_string())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BenchError::TimeoutError { .. })
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::IoError(err.to_string())
    }
}
