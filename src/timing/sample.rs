use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::core::BenchError;
use crate::workload::OperationKind;

/// Fractional milliseconds with nanosecond precision.
pub fn as_millis_f64(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

pub(crate) fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(as_millis_f64(*d))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Operation,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleError {
    pub kind: FailureKind,
    pub message: String,
}

/// Measured outcome of one executed operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    #[serde(rename = "operation")]
    pub kind: OperationKind,
    /// 1-based position of the operation within its run.
    #[serde(rename = "query_num")]
    pub seq: usize,
    #[serde(rename = "time", serialize_with = "serialize_millis")]
    pub duration: Duration,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SampleError>,
}

impl Sample {
    pub fn success(kind: OperationKind, seq: usize, duration: Duration) -> Self {
        Self {
            kind,
            seq,
            duration,
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(kind: OperationKind, seq: usize, duration: Duration, err: &BenchError) -> Self {
        let kind_of_failure = if err.is_timeout() {
            FailureKind::Timeout
        } else {
            FailureKind::Operation
        };
        Self {
            kind,
            seq,
            duration,
            succeeded: false,
            error: Some(SampleError {
                kind: kind_of_failure,
                message: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_failure_kind() {
        let err = BenchError::TimeoutError {
            phase: "execute",
            after: Duration::from_secs(5),
        };
        let sample = Sample::failure(OperationKind::Scan, 3, Duration::from_secs(5), &err);
        assert!(!sample.succeeded);
        assert_eq!(sample.error.unwrap().kind, FailureKind::Timeout);
    }

    #[test]
    fn test_serialized_shape() {
        let sample = Sample::success(OperationKind::FilterQuery, 1, Duration::from_micros(1500));
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["operation"], "filter_query");
        assert_eq!(json["query_num"], 1);
        assert_eq!(json["time"], 1.5);
        assert!(json.get("error").is_none());
    }
}
