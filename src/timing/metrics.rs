use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::BackendId;

use super::sample::{Sample, as_millis_f64};

/// Aggregate metrics of one backend's run. Times are in milliseconds and are
/// absent when no operation succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub backend: BackendId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<f64>,
    /// Successful operations per second of wall-clock run time.
    pub throughput: f64,
    pub total_queries: usize,
    pub failed_queries: usize,
}

impl RunMetrics {
    /// Metrics of a backend that never executed an operation.
    pub fn empty(backend: BackendId) -> Self {
        Self {
            backend,
            avg_time: None,
            min_time: None,
            max_time: None,
            throughput: 0.0,
            total_queries: 0,
            failed_queries: 0,
        }
    }

    /// Derive metrics from every sample of a run. `elapsed` is the wall-clock
    /// span of the run, failed operations included.
    pub fn from_samples(backend: BackendId, samples: &[Sample], elapsed: Duration) -> Self {
        let succeeded: Vec<f64> = samples
            .iter()
            .filter(|s| s.succeeded)
            .map(|s| as_millis_f64(s.duration))
            .collect();

        let total_queries = samples.len();
        let failed_queries = total_queries - succeeded.len();

        if succeeded.is_empty() {
            return Self {
                total_queries,
                failed_queries,
                ..Self::empty(backend)
            };
        }

        let sum: f64 = succeeded.iter().sum();
        let min = succeeded.iter().copied().fold(f64::INFINITY, f64::min);
        let max = succeeded.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let secs = elapsed.as_secs_f64();
        let throughput = if secs > 0.0 {
            succeeded.len() as f64 / secs
        } else {
            0.0
        };

        Self {
            backend,
            avg_time: Some(sum / succeeded.len() as f64),
            min_time: Some(min),
            max_time: Some(max),
            throughput,
            total_queries,
            failed_queries,
        }
    }

    pub fn succeeded_queries(&self) -> usize {
        self.total_queries - self.failed_queries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BenchError;
    use crate::workload::OperationKind;

    fn ok(ms: u64) -> Sample {
        Sample::success(OperationKind::PointQuery, 1, Duration::from_millis(ms))
    }

    fn failed(ms: u64) -> Sample {
        Sample::failure(
            OperationKind::PointQuery,
            1,
            Duration::from_millis(ms),
            &BenchError::operation("boom"),
        )
    }

    #[test]
    fn test_mean_min_max_over_successes_only() {
        let samples = vec![ok(2), ok(4), failed(100), ok(6)];
        let m = RunMetrics::from_samples("redis".into(), &samples, Duration::from_millis(112));
        assert_eq!(m.total_queries, 4);
        assert_eq!(m.failed_queries, 1);
        assert_eq!(m.avg_time, Some(4.0));
        assert_eq!(m.min_time, Some(2.0));
        assert_eq!(m.max_time, Some(6.0));
    }

    #[test]
    fn test_throughput_uses_wall_clock() {
        let samples = vec![ok(1), ok(1), failed(8)];
        let m = RunMetrics::from_samples("redis".into(), &samples, Duration::from_millis(10));
        assert!((m.throughput - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_successes_reports_absent_times() {
        let samples = vec![failed(3), failed(4)];
        let m = RunMetrics::from_samples("mongodb".into(), &samples, Duration::from_millis(7));
        assert_eq!(m.total_queries, 2);
        assert_eq!(m.failed_queries, 2);
        assert_eq!(m.avg_time, None);
        assert_eq!(m.min_time, None);
        assert_eq!(m.max_time, None);
        assert_eq!(m.throughput, 0.0);

        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("avg_time").is_none());
        assert_eq!(json["throughput"], 0.0);
    }
}
