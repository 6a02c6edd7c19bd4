//! Ranked, cross-backend comparison of run metrics.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::backend::BackendId;
use crate::timing::{RunMetrics, Sample};

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Outcome of one multi-backend run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    #[serde(rename = "benchmarks")]
    pub metrics: BTreeMap<BackendId, RunMetrics>,
    pub timestamp: DateTime<Utc>,
    /// Wall-clock span of the whole run, in seconds on the wire.
    #[serde(serialize_with = "serialize_secs")]
    pub total_duration: Duration,
    /// Fastest average latency first.
    pub ranking_by_latency: Vec<BackendId>,
    /// Highest throughput first.
    pub ranking_by_throughput: Vec<BackendId>,
    /// Connect errors of backends that never ran.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<BackendId, String>,
    /// Per-operation samples of every backend, in execution order.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub detailed_results: BTreeMap<BackendId, Vec<Sample>>,
}

impl ComparisonResult {
    pub fn with_errors(mut self, errors: BTreeMap<BackendId, String>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_details(mut self, detailed_results: BTreeMap<BackendId, Vec<Sample>>) -> Self {
        self.detailed_results = detailed_results;
        self
    }
}

/// Rank backends by latency and throughput.
///
/// Backends without a single successful operation stay in the metrics map
/// but are left out of both rankings. Ties are broken by backend id.
pub fn compare(
    metrics: BTreeMap<BackendId, RunMetrics>,
    total_duration: Duration,
) -> ComparisonResult {
    let ranked: Vec<(&BackendId, &RunMetrics, f64)> = metrics
        .iter()
        .filter_map(|(id, m)| m.avg_time.map(|avg| (id, m, avg)))
        .filter(|(_, m, _)| m.succeeded_queries() > 0)
        .collect();

    let mut by_latency = ranked.clone();
    by_latency.sort_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.0.cmp(b.0)));

    let mut by_throughput = ranked;
    by_throughput.sort_by(|a, b| {
        b.1.throughput
            .total_cmp(&a.1.throughput)
            .then_with(|| a.0.cmp(b.0))
    });

    ComparisonResult {
        ranking_by_latency: by_latency.into_iter().map(|(id, _, _)| id.clone()).collect(),
        ranking_by_throughput: by_throughput
            .into_iter()
            .map(|(id, _, _)| id.clone())
            .collect(),
        metrics,
        timestamp: Utc::now(),
        total_duration,
        errors: BTreeMap::new(),
        detailed_results: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(id: &str, avg: Option<f64>, throughput: f64) -> (BackendId, RunMetrics) {
        let total = 10;
        let m = RunMetrics {
            backend: BackendId::from(id),
            avg_time: avg,
            min_time: avg,
            max_time: avg,
            throughput,
            total_queries: total,
            failed_queries: if avg.is_some() { 0 } else { total },
        };
        (BackendId::from(id), m)
    }

    #[test]
    fn test_latency_ties_break_lexically() {
        let result = compare(
            BTreeMap::from([
                metrics("C", Some(5.0), 150.0),
                metrics("A", Some(10.0), 100.0),
                metrics("B", Some(5.0), 150.0),
            ]),
            Duration::from_secs(1),
        );
        assert_eq!(
            result.ranking_by_latency,
            vec![BackendId::from("B"), BackendId::from("C"), BackendId::from("A")]
        );
    }

    #[test]
    fn test_rankings_are_independent() {
        let result = compare(
            BTreeMap::from([
                metrics("mongodb", Some(2.0), 100.0),
                metrics("redis", Some(3.0), 400.0),
            ]),
            Duration::from_secs(1),
        );
        assert_eq!(
            result.ranking_by_latency,
            vec![BackendId::from("mongodb"), BackendId::from("redis")]
        );
        assert_eq!(
            result.ranking_by_throughput,
            vec![BackendId::from("redis"), BackendId::from("mongodb")]
        );
    }

    #[test]
    fn test_failed_backends_excluded_from_rankings() {
        let result = compare(
            BTreeMap::from([
                metrics("cassandra", None, 0.0),
                metrics("redis", Some(1.0), 900.0),
            ]),
            Duration::from_secs(2),
        );
        assert_eq!(result.ranking_by_latency, vec![BackendId::from("redis")]);
        assert_eq!(result.ranking_by_throughput, vec![BackendId::from("redis")]);
        assert_eq!(result.metrics[&BackendId::from("cassandra")].failed_queries, 10);
    }

    #[test]
    fn test_payload_shape() {
        let result = compare(
            BTreeMap::from([metrics("redis", Some(1.0), 900.0)]),
            Duration::from_millis(1500),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["benchmarks"]["redis"]["throughput"], 900.0);
        assert_eq!(json["total_duration"], 1.5);
        assert_eq!(json["ranking_by_latency"][0], "redis");
        assert!(json["timestamp"].is_string());
        assert!(json.get("errors").is_none());
        assert!(json.get("detailed_results").is_none());
    }

    #[test]
    fn test_detailed_results_keyed_by_backend() {
        use crate::workload::OperationKind;

        let samples = vec![Sample::success(OperationKind::Scan, 1, Duration::from_millis(4))];
        let result = compare(
            BTreeMap::from([metrics("redis", Some(4.0), 250.0)]),
            Duration::from_millis(4),
        )
        .with_details(BTreeMap::from([(BackendId::from("redis"), samples)]));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["detailed_results"]["redis"][0]["operation"], "scan");
        assert_eq!(json["detailed_results"]["redis"][0]["time"], 4.0);
    }
}
