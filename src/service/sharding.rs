use serde::Serialize;

use crate::timing::RunMetrics;
use crate::topology::ShardingOutcome;

/// Relative change between two runs, positive when the second is better.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Improvement {
    pub avg_time_percent: f64,
    pub throughput_percent: f64,
}

impl Improvement {
    pub fn between(before: &RunMetrics, after: &RunMetrics) -> Self {
        let avg_time_percent = match (before.avg_time, after.avg_time) {
            (Some(b), Some(a)) if b > 0.0 => (b - a) / b * 100.0,
            _ => 0.0,
        };
        let throughput_percent = if before.throughput > 0.0 {
            (after.throughput - before.throughput) / before.throughput * 100.0
        } else {
            0.0
        };
        Self {
            avg_time_percent,
            throughput_percent,
        }
    }
}

/// Document-store metrics before and after enabling sharding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShardingComparison {
    pub before_sharding: RunMetrics,
    pub sharding: ShardingOutcome,
    pub after_sharding: RunMetrics,
    pub improvement: Improvement,
}
