use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Time bounds applied by the run coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkConfig {
    #[serde(
        with = "humantime_serde",
        default = "BenchmarkConfig::default_connect_timeout"
    )]
    pub connect_timeout: Duration,
    #[serde(
        with = "humantime_serde",
        default = "BenchmarkConfig::default_operation_timeout"
    )]
    pub operation_timeout: Duration,
    /// Pause between enabling sharding and the follow-up run of a sharding
    /// comparison.
    #[serde(
        with = "humantime_serde",
        default = "BenchmarkConfig::default_sharding_settle"
    )]
    pub sharding_settle: Duration,
}

impl BenchmarkConfig {
    fn default_connect_timeout() -> Duration {
        Duration::from_secs(10)
    }
    fn default_operation_timeout() -> Duration {
        Duration::from_secs(5)
    }
    fn default_sharding_settle() -> Duration {
        Duration::from_secs(1)
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Self::default_connect_timeout(),
            operation_timeout: Self::default_operation_timeout(),
            sharding_settle: Self::default_sharding_settle(),
        }
    }
}
