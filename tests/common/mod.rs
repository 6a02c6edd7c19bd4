#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use dbarena::backend::BenchBackend;
use dbarena::conf::Config;
use dbarena::coordinator::{RunCoordinator, Timeouts};
use dbarena::service::BenchService;
use dbarena::topology::ShardedCluster;
use dbarena::workload::{OperationKind, Phase, WorkloadSpec};

/// 100 inserts followed by 50 point queries.
pub fn mixed_workload() -> WorkloadSpec {
    WorkloadSpec::new(
        vec![
            Phase::new(OperationKind::Insert, 100),
            Phase::new(OperationKind::PointQuery, 50),
        ],
        42,
    )
}

pub fn coordinator() -> RunCoordinator {
    RunCoordinator::new(Timeouts {
        connect: Duration::from_secs(10),
        operation: Duration::from_secs(5),
    })
}

/// A service over the given backends that runs `mixed_workload` by default.
pub fn service(
    backends: Vec<Arc<dyn BenchBackend>>,
    cluster: Option<Arc<dyn ShardedCluster>>,
) -> BenchService {
    let mut config = Config::default();
    config.workload = mixed_workload();
    config.benchmark.sharding_settle = Duration::ZERO;
    BenchService::with_backends(config, backends, cluster)
}
