mod sharding;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::info;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::backend::{self, BackendId, BackendKind, BenchBackend};
use crate::conf::Config;
use crate::coordinator::{RunCoordinator, RunReport, Timeouts};
use crate::core::BenchError;
use crate::report::ComparisonResult;
use crate::topology::{self, MongoCluster, ShardedCluster, ShardingOutcome, ShardingStatus};
use crate::workload::{Phase, WorkloadSpec};

pub use sharding::{Improvement, ShardingComparison};

/// Description of the configured benchmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkInfo {
    pub backends: Vec<BackendId>,
    pub phases: Vec<Phase>,
    pub seed: u64,
    pub total_operations_per_backend: usize,
}

/// Entry point for callers: resolves backends by id and drives runs and
/// topology changes.
///
/// Runs hold the topology lock shared and sharding changes hold it
/// exclusively, so the cluster layout never changes under a run.
pub struct BenchService {
    config: Config,
    backends: BTreeMap<BackendId, Arc<dyn BenchBackend>>,
    cluster: Option<Arc<dyn ShardedCluster>>,
    topology: RwLock<()>,
}

impl BenchService {
    pub fn new(config: Config) -> Self {
        let backends = backend::from_config(&config);
        let cluster: Option<Arc<dyn ShardedCluster>> = if config.mongodb.enabled {
            Some(Arc::new(MongoCluster::new(config.mongodb.clone())))
        } else {
            None
        };
        Self::with_backends(config, backends, cluster)
    }

    pub fn with_backends(
        config: Config,
        backends: Vec<Arc<dyn BenchBackend>>,
        cluster: Option<Arc<dyn ShardedCluster>>,
    ) -> Self {
        let backends = backends.into_iter().map(|b| (b.id(), b)).collect();
        Self {
            config,
            backends,
            cluster,
            topology: RwLock::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend_ids(&self) -> Vec<BackendId> {
        self.backends.keys().cloned().collect()
    }

    fn coordinator(&self) -> RunCoordinator {
        RunCoordinator::new(Timeouts::from(&self.config.benchmark))
    }

    fn backend(&self, id: &str) -> Result<Arc<dyn BenchBackend>, BenchError> {
        self.backends
            .get(&BackendId::from(id))
            .cloned()
            .ok_or_else(|| BenchError::UnknownBackend(id.to_string()))
    }

    fn cluster(&self) -> Result<&Arc<dyn ShardedCluster>, BenchError> {
        self.cluster
            .as_ref()
            .ok_or_else(|| BenchError::TopologyError("no shardable cluster configured".to_string()))
    }

    /// Run the workload (or the configured one) against one backend.
    pub async fn run_single(
        &self,
        backend: &str,
        workload: Option<WorkloadSpec>,
    ) -> Result<RunReport, BenchError> {
        let backend = self.backend(backend)?;
        let workload = workload.unwrap_or_else(|| self.config.workload.clone());
        let _layout = self.topology.read().await;
        self.coordinator()
            .run_backend(backend.as_ref(), &workload)
            .await
    }

    /// Run the workload against every registered backend concurrently.
    pub async fn run_all(
        &self,
        workload: Option<WorkloadSpec>,
    ) -> Result<ComparisonResult, BenchError> {
        let workload = Arc::new(workload.unwrap_or_else(|| self.config.workload.clone()));
        let backends: Vec<Arc<dyn BenchBackend>> = self.backends.values().cloned().collect();
        let _layout = self.topology.read().await;
        self.coordinator().run_all(&backends, workload).await
    }

    pub async fn sharding_status(&self) -> Result<ShardingStatus, BenchError> {
        self.cluster()?.status().await
    }

    /// Shard the document store on the configured key. Waits for in-flight
    /// runs to finish first.
    pub async fn enable_sharding(&self) -> Result<ShardingOutcome, BenchError> {
        let cluster = self.cluster()?;
        let _layout = self.topology.write().await;
        topology::enable_sharding(cluster.as_ref(), &self.config.mongodb.shard_key).await
    }

    /// Benchmark the document store, enable sharding, let the cluster settle,
    /// then benchmark it again.
    pub async fn sharding_comparison(&self) -> Result<ShardingComparison, BenchError> {
        let id = BackendKind::MongoDb.id();
        self.cluster()?;

        let before = self.run_single(id.as_str(), None).await?.metrics;
        let sharding = self.enable_sharding().await?;
        info!(
            "Waiting {:?} for the cluster to settle",
            self.config.benchmark.sharding_settle
        );
        tokio::time::sleep(self.config.benchmark.sharding_settle).await;
        let after = self.run_single(id.as_str(), None).await?.metrics;

        Ok(ShardingComparison {
            improvement: Improvement::between(&before, &after),
            before_sharding: before,
            sharding,
            after_sharding: after,
        })
    }

    pub fn info(&self) -> BenchmarkInfo {
        let workload = &self.config.workload;
        BenchmarkInfo {
            backends: self.backend_ids(),
            phases: workload.phases.clone(),
            seed: workload.seed,
            total_operations_per_backend: workload.total_operations(),
        }
    }
}
