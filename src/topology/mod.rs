//! Administrative control of the document store's cluster topology.
//!
//! Sharding is toggled by the caller before a run starts; the run coordinator
//! never touches topology.

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use crate::core::BenchError;

mod mongo;

pub use mongo::MongoCluster;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardingStatus {
    pub is_sharded: bool,
    #[serde(default)]
    pub shard_key: Vec<String>,
    pub document_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardingOutcome {
    Enabled,
    AlreadySharded,
}

/// A cluster whose collection can be distributed across shards.
#[async_trait]
pub trait ShardedCluster: Send + Sync {
    async fn status(&self) -> Result<ShardingStatus, BenchError>;

    /// Shard the benchmark collection on `key`. Implementations report an
    /// already-sharded collection as `Ok(ShardingOutcome::AlreadySharded)`.
    async fn shard(&self, key: &str) -> Result<ShardingOutcome, BenchError>;
}

/// Enable sharding on `key`. Idempotent: an already-sharded collection is a
/// successful no-op.
pub async fn enable_sharding(
    cluster: &dyn ShardedCluster,
    key: &str,
) -> Result<ShardingOutcome, BenchError> {
    let status = cluster.status().await?;
    if status.is_sharded {
        info!(
            "Collection already sharded on {:?}, nothing to do",
            status.shard_key
        );
        return Ok(ShardingOutcome::AlreadySharded);
    }
    let outcome = cluster.shard(key).await?;
    info!("Sharding enabled with key '{}' ({:?})", key, outcome);
    Ok(outcome)
}
