//! Pluggable store adapters measured by the run coordinator.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conf::Config;
use crate::core::BenchError;
use crate::workload::Operation;

pub mod document;
pub mod key_value;
pub mod wide_column;

pub use document::MongoBackend;
pub use key_value::RedisBackend;
pub use wide_column::CassandraBackend;

/// Identifier of a benchmarked backend. Ordering is lexical and is used to
/// break ranking ties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendId(String);

impl BackendId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A data store that can be benchmarked.
///
/// Adapters are cheap configuration holders; all I/O starts in
/// [`BenchBackend::connect`].
#[async_trait]
pub trait BenchBackend: Send + Sync {
    fn id(&self) -> BackendId;

    /// Open a session for one run. Fails with `ConnectionError`.
    async fn connect(&self) -> Result<Box<dyn BackendHandle>, BenchError>;
}

/// A live session owned by a single run.
#[async_trait]
pub trait BackendHandle: Send {
    /// Execute one operation and return the store round-trip time.
    ///
    /// Request construction and result decoding happen outside the measured
    /// window. Failures come back as `OperationError`.
    async fn execute(&mut self, op: &Operation) -> Result<Duration, BenchError>;

    /// Release the session. Dropping a handle also releases it.
    async fn close(&mut self) -> Result<(), BenchError>;
}

/// The stores this crate ships adapters for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    MongoDb,
    Cassandra,
    Redis,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [
        BackendKind::MongoDb,
        BackendKind::Cassandra,
        BackendKind::Redis,
    ];

    pub fn id(&self) -> BackendId {
        BackendId::from(match self {
            BackendKind::MongoDb => "mongodb",
            BackendKind::Cassandra => "cassandra",
            BackendKind::Redis => "redis",
        })
    }

    fn enabled(&self, config: &Config) -> bool {
        match self {
            BackendKind::MongoDb => config.mongodb.enabled,
            BackendKind::Cassandra => config.cassandra.enabled,
            BackendKind::Redis => config.redis.enabled,
        }
    }

    fn build(&self, config: &Config) -> Arc<dyn BenchBackend> {
        match self {
            BackendKind::MongoDb => Arc::new(MongoBackend::new(config.mongodb.clone())),
            BackendKind::Cassandra => Arc::new(CassandraBackend::new(config.cassandra.clone())),
            BackendKind::Redis => Arc::new(RedisBackend::new(config.redis.clone())),
        }
    }
}

/// Build an adapter for every store enabled in `config`.
pub fn from_config(config: &Config) -> Vec<Arc<dyn BenchBackend>> {
    BackendKind::ALL
        .iter()
        .filter(|kind| kind.enabled(config))
        .map(|kind| kind.build(config))
        .collect()
}
