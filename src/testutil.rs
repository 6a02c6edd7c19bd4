//! Test and benchmark utilities.
//!
//! This module is only available when the `testutil` feature is enabled.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

use crate::backend::{BackendHandle, BackendId, BenchBackend};
use crate::core::BenchError;
use crate::topology::{ShardedCluster, ShardingOutcome, ShardingStatus};
use crate::workload::Operation;

/// Long enough to trip any timeout used in tests.
const HANG: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq)]
enum ConnectBehavior {
    Succeed,
    Fail,
    Hang,
}

/// Counters shared between a [`MockBackend`] and the handles it opens.
#[derive(Debug, Default)]
pub struct MockStats {
    pub connects: AtomicUsize,
    pub closes: AtomicUsize,
    pub executed: AtomicUsize,
}

impl MockStats {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }
}

/// In-process backend with a fixed per-operation latency.
///
/// Latency is produced with `tokio::time::sleep`, so tests running on a
/// paused clock get exact, repeatable timings.
pub struct MockBackend {
    id: BackendId,
    latency: Duration,
    connect: ConnectBehavior,
    fail_every: Option<usize>,
    hang_on: Option<usize>,
    stats: Arc<MockStats>,
}

impl MockBackend {
    pub fn new(id: &str) -> Self {
        Self {
            id: BackendId::from(id),
            latency: Duration::from_millis(1),
            connect: ConnectBehavior::Succeed,
            fail_every: None,
            hang_on: None,
            stats: Arc::new(MockStats::default()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// `connect` always fails with `ConnectionError`.
    pub fn unreachable(mut self) -> Self {
        self.connect = ConnectBehavior::Fail;
        self
    }

    /// `connect` never completes.
    pub fn hanging_connect(mut self) -> Self {
        self.connect = ConnectBehavior::Hang;
        self
    }

    /// Every `n`-th operation (1-based) fails with `OperationError`.
    pub fn fail_every(mut self, n: usize) -> Self {
        self.fail_every = Some(n.max(1));
        self
    }

    /// Operation number `seq` (1-based) never completes.
    pub fn hang_on(mut self, seq: usize) -> Self {
        self.hang_on = Some(seq);
        self
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl BenchBackend for MockBackend {
    fn id(&self) -> BackendId {
        self.id.clone()
    }

    async fn connect(&self) -> Result<Box<dyn BackendHandle>, BenchError> {
        match self.connect {
            ConnectBehavior::Fail => {
                return Err(BenchError::connection(self.id.as_str(), "connection refused"));
            }
            ConnectBehavior::Hang => sleep(HANG).await,
            ConnectBehavior::Succeed => {}
        }
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockHandle {
            latency: self.latency,
            fail_every: self.fail_every,
            hang_on: self.hang_on,
            seq: 0,
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct MockHandle {
    latency: Duration,
    fail_every: Option<usize>,
    hang_on: Option<usize>,
    seq: usize,
    stats: Arc<MockStats>,
}

#[async_trait]
impl BackendHandle for MockHandle {
    async fn execute(&mut self, op: &Operation) -> Result<Duration, BenchError> {
        self.seq += 1;
        self.stats.executed.fetch_add(1, Ordering::SeqCst);
        if self.hang_on == Some(self.seq) {
            sleep(HANG).await;
        }
        let start = Instant::now();
        sleep(self.latency).await;
        let elapsed = start.elapsed();
        match self.fail_every {
            Some(n) if self.seq % n == 0 => Err(BenchError::OperationError(format!(
                "injected failure on {} #{}",
                op.kind(),
                self.seq
            ))),
            _ => Ok(elapsed),
        }
    }

    async fn close(&mut self) -> Result<(), BenchError> {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory cluster for topology tests.
#[derive(Default)]
pub struct MockCluster {
    shard_key: Mutex<Option<String>>,
    shard_calls: AtomicUsize,
    fail_with: Option<String>,
    status_error_once_sharded: Option<String>,
}

impl MockCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cluster whose collection is sharded on `key` from the start.
    pub fn sharded(key: &str) -> Self {
        Self {
            shard_key: Mutex::new(Some(key.to_string())),
            ..Self::default()
        }
    }

    /// A cluster rejecting every shard request.
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// A cluster that shards fine but can no longer report its status
    /// afterwards.
    pub fn unreadable_once_sharded(message: &str) -> Self {
        Self {
            status_error_once_sharded: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn shard_calls(&self) -> usize {
        self.shard_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShardedCluster for MockCluster {
    async fn status(&self) -> Result<ShardingStatus, BenchError> {
        let key = self.shard_key.lock().await;
        if let (Some(message), Some(_)) = (&self.status_error_once_sharded, key.as_ref()) {
            return Err(BenchError::TopologyError(message.clone()));
        }
        Ok(ShardingStatus {
            is_sharded: key.is_some(),
            shard_key: key.iter().cloned().collect(),
            document_count: 344,
        })
    }

    async fn shard(&self, key: &str) -> Result<ShardingOutcome, BenchError> {
        self.shard_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.fail_with {
            return Err(BenchError::TopologyError(message.clone()));
        }
        let mut current = self.shard_key.lock().await;
        if current.is_some() {
            return Ok(ShardingOutcome::AlreadySharded);
        }
        *current = Some(key.to_string());
        Ok(ShardingOutcome::Enabled)
    }
}
