use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::backend::BackendId;
use crate::core::BenchError;

use super::metrics::RunMetrics;
use super::sample::Sample;

struct Partition {
    samples: Vec<Sample>,
    started: Instant,
    finished: Option<Instant>,
}

impl Partition {
    fn sealed(&self) -> bool {
        self.finished.is_some()
    }
}

/// Append handle for one backend's partition of a [`TimingCollector`].
#[derive(Clone)]
pub struct Recorder {
    backend: BackendId,
    partition: Arc<Mutex<Partition>>,
}

impl Recorder {
    pub fn backend(&self) -> &BackendId {
        &self.backend
    }

    pub async fn record(&self, sample: Sample) {
        let mut partition = self.partition.lock().await;
        if partition.sealed() {
            log::warn!(
                "dropping sample #{} for {}: run already sealed",
                sample.seq,
                self.backend
            );
            return;
        }
        partition.samples.push(sample);
    }

    /// Close the run's wall-clock window. Later samples are rejected.
    pub async fn seal(&self) {
        let mut partition = self.partition.lock().await;
        if partition.finished.is_none() {
            partition.finished = Some(Instant::now());
        }
    }
}

/// Per-run sample store, partitioned by backend.
///
/// Concurrent backend tasks each append to their own partition. A partition
/// can only be summarised once its run has been sealed.
#[derive(Default)]
pub struct TimingCollector {
    partitions: RwLock<HashMap<BackendId, Arc<Mutex<Partition>>>>,
}

impl TimingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the partition for `backend` and start its wall clock.
    pub async fn begin(&self, backend: &BackendId) -> Result<Recorder, BenchError> {
        let mut partitions = self.partitions.write().await;
        if let Some(existing) = partitions.get(backend) {
            if !existing.lock().await.sealed() {
                return Err(BenchError::RunInProgress(backend.to_string()));
            }
        }
        let partition = Arc::new(Mutex::new(Partition {
            samples: Vec::new(),
            started: Instant::now(),
            finished: None,
        }));
        partitions.insert(backend.clone(), Arc::clone(&partition));
        Ok(Recorder {
            backend: backend.clone(),
            partition,
        })
    }

    async fn partition(&self, backend: &BackendId) -> Result<Arc<Mutex<Partition>>, BenchError> {
        let partitions = self.partitions.read().await;
        partitions
            .get(backend)
            .cloned()
            .ok_or_else(|| BenchError::UnknownBackend(backend.to_string()))
    }

    pub async fn summarize(&self, backend: &BackendId) -> Result<RunMetrics, BenchError> {
        let partition = self.partition(backend).await?;
        let partition = partition.lock().await;
        let finished = partition
            .finished
            .ok_or_else(|| BenchError::RunInProgress(backend.to_string()))?;
        Ok(RunMetrics::from_samples(
            backend.clone(),
            &partition.samples,
            finished.duration_since(partition.started),
        ))
    }

    pub async fn samples(&self, backend: &BackendId) -> Result<Vec<Sample>, BenchError> {
        let partition = self.partition(backend).await?;
        let partition = partition.lock().await;
        if !partition.sealed() {
            return Err(BenchError::RunInProgress(backend.to_string()));
        }
        Ok(partition.samples.clone())
    }

    pub async fn backends(&self) -> Vec<BackendId> {
        let mut ids: Vec<BackendId> = self.partitions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
