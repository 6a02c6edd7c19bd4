//! Executes workloads against backends and collects their samples.

mod state;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::{Instant, timeout};

use crate::backend::BenchBackend;
use crate::conf::BenchmarkConfig;
use crate::core::BenchError;
use crate::report::{self, ComparisonResult};
use crate::timing::{RunMetrics, Sample, TimingCollector};
use crate::workload::WorkloadSpec;

pub use state::{RunState, RunTracker};

/// Bounds on every suspension point of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeouts {
    pub connect: Duration,
    pub operation: Duration,
}

impl From<&BenchmarkConfig> for Timeouts {
    fn from(config: &BenchmarkConfig) -> Self {
        Self {
            connect: config.connect_timeout,
            operation: config.operation_timeout,
        }
    }
}

/// Metrics and raw samples of one completed backend run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub metrics: RunMetrics,
    pub samples: Vec<Sample>,
}

/// Runs workloads against backends.
///
/// Operations within one backend run strictly in sequence. Multi-backend runs
/// spawn one task per backend; the only state they share is the
/// per-backend-partitioned [`TimingCollector`].
#[derive(Clone)]
pub struct RunCoordinator {
    collector: Arc<TimingCollector>,
    timeouts: Timeouts,
}

impl RunCoordinator {
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            collector: Arc::new(TimingCollector::new()),
            timeouts,
        }
    }

    pub fn collector(&self) -> &TimingCollector {
        &self.collector
    }

    /// Run `workload` against a single backend.
    ///
    /// Fails only if the workload is invalid or the backend cannot be reached
    /// (a connect timeout counts as `ConnectionError`). Operation failures are
    /// recorded as failed samples.
    pub async fn run_backend(
        &self,
        backend: &dyn BenchBackend,
        workload: &WorkloadSpec,
    ) -> Result<RunReport, BenchError> {
        let operations = workload.operations()?;
        let id = backend.id();
        let mut run = RunTracker::new(id.clone());

        run.advance(RunState::Connecting);
        let connected = match timeout(self.timeouts.connect, backend.connect()).await {
            Ok(result) => result,
            Err(_) => Err(BenchError::connection(
                id.as_str(),
                format!("timed out after {:?}", self.timeouts.connect),
            )),
        };
        let mut handle = match connected {
            Ok(handle) => handle,
            Err(e) => {
                run.advance(RunState::Failed);
                warn!("{id}: run failed before start: {e}");
                return Err(e);
            }
        };

        let recorder = match self.collector.begin(&id).await {
            Ok(recorder) => recorder,
            Err(e) => {
                run.advance(RunState::Failed);
                if let Err(close_err) = handle.close().await {
                    warn!("{id}: error while releasing connection: {close_err}");
                }
                return Err(e);
            }
        };

        run.advance(RunState::Running);
        info!("{id}: running {} operations", operations.len());

        for (i, op) in operations.enumerate() {
            let seq = i + 1;
            let kind = op.kind();
            let started = Instant::now();
            let sample = match timeout(self.timeouts.operation, handle.execute(&op)).await {
                Ok(Ok(duration)) => Sample::success(kind, seq, duration),
                Ok(Err(e)) => {
                    debug!("{id}: {kind} #{seq} failed: {e}");
                    Sample::failure(kind, seq, started.elapsed(), &e)
                }
                Err(_) => {
                    let e = BenchError::TimeoutError {
                        phase: "execute",
                        after: self.timeouts.operation,
                    };
                    debug!("{id}: {kind} #{seq} timed out");
                    Sample::failure(kind, seq, started.elapsed(), &e)
                }
            };
            recorder.record(sample).await;
        }

        run.advance(RunState::Summarizing);
        recorder.seal().await;
        match timeout(self.timeouts.connect, handle.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("{id}: error while releasing connection: {e}"),
            Err(_) => warn!("{id}: timed out releasing connection"),
        }
        drop(handle);

        let metrics = self.collector.summarize(&id).await?;
        let samples = self.collector.samples(&id).await?;
        run.advance(RunState::Done);
        info!(
            "{id}: completed {} operations ({} failed)",
            metrics.total_queries, metrics.failed_queries
        );

        Ok(RunReport { metrics, samples })
    }

    /// Run `workload` against every backend concurrently.
    ///
    /// Backends that cannot be reached appear with empty metrics, no samples
    /// and their connect error; the others are unaffected.
    pub async fn run_all(
        &self,
        backends: &[Arc<dyn BenchBackend>],
        workload: Arc<WorkloadSpec>,
    ) -> Result<ComparisonResult, BenchError> {
        workload.validate()?;
        let started = Instant::now();

        let tasks: Vec<_> = backends
            .iter()
            .map(|backend| {
                let coordinator = self.clone();
                let backend = Arc::clone(backend);
                let workload = Arc::clone(&workload);
                let id = backend.id();
                let task = tokio::spawn(async move {
                    coordinator.run_backend(backend.as_ref(), &workload).await
                });
                (id, task)
            })
            .collect();

        let mut metrics = BTreeMap::new();
        let mut samples = BTreeMap::new();
        let mut errors = BTreeMap::new();
        for (id, task) in tasks {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(BenchError::OperationError(format!("run task aborted: {e}"))),
            };
            match outcome {
                Ok(report) => {
                    metrics.insert(id.clone(), report.metrics);
                    samples.insert(id, report.samples);
                }
                Err(e) => {
                    warn!("{id}: excluded from comparison: {e}");
                    metrics.insert(id.clone(), RunMetrics::empty(id.clone()));
                    samples.insert(id.clone(), Vec::new());
                    errors.insert(id, e.to_string());
                }
            }
        }

        let total_duration = started.elapsed();
        Ok(report::compare(metrics, total_duration)
            .with_errors(errors)
            .with_details(samples))
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }
}
