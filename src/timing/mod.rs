//! Latency samples and the metrics derived from them.

mod collector;
mod metrics;
mod sample;

pub use collector::{Recorder, TimingCollector};
pub use metrics::RunMetrics;
pub use sample::{FailureKind, Sample, SampleError, as_millis_f64};
