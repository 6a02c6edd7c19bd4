use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use dbarena::backend::BackendId;
use dbarena::timing::{RunMetrics, Sample};
use dbarena::workload::{OperationKind, Phase, WorkloadSpec};

const OP_COUNTS: &[usize] = &[1_000, 10_000, 100_000];

fn mixed(count: usize) -> WorkloadSpec {
    let share = count / 5;
    WorkloadSpec::new(
        vec![
            Phase::new(OperationKind::Insert, share),
            Phase::new(OperationKind::PointQuery, share),
            Phase::new(OperationKind::FilterQuery, share),
            Phase::new(OperationKind::Update, share),
            Phase::new(OperationKind::Delete, count - 4 * share),
        ],
        42,
    )
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("workload/generate");
    for &count in OP_COUNTS {
        let spec = mixed(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("ops", count), &spec, |b, spec| {
            b.iter(|| spec.operations().unwrap().map(black_box).count())
        });
    }
    group.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("timing/summarize");
    let backend = BackendId::from("bench");
    for &count in OP_COUNTS {
        let samples: Vec<Sample> = (1..=count)
            .map(|seq| {
                Sample::success(
                    OperationKind::PointQuery,
                    seq,
                    Duration::from_micros(200 + (seq % 800) as u64),
                )
            })
            .collect();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("samples", count), &samples, |b, samples| {
            b.iter(|| {
                RunMetrics::from_samples(
                    backend.clone(),
                    black_box(samples),
                    Duration::from_secs(1),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_summarize);
criterion_main!(benches);
