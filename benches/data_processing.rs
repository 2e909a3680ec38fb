//! Benchmarks for data processing operations
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rtplot::data::{find_sample_greater_or_equal, find_sample_less_or_equal};
use rtplot::processor::{autoscale_range, round_value_range, scan_value_range};
use rtplot::{PlotDataProvider, PlotSample, SampleBuffer, ValueRange};

fn samples(size: usize) -> Vec<PlotSample<f64>> {
    (0..size)
        .map(|i| {
            let x = i as f64;
            if i % 1000 == 999 {
                PlotSample::gap(x)
            } else {
                PlotSample::new(x, (x / 100.0).sin() * 1000.0)
            }
        })
        .collect()
}

fn bench_sample_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_push");

    for size in [1000, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("push", size), size, |b, &size| {
            let buffer = SampleBuffer::with_capacity(size);
            let mut i = 0u64;
            b.iter(|| {
                buffer.push(black_box(PlotSample::new(i as f64, i as f64)));
                i = i.wrapping_add(1);
            });
        });
    }

    group.finish();
}

fn bench_value_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_range");

    for size in [1000, 10_000, 100_000].iter() {
        let buffer = SampleBuffer::from_samples(samples(*size));

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("scan", size), &buffer, |b, buffer| {
            b.iter(|| black_box(scan_value_range(&buffer.snapshot())));
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [1000, 100_000, 1_000_000].iter() {
        let data = samples(*size);
        let middle = *size as f64 / 2.0 + 0.5;

        group.bench_with_input(BenchmarkId::new("less_or_equal", size), &data, |b, data| {
            b.iter(|| black_box(find_sample_less_or_equal(data, black_box(middle))));
        });
        group.bench_with_input(
            BenchmarkId::new("greater_or_equal", size),
            &data,
            |b, data| {
                b.iter(|| black_box(find_sample_greater_or_equal(data, black_box(middle))));
            },
        );
    }

    group.finish();
}

fn bench_rounding(c: &mut Criterion) {
    let mut group = c.benchmark_group("rounding");

    group.bench_function("round_value_range", |b| {
        b.iter(|| black_box(round_value_range(black_box(-123.456), black_box(98765.4321))))
    });
    group.bench_function("autoscale_linear", |b| {
        b.iter(|| black_box(autoscale_range(black_box(ValueRange::new(0.001, 10.0005)), false)))
    });
    group.bench_function("autoscale_log", |b| {
        b.iter(|| black_box(autoscale_range(black_box(ValueRange::new(3.0, 7000.0)), true)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sample_push,
    bench_value_range,
    bench_search,
    bench_rounding,
);

criterion_main!(benches);
