use bit_entropy::{DriverConfig, EntropyEstimator, SliceSource, StreamDriver};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

fn random_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    ChaCha20Rng::seed_from_u64(1).fill_bytes(&mut data);
    data
}

fn bench_add_bytes(c: &mut Criterion) {
    let data = random_bytes(64 * 1024);
    let mut group = c.benchmark_group("add_bytes");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for bits in [4u8, 8, 16, 20] {
        group.bench_with_input(BenchmarkId::from_parameter(bits), &bits, |b, &bits| {
            b.iter(|| {
                let mut estimator = EntropyEstimator::with_context_bits(bits).unwrap();
                estimator.add_bytes(black_box(&data));
                estimator.entropy_per_bit()
            })
        });
    }
    group.finish();
}

fn bench_driver(c: &mut Criterion) {
    let data = random_bytes(64 * 1024);
    let config = DriverConfig::new(8);
    let mut group = c.benchmark_group("driver");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("slice_source", |b| {
        b.iter(|| {
            StreamDriver::new(&config, SliceSource::new(black_box(&data)))
                .unwrap()
                .run()
                .unwrap()
                .estimate()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_add_bytes, bench_driver);
criterion_main!(benches);
