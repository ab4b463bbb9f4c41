//! ChaCha20 benchmark
use benches::{Benchmarker, criterion_group_bench};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use chacha_stream::{
    ChaCha20, ChaCha20Ietf, XChaCha20,
    cipher::{KeyIvInit, StreamCipher},
};

const KB: usize = 1024;
const SIZES: &[usize] = &[KB, 2 * KB, 4 * KB, 8 * KB, 16 * KB];

fn bench(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("chacha20");

    for size in SIZES {
        let mut buf = vec![0u8; *size];

        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_function(BenchmarkId::new("process", size), |b| {
            let mut cipher = ChaCha20::new(&Default::default(), &Default::default());
            b.iter(|| cipher.process(&mut buf));
        });

        // worst case for the partial-block buffer
        group.bench_function(BenchmarkId::new("process-byte-at-a-time", size), |b| {
            let mut cipher = ChaCha20::new(&Default::default(), &Default::default());
            b.iter(|| {
                for byte in buf.chunks_mut(1) {
                    cipher.process(byte);
                }
            });
        });

        group.bench_function(BenchmarkId::new("one-shot", size), |b| {
            b.iter(|| {
                chacha_stream::apply_keystream(&Default::default(), &Default::default(), 0, &mut buf);
            });
        });
    }

    group.finish();
}

fn bench_variants(c: &mut Benchmarker) {
    let mut group = c.benchmark_group("chacha20-variants");

    for size in SIZES {
        let mut buf = vec![0u8; *size];

        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_function(BenchmarkId::new("ietf", size), |b| {
            let mut cipher = ChaCha20Ietf::new(&Default::default(), &Default::default());
            b.iter(|| {
                cipher.seek(0).unwrap();
                cipher.apply_keystream(&mut buf);
            });
        });

        group.bench_function(BenchmarkId::new("xchacha", size), |b| {
            let mut cipher = XChaCha20::new(&Default::default(), &Default::default());
            b.iter(|| {
                cipher.seek(0).unwrap();
                cipher.apply_keystream(&mut buf);
            });
        });
    }

    group.finish();
}

criterion_group_bench!(benches, bench);
criterion_group_bench!(benches_variants, bench_variants);
criterion_main!(benches, benches_variants);
