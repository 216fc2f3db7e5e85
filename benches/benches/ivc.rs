//! Client IVC benchmarks: commitments, single folds, whole chains and the decider.

use client_ivc::{ClientIvc, FoldingParameters, FoldingScheme, IvcConfig};
use commitments::{msm, CommitmentKey, Transcript};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ff::Field;
use group::Group;
use ivc_benches::{accumulate_all, cubic_instances, cubic_key};
use ivc_core::{Accumulator, DefaultGroup, DefaultScalar, LogCommitment};

fn bench_msm(c: &mut Criterion) {
    let mut group = c.benchmark_group("msm");
    let mut rng = rand::thread_rng();

    for size in [64usize, 256, 1024] {
        let scalars: Vec<DefaultScalar> =
            (0..size).map(|_| DefaultScalar::random(&mut rng)).collect();
        let bases: Vec<DefaultGroup> =
            (0..size).map(|_| DefaultGroup::random(&mut rng)).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("random", size), &size, |b, _| {
            b.iter(|| msm(&scalars, &bases).unwrap())
        });
    }

    let ck = CommitmentKey::<DefaultGroup>::setup(b"ivc-bench", 1024);
    group.bench_function("key_setup_1024", |b| {
        b.iter(|| CommitmentKey::<DefaultGroup>::setup(b"ivc-bench", 1024))
    });
    let values: Vec<DefaultScalar> =
        (0..ck.len()).map(|_| DefaultScalar::random(&mut rng)).collect();
    group.bench_function("commit_1024", |b| b.iter(|| ck.commit(&values).unwrap()));

    group.finish();
}

fn bench_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold");
    let vk = cubic_key().unwrap();
    let instances = cubic_instances(&vk, 2).unwrap();
    let ivc = accumulate_all(IvcConfig::default(), &vk, &instances[..1]).unwrap();
    let accumulator: Accumulator<DefaultGroup> = ivc.accumulator().unwrap().clone();
    let log = LogCommitment::empty();

    for parallel in [true, false] {
        let scheme = FoldingScheme::new(
            vk.clone(),
            FoldingParameters {
                enable_parallel: parallel,
            },
        );
        group.bench_with_input(
            BenchmarkId::new("cubic", if parallel { "parallel" } else { "sequential" }),
            &parallel,
            |b, _| {
                b.iter(|| {
                    let mut transcript = Transcript::new(b"ivc-bench-fold");
                    scheme
                        .fold(&mut transcript, &accumulator, &instances[1], &log)
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

fn bench_accumulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulate");
    group.sample_size(10);
    let vk = cubic_key().unwrap();

    for steps in [2usize, 4, 8] {
        let instances = cubic_instances(&vk, steps).unwrap();
        group.throughput(Throughput::Elements(steps as u64));
        group.bench_with_input(BenchmarkId::new("chain", steps), &steps, |b, _| {
            b.iter(|| accumulate_all(IvcConfig::default(), &vk, &instances).unwrap())
        });
    }

    group.finish();
}

fn bench_finalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("decider");
    group.sample_size(10);
    let vk = cubic_key().unwrap();
    let instances = cubic_instances(&vk, 4).unwrap();
    let ivc = accumulate_all(IvcConfig::default(), &vk, &instances).unwrap();

    group.bench_function("finalize", |b| {
        b.iter(|| {
            let mut chain = ivc.clone();
            chain.finalize().unwrap()
        })
    });

    let (proof, vk_out) = ivc.clone().finalize().unwrap();
    group.bench_function("verify", |b| {
        b.iter(|| ClientIvc::verify(&proof, &vk_out).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_msm,
    bench_fold,
    bench_accumulate,
    bench_finalize
);
criterion_main!(benches);
