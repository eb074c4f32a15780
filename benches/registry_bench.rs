use criterion::{black_box, criterion_group, criterion_main, Criterion};
use saju_constitution::{
    build_registry_with, classify_birth, BirthRecord, ClassifierConfig,
};

fn roster(size: usize) -> Vec<BirthRecord> {
    (0..size)
        .map(|i| {
            let year = 1940 + (i % 80) as i64;
            let month = 1 + (i % 12);
            let day = 1 + (i % 28);
            let record = BirthRecord::new(format!("p{:05}", i), format!("{:04}-{:02}-{:02}", year, month, day));
            if i % 3 == 0 {
                record.with_hour((i % 24) as i64)
            } else {
                record
            }
        })
        .collect()
}

fn classify_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    group.bench_function("date_only", |b| {
        b.iter(|| classify_birth(black_box("2000-01-01"), None))
    });
    group.bench_function("date_and_hour", |b| {
        b.iter(|| classify_birth(black_box("1990-09-05"), black_box(Some(17))))
    });
    group.finish();
}

fn registry_bench(c: &mut Criterion) {
    let records = roster(10_000);
    let parallel = ClassifierConfig::default();
    let sequential = ClassifierConfig::default().with_parallel(false);

    let mut group = c.benchmark_group("registry");
    group.sample_size(20);
    group.bench_function("build_10k_parallel", |b| {
        b.iter(|| build_registry_with(black_box(&records), &parallel))
    });
    group.bench_function("build_10k_sequential", |b| {
        b.iter(|| build_registry_with(black_box(&records), &sequential))
    });
    group.finish();
}

criterion_group!(benches, classify_bench, registry_bench);
criterion_main!(benches);
