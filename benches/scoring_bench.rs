//! Performance benchmarks for the scoring path.
//!
//! Encoding and scoring sit on the request hot path; explanations are only
//! computed for adverse decisions, so both branches are measured.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array1;

use riesgo::data::LabeledRecord;
use riesgo::encode::{encode, ApplicantRecord};
use riesgo::fairness::{audit, ProtectedAttribute};
use riesgo::model::{LogisticModel, ModelArtifacts, StandardScaler};
use riesgo::pipeline::{PipelineOptions, ScoringContext};
use riesgo::schema::{names, FeatureSchema};

fn bench_artifacts() -> ModelArtifacts {
    let schema = FeatureSchema::credit_default();
    let n = schema.len();
    let scaler = StandardScaler::new(Array1::zeros(n), Array1::ones(n)).unwrap();
    let mut coefs = Array1::zeros(n);
    coefs[schema.index_of(names::HAS_DELAY).unwrap()] = 3.0;
    coefs[schema.index_of(names::HIGH_UTILIZATION).unwrap()] = 1.5;
    coefs[schema.index_of(names::PAYMENT_TO_BILL_RATIO).unwrap()] = -0.8;
    let model = LogisticModel::new(coefs, -1.0).unwrap();
    ModelArtifacts::new(schema, scaler, model).unwrap()
}

fn bench_population(n: usize) -> Vec<LabeledRecord> {
    (0..n)
        .map(|i| LabeledRecord {
            record: ApplicantRecord::new(
                50_000.0 + (i % 10) as f64 * 10_000.0,
                25.0 + (i % 40) as f64,
                (i % 4) as i32 - 1,
                10_000.0 + (i % 8) as f64 * 5_000.0,
                8_000.0 + (i % 6) as f64 * 2_000.0,
            )
            .with_demographics(1 + (i % 2) as u8, 1 + (i % 3) as u8, 1 + (i % 4) as u8),
            default: i % 4 == 1,
        })
        .collect()
}

fn bench_context(population: &[LabeledRecord]) -> ScoringContext {
    let options = PipelineOptions {
        background_size: 100,
        background_seed: Some(7),
        ..PipelineOptions::default()
    };
    ScoringContext::build(bench_artifacts(), population, options).unwrap()
}

/// Benchmark record -> feature vector encoding
fn bench_encode(c: &mut Criterion) {
    let schema = FeatureSchema::credit_default();
    let record =
        ApplicantRecord::new(120_000.0, 35.0, 2, 100_000.0, 500_000.0).with_demographics(1, 2, 2);

    c.bench_function("encode_applicant", |b| {
        b.iter(|| encode(black_box(&record), &schema).unwrap());
    });
}

/// Benchmark full scoring, favorable vs adverse
fn bench_score(c: &mut Criterion) {
    let population = bench_population(500);
    let context = bench_context(&population);

    let mut group = c.benchmark_group("Score");

    // No delay, no explanation work.
    let approved =
        ApplicantRecord::new(200_000.0, 40.0, -1, 5_000.0, 20_000.0).with_demographics(2, 1, 1);
    group.bench_function("favorable", |b| {
        b.iter(|| context.score(black_box(&approved)).unwrap());
    });

    // Delay plus utilization, triggers attributions and reason codes.
    let adverse =
        ApplicantRecord::new(50_000.0, 28.0, 3, 45_000.0, 1_000.0).with_demographics(1, 2, 3);
    group.bench_function("adverse_with_explanation", |b| {
        b.iter(|| context.score(black_box(&adverse)).unwrap());
    });

    group.finish();
}

/// Benchmark context construction across population sizes
fn bench_context_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("ContextBuild");

    for size in [200, 1_000, 5_000].iter() {
        let population = bench_population(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("build", size), size, |b, _| {
            b.iter(|| {
                let options = PipelineOptions {
                    background_size: 100,
                    background_seed: Some(7),
                    ..PipelineOptions::default()
                };
                black_box(
                    ScoringContext::build(bench_artifacts(), &population, options).unwrap(),
                )
            });
        });
    }
    group.finish();
}

/// Benchmark fairness audit over the reference population
fn bench_fairness_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("FairnessAudit");

    for size in [500, 2_000].iter() {
        let population = bench_population(*size);
        let artifacts = bench_artifacts();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("audit", size), size, |b, _| {
            b.iter(|| black_box(audit(&population, &artifacts, ProtectedAttribute::Sex).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_score,
    bench_context_build,
    bench_fairness_audit
);
criterion_main!(benches);
