//! Benchmarks for the per-update triage pass.
//!
//! Run with: cargo bench --bench engine_benchmarks

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use noah_triage::core::assess;
use noah_triage::models::VitalsTrend;
use noah_triage::simulation::{Condition, Scenario};
use noah_triage::{ClinicalScorer, Config, PatientRegistry, RuleBasedTriage};

fn trend_with(samples: usize) -> VitalsTrend {
    let mut rng = StdRng::seed_from_u64(42);
    let mut trend = VitalsTrend::default();
    let start = Utc::now() - Duration::seconds(2 * samples as i64);
    for i in 0..samples {
        let at = start + Duration::seconds(2 * i as i64);
        trend.append(Condition::Deteriorating.sample(&mut rng, at));
    }
    trend
}

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");
    let symptoms = Condition::Critical.symptoms();

    for samples in [1usize, 30, 300] {
        let trend = trend_with(samples);
        let Some(latest) = trend.latest().cloned() else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("compute", samples), &trend, |b, trend| {
            b.iter(|| ClinicalScorer::compute(black_box(&latest), black_box(&symptoms), trend))
        });
    }
    group.finish();
}

fn bench_full_pass(c: &mut Criterion) {
    let model = RuleBasedTriage::new();
    let case = Scenario::Stemi.case().stamped(Utc::now(), Duration::seconds(30));
    let mut trend = VitalsTrend::default();
    for sample in &case.vitals {
        trend.append(sample.clone());
    }
    let Some(latest) = trend.latest().cloned() else {
        return;
    };

    c.bench_function("assess_stemi", |b| {
        b.iter(|| assess(&model, black_box(&latest), black_box(&case.symptoms), &trend))
    });
}

fn bench_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast");
    let mut rng = StdRng::seed_from_u64(7);

    for patients in [10usize, 100] {
        let registry = PatientRegistry::new(Config::default());
        for i in 0..patients {
            let id = format!("P-{}", i);
            let condition = Condition::ALL[i % Condition::ALL.len()];
            registry
                .register(&id, "AMB-001", Default::default(), None)
                .ok();
            registry.ingest_symptoms(&id, condition.symptoms()).ok();
            registry
                .ingest_vitals(&id, condition.sample(&mut rng, Utc::now()))
                .ok();
        }
        group.bench_with_input(BenchmarkId::from_parameter(patients), &registry, |b, registry| {
            b.iter(|| registry.forecast())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_scoring, bench_full_pass, bench_forecast);
criterion_main!(benches);
