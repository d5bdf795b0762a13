use std::hint::black_box;

use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use resus_core::{keys, Catalog, EngineManager, FindingSnapshot, PatientAge};

fn septic_findings() -> FindingSnapshot {
    FindingSnapshot::builder()
        .finding(keys::FEVER, true)
        .finding(keys::TEMPERATURE, 39.5)
        .finding(keys::RESPIRATORY_RATE, 45)
        .finding(keys::HEART_RATE, 170)
        .finding(keys::CAPILLARY_REFILL, 3)
        .finding(keys::SKIN_COLOR, "mottled")
        .finding(keys::LACTATE, 3)
        .build()
}

fn bench_evaluate(c: &mut Criterion) {
    let manager = EngineManager::builtin();
    let findings = septic_findings();
    let age = PatientAge::new(2, 0);
    let at = Utc::now();

    let mut group = c.benchmark_group("evaluate");
    group.throughput(Throughput::Elements(Catalog::builtin().len() as u64));

    group.bench_function("empty_state", |b| {
        let state = manager.create_state();
        b.iter(|| manager.evaluate_at(black_box(&findings), 15.0, age, &state, at));
    });

    // Every engine the snapshot can trigger is already live, so this measures
    // the skip path plus the history append.
    group.bench_function("steady_state", |b| {
        let state = manager.evaluate_at(&findings, 15.0, age, &manager.create_state(), at);
        b.iter(|| manager.evaluate_at(black_box(&findings), 15.0, age, &state, at));
    });

    group.bench_function("long_encounter_60", |b| {
        let quiet = FindingSnapshot::builder().finding(keys::HEART_RATE, 110).build();
        b.iter(|| {
            (0..60).fold(manager.create_state(), |state, i| {
                let snapshot = if i % 10 == 0 { &findings } else { &quiet };
                manager.evaluate_at(black_box(snapshot), 15.0, age, &state, at)
            })
        });
    });

    group.finish();
}

fn bench_reporting(c: &mut Criterion) {
    let manager = EngineManager::builtin();
    let state = manager.evaluate(
        &septic_findings(),
        15.0,
        PatientAge::new(2, 0),
        &manager.create_state(),
    );
    let state = manager.complete_action(&state, "septic-shock", "oxygen");

    c.bench_function("report/all_engine_statuses", |b| {
        b.iter(|| manager.all_engine_statuses(black_box(&state)));
    });
    c.bench_function("report/priority_queue", |b| {
        b.iter(|| manager.priority_queue(black_box(&state)));
    });
}

criterion_group!(benches, bench_evaluate, bench_reporting);
criterion_main!(benches);
