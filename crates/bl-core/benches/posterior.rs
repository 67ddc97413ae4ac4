//! Criterion benchmarks for the posterior engine and change explainer.

use bl_common::{Parameter, RateInputs};
use bl_config::ScenarioCatalog;
use bl_core::inference::{compute, explain_change, sweep, ExplainOptions};
use bl_core::lab::{Edit, LabSession};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");
    for scenario in bl_config::list_scenarios() {
        group.bench_with_input(
            BenchmarkId::from_parameter(&scenario.name),
            &scenario.inputs(),
            |b, inputs| b.iter(|| black_box(compute(black_box(*inputs)))),
        );
    }
    group.finish();
}

fn bench_explain(c: &mut Criterion) {
    let before = compute(RateInputs::new(30.0, 92.0, 94.0));
    let after = compute(RateInputs::new(2.0, 90.0, 98.0));

    c.bench_function("explain_change/all_three", |b| {
        b.iter(|| black_box(explain_change(Some(black_box(&before)), black_box(&after))))
    });
    c.bench_function("explain_change/onboarding", |b| {
        b.iter(|| black_box(explain_change(None, black_box(&after))))
    });
}

fn bench_sweep(c: &mut Criterion) {
    let base = RateInputs::new(1.0, 95.0, 95.0);
    let mut group = c.benchmark_group("sweep");
    for step in [10.0, 1.0, 0.01] {
        group.bench_with_input(BenchmarkId::new("prevalence", step), &step, |b, &step| {
            b.iter(|| black_box(sweep(base, Parameter::Prevalence, 0.0, 100.0, step)))
        });
    }
    group.finish();
}

fn bench_lab_steps(c: &mut Criterion) {
    c.bench_function("lab/100_edits", |b| {
        b.iter(|| {
            let mut lab = LabSession::from_scenario(
                ScenarioCatalog::builtin(),
                "Rare disease screening",
                1000.0,
                ExplainOptions::default(),
            )
            .expect("builtin scenario");
            for i in 0..100 {
                let edit = Edit::Set(Parameter::Specificity, 90.0 + (i % 10) as f64);
                black_box(lab.apply(edit).expect("in range"));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_compute,
    bench_explain,
    bench_sweep,
    bench_lab_steps
);
criterion_main!(benches);
