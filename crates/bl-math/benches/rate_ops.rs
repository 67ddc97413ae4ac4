//! Criterion benchmarks for `bl-math`.
//!
//! Focus on the scalar kernels the posterior engine calls per computation.

use bl_math::odds::{odds, positive_likelihood_ratio, EvidenceStrength};
use bl_math::{format_percent, percent_to_unit, safe_ratio};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_rate_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("rates");

    for (name, sens, fpr) in [
        ("screening", 0.95, 0.05),
        ("clinic", 0.92, 0.06),
        ("fraud", 0.90, 0.02),
        ("perfect_specificity", 0.90, 0.0),
    ] {
        group.bench_with_input(
            BenchmarkId::new("likelihood_ratio", name),
            &(sens, fpr),
            |b, &(s, f)| {
                b.iter(|| {
                    let lr = positive_likelihood_ratio(black_box(s), black_box(f));
                    black_box(EvidenceStrength::from_likelihood_ratio(lr));
                });
            },
        );
    }

    group.bench_function("odds_and_ratio", |b| {
        b.iter(|| {
            let p = percent_to_unit(black_box(30.0));
            black_box(safe_ratio(black_box(276.0), black_box(318.0)));
            black_box(odds(p));
        });
    });

    group.bench_function("format_percent", |b| {
        b.iter(|| black_box(format_percent(black_box(0.161_016_949))));
    });

    group.finish();
}

criterion_group!(benches, bench_rate_kernels);
criterion_main!(benches);
