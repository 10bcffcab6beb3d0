//! Throughput of the fixed-point operations.
//!
//! The interesting comparisons are saturating against fast arithmetic, and
//! interpolated against nearest-entry trigonometry.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lockstep_math::fixed_math::warm_up;
use lockstep_math::FixedNum;

/// Deterministic inputs in `[-range, range)`.
fn inputs(count: usize, range: i32, seed: u64) -> Vec<FixedNum> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let limit = FixedNum::from_int(range).raw();
    (0..count)
        .map(|_| FixedNum::from_raw(rng.i64(-limit..limit)))
        .collect()
}

fn bench_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic");
    let lhs = inputs(1024, 1000, 1);
    let rhs = inputs(1024, 1000, 2);
    group.throughput(Throughput::Elements(lhs.len() as u64));

    let pairs = || lhs.iter().zip(rhs.iter());

    group.bench_function("saturating_add", |b| {
        b.iter(|| pairs().map(|(x, y)| black_box(*x + *y)).count())
    });
    group.bench_function("fast_add", |b| {
        b.iter(|| pairs().map(|(x, y)| black_box(x.fast_add(*y))).count())
    });
    group.bench_function("saturating_mul", |b| {
        b.iter(|| pairs().map(|(x, y)| black_box(*x * *y)).count())
    });
    group.bench_function("fast_mul", |b| {
        b.iter(|| pairs().map(|(x, y)| black_box(x.fast_mul(*y))).count())
    });
    group.bench_function("checked_div", |b| {
        b.iter(|| pairs().map(|(x, y)| black_box(x.checked_div(*y))).count())
    });

    group.finish();
}

fn bench_transcendental(c: &mut Criterion) {
    warm_up();

    let mut group = c.benchmark_group("transcendental");
    let angles = inputs(1024, 10, 3);
    let positives: Vec<FixedNum> = angles.iter().map(|x| x.abs() + FixedNum::EPSILON).collect();
    let unit: Vec<FixedNum> = inputs(1024, 1, 4);
    group.throughput(Throughput::Elements(angles.len() as u64));

    let unary: [(&str, &[FixedNum], fn(FixedNum) -> FixedNum); 8] = [
        ("sin", &angles, FixedNum::sin),
        ("fast_sin", &angles, FixedNum::fast_sin),
        ("cos", &angles, FixedNum::cos),
        ("tan", &unit, FixedNum::tan),
        ("atan", &angles, FixedNum::atan),
        ("pow2", &angles, FixedNum::pow2),
        ("sqrt", &positives, |x| x.sqrt().unwrap_or_default()),
        ("log2", &positives, |x| x.log2().unwrap_or_default()),
    ];

    for (name, values, function) in unary {
        group.bench_with_input(BenchmarkId::new("unary", name), values, |b, values| {
            b.iter(|| values.iter().map(|x| black_box(function(*x))).count())
        });
    }

    group.bench_function("atan2", |b| {
        b.iter(|| {
            angles
                .iter()
                .zip(unit.iter())
                .map(|(y, x)| black_box(y.atan2(*x)))
                .count()
        })
    });

    group.finish();
}

fn bench_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");

    group.bench_function("from_f64_short", |b| b.iter(|| FixedNum::from_f64(black_box(12.375))));
    group.bench_function("from_f64_precise", |b| {
        b.iter(|| FixedNum::from_f64(black_box(12.3456789)))
    });
    group.bench_function("parse", |b| b.iter(|| black_box("-1234.56789").parse::<FixedNum>()));
    group.bench_function("display", |b| {
        let value = FixedNum::PI;
        b.iter(|| black_box(value).to_string())
    });

    group.finish();
}

criterion_group!(benches, bench_arithmetic, bench_transcendental, bench_conversion);
criterion_main!(benches);
