// ============================================================================
// Fixed-Point Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Arithmetic - add/mul/div at narrow and wide configurations
// 2. Conversion - decimal string rendering and parsing
//
// The wide configurations exercise the multi-limb register paths; the
// narrow ones stay on the single-limb fast path.
// ============================================================================

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fixbin::{to_decimal_string, FixedPoint};

fn benchmark_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic");

    let a32 = FixedPoint::<32, 16>::from(123.4375);
    let b32 = FixedPoint::<32, 16>::from(-0.328125);
    group.bench_function("add_q32_16", |bench| {
        bench.iter(|| black_box(black_box(a32.clone()) + black_box(b32.clone())))
    });
    group.bench_function("mul_q32_16", |bench| {
        bench.iter(|| black_box(black_box(a32.clone()) * black_box(b32.clone())))
    });
    group.bench_function("div_q32_16", |bench| {
        bench.iter(|| black_box(black_box(a32.clone()) / black_box(b32.clone())))
    });

    let a256 = FixedPoint::<256, 128>::from(98765.40625);
    let b256 = FixedPoint::<256, 128>::from(-3.0517578125e-5);
    group.bench_function("mul_q256_128", |bench| {
        bench.iter(|| black_box(black_box(a256.clone()) * black_box(b256.clone())))
    });
    group.bench_function("div_q256_128", |bench| {
        bench.iter(|| black_box(black_box(a256.clone()) / black_box(b256.clone())))
    });

    group.finish();
}

fn benchmark_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");

    let v = FixedPoint::<32, 16>::from(-123.4375);
    group.bench_function("to_decimal_string_q32_16", |bench| {
        bench.iter(|| black_box(to_decimal_string(black_box(&v))))
    });

    let text = to_decimal_string(&v);
    group.bench_function("parse_q32_16", |bench| {
        bench.iter(|| black_box(text.parse::<FixedPoint<32, 16>>().unwrap()))
    });

    let wide = FixedPoint::<128, 64>::from(1.0e9f64);
    group.bench_function("to_decimal_string_q128_64", |bench| {
        bench.iter(|| black_box(to_decimal_string(black_box(&wide))))
    });

    group.finish();
}

criterion_group!(benches, benchmark_arithmetic, benchmark_conversion);
criterion_main!(benches);
