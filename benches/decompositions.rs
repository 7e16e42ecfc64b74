use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use geotrf::geometry::Point2;
use geotrf::linalg::{Cholesky, Eigen, Lu, Svd};
use geotrf::transform::{Affine2D, Helmert3D, Order, Transform};
use geotrf::{DynMatrix, DynVector};

// ── Helpers ─────────────────────────────────────────────────────────

/// Diagonally dominant, so symmetric positive definite.
fn spd(n: usize) -> DynMatrix<f64> {
    DynMatrix::from_fn(n, n, |i, j| {
        let off = 1.0 / (1.0 + i.abs_diff(j) as f64);
        if i == j {
            off + n as f64
        } else {
            off
        }
    })
}

fn general(n: usize) -> DynMatrix<f64> {
    DynMatrix::from_fn(n, n, |i, j| ((i * 7 + j * 3) % 11) as f64 - 5.0 + if i == j { 8.0 } else { 0.0 })
}

fn design(rows: usize, cols: usize) -> DynMatrix<f64> {
    DynMatrix::from_fn(rows, cols, |i, j| ((i + 1) as f64).powi(j as i32 % 3) + (i * j) as f64 * 0.01)
}

// ── Decompositions ──────────────────────────────────────────────────

fn lu(c: &mut Criterion) {
    let mut g = c.benchmark_group("lu");
    for n in [3, 6, 20] {
        let a = general(n);
        let b = DynVector::from_vec((0..n).map(|i| i as f64).collect());
        g.bench_function(format!("factor_solve_{n}"), |bch| {
            bch.iter(|| Lu::new(black_box(&a)).and_then(|lu| lu.solve(&b)))
        });
    }
    g.finish();
}

fn cholesky(c: &mut Criterion) {
    let mut g = c.benchmark_group("cholesky");
    for n in [3, 6, 20] {
        let a = spd(n);
        g.bench_function(format!("factor_{n}"), |bch| bch.iter(|| Cholesky::new(black_box(&a))));
    }
    g.finish();
}

fn svd(c: &mut Criterion) {
    let mut g = c.benchmark_group("svd");
    for (m, n) in [(3, 3), (14, 6), (40, 12)] {
        let a = design(m, n);
        g.bench_function(format!("{m}x{n}"), |bch| bch.iter(|| Svd::new(black_box(&a))));
    }
    g.finish();
}

fn eigen(c: &mut Criterion) {
    let mut g = c.benchmark_group("eigen");
    let s = spd(8);
    let a = general(8);
    g.bench_function("symmetric_8", |bch| bch.iter(|| Eigen::symmetric(black_box(&s))));
    g.bench_function("general_8", |bch| bch.iter(|| Eigen::general(black_box(&a))));
    g.finish();
}

// ── Fits ────────────────────────────────────────────────────────────

fn fits(c: &mut Criterion) {
    let mut g = c.benchmark_group("fit");

    let truth = Affine2D::new(150.0, 75.0, 0.25, 0.30, 0.6);
    let src: Vec<_> = (0..50)
        .map(|i| Point2::new((i % 7) as f64 * 1000.0, (i / 7) as f64 * 800.0 + (i % 3) as f64))
        .collect();
    let dst = truth.transform_batch(&src, Order::Direct).unwrap();
    g.bench_function("affine2d_50", |bch| {
        bch.iter(|| Affine2D::default().compute(black_box(&src), black_box(&dst)))
    });

    let truth = Helmert3D::new(-420.0, -99.0, -591.0, 1.000001, 4e-6, 9e-6, -3.8e-5);
    let src3: Vec<_> = src.iter().enumerate().map(|(i, p)| p.with_z((i * 37 % 50) as f64 * 90.0)).collect();
    let dst3 = truth.transform_batch(&src3, Order::Direct).unwrap();
    g.bench_function("helmert3d_50", |bch| {
        bch.iter(|| Helmert3D::default().compute(black_box(&src3), black_box(&dst3)))
    });

    g.finish();
}

criterion_group!(benches, lu, cholesky, svd, eigen, fits);
criterion_main!(benches);
