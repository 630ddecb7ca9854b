use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use densalg_core::prelude::*;

fn random_matrix(rows: usize, columns: usize, seed: u64) -> Matrix {
    let mut rng = StdRng::seed_from_u64(seed);
    Matrix::create_with_uniform_random_values_with_rng(rows, columns, -1.0, 1.0, &mut rng)
        .unwrap()
}

fn spd_matrix(n: usize, seed: u64) -> Matrix {
    let a = random_matrix(n, n, seed);
    let mut ata = a.transpose_and_return_new().multiply_and_return_new(&a).unwrap();
    for i in 0..n {
        ata.set(i, i, ata.get(i, i) + n as f64);
    }
    ata
}

pub fn decompose(c: &mut Criterion) {
    for n in [16, 64, 128] {
        let a = random_matrix(n, n, 42);
        let tall = random_matrix(2 * n, n, 7);
        let spd = spd_matrix(n, 3);

        c.bench_function(&format!("lu-{n}"), |b| {
            let mut lu = LuDecomposer::with_matrix(&a);
            b.iter(|| lu.decompose().unwrap());
        });
        c.bench_function(&format!("qr-{n}"), |b| {
            let mut qr = QrDecomposer::with_matrix(&tall);
            b.iter(|| qr.decompose().unwrap());
        });
        c.bench_function(&format!("economy-qr-{n}"), |b| {
            let mut qr = EconomyQrDecomposer::with_matrix(&tall);
            b.iter(|| qr.decompose().unwrap());
        });
        c.bench_function(&format!("cholesky-{n}"), |b| {
            let mut chol = CholeskyDecomposer::with_matrix(&spd);
            b.iter(|| chol.decompose().unwrap());
        });
        c.bench_function(&format!("svd-{n}"), |b| {
            let mut svd = SingularValueDecomposer::with_matrix(&a);
            b.iter(|| svd.decompose().unwrap());
        });
    }
}

pub fn product(c: &mut Criterion) {
    for n in [16, 64, 128] {
        let a = random_matrix(n, n, 21);
        let b = random_matrix(n, n, 22);
        let mut out = Matrix::new(n, n).unwrap();
        c.bench_function(&format!("multiply-{n}"), |bench| {
            bench.iter(|| a.multiply_into(black_box(&b), &mut out).unwrap());
        });
        c.bench_function(&format!("kronecker-{}", n / 8), |bench| {
            let small = random_matrix(n / 8, n / 8, 23);
            bench.iter(|| small.multiply_kronecker_and_return_new(black_box(&small)));
        });
    }
}

pub fn solve(c: &mut Criterion) {
    for n in [16, 64, 128] {
        let a = random_matrix(n, n, 11);
        let rhs = random_matrix(n, 1, 12);
        c.bench_function(&format!("utils-solve-{n}"), |b| {
            b.iter(|| densalg_core::utils::solve(black_box(&a), black_box(&rhs)).unwrap());
        });
    }
}

criterion_group!(benches, product, decompose, solve);
criterion_main!(benches);
