//! Integration tests for the decomposers.
//!
//! Tests verify:
//! - Reconstruction: `QR`, `PA = LU`, `L Lᵗ` and `U diag(s) Vᵗ` reproduce
//!   the input
//! - Orthonormality of `Q`, `U` and `V`
//! - Full-rank detection on square inputs
//! - The shared decomposer lifecycle

use approx::assert_abs_diff_eq;
use densalg_core::prelude::*;
use densalg_core::utils;
use rand::SeedableRng;
use rand::rngs::StdRng;

// ============================================================================
// Helper Functions
// ============================================================================

fn random(rows: usize, columns: usize, seed: u64) -> Matrix {
    let mut rng = StdRng::seed_from_u64(seed);
    Matrix::create_with_uniform_random_values_with_rng(rows, columns, -1.0, 1.0, &mut rng)
        .unwrap()
}

/// Random matrix with a dominant diagonal, far from singular.
fn non_singular(n: usize, seed: u64) -> Matrix {
    let mut m = random(n, n, seed);
    for i in 0..n {
        m[(i, i)] += n as f64;
    }
    m
}

fn spd(n: usize, seed: u64) -> Matrix {
    let a = random(n, n, seed);
    let mut m = a.transpose_and_return_new().multiply_and_return_new(&a).unwrap();
    for i in 0..n {
        m[(i, i)] += 1.0;
    }
    m
}

/// Assert `mᵗ m ≈ I`.
fn assert_orthonormal_columns(m: &Matrix, tol: f64) {
    let mtm = m.transpose_and_return_new().multiply_and_return_new(m).unwrap();
    let eye = Matrix::identity(m.columns(), m.columns()).unwrap();
    assert!(mtm.equals(&eye, tol), "columns are not orthonormal:\n{mtm}");
}

// ============================================================================
// QR
// ============================================================================

#[test]
fn test_economy_qr_round_trip() {
    for (rows, columns, seed) in [(4, 4, 1), (7, 3, 2), (10, 6, 3)] {
        let a = random(rows, columns, seed);
        let mut qr = EconomyQrDecomposer::with_matrix(&a);
        qr.decompose().unwrap();

        let q = qr.q().unwrap();
        let r = qr.r().unwrap();
        assert_eq!(q.shape(), (rows, columns));
        assert_eq!(r.shape(), (columns, columns));
        assert!(q.multiply_and_return_new(&r).unwrap().equals(&a, 1e-3));
        assert_orthonormal_columns(&q, 1e-3);
        for j in 0..columns {
            for i in (j + 1)..columns {
                assert_eq!(r.get(i, j), 0.0);
            }
        }
    }
}

#[test]
fn test_full_qr_round_trip() {
    let a = random(6, 4, 4);
    let mut qr = QrDecomposer::with_matrix(&a);
    qr.decompose().unwrap();

    let q = qr.q().unwrap();
    assert_eq!(q.shape(), (6, 6));
    assert!(utils::is_orthonormal(&q, 1e-3).unwrap());
    let qr_product = q.multiply_and_return_new(&qr.r().unwrap()).unwrap();
    assert!(qr_product.equals(&a, 1e-3));
}

#[test]
fn test_full_rank_detection() {
    let a = non_singular(5, 5);
    let mut qr = EconomyQrDecomposer::with_matrix(&a);
    qr.decompose().unwrap();
    assert!(qr.is_full_rank(1e-3).unwrap());

    let mut b = random(5, 5, 6);
    let row = b.get_row(1).unwrap().to_array();
    b.set_row(3, &row).unwrap();
    let mut qr = EconomyQrDecomposer::with_matrix(&b);
    qr.decompose().unwrap();
    assert!(!qr.is_full_rank(1e-3).unwrap());
    assert_eq!(
        qr.solve(&random(5, 1, 7), 1e-3).unwrap_err(),
        AlgebraError::RankDeficient
    );
}

// ============================================================================
// LU / Cholesky / SVD
// ============================================================================

#[test]
fn test_lu_reconstruction() {
    let a = random(6, 6, 8);
    let mut lu = LuDecomposer::with_matrix(&a);
    lu.decompose().unwrap();

    let pa = lu.p().unwrap().multiply_and_return_new(&a).unwrap();
    let product = lu
        .l()
        .unwrap()
        .multiply_and_return_new(&lu.u().unwrap())
        .unwrap();
    assert!(product.equals(&pa, 1e-10));
    assert_abs_diff_eq!(
        lu.determinant().unwrap(),
        utils::det(&a).unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn test_cholesky_reconstruction() {
    let a = spd(6, 9);
    let mut chol = CholeskyDecomposer::with_matrix(&a);
    chol.decompose().unwrap();
    let l = chol.l().unwrap();
    let llt = l.multiply_and_return_new(&l.transpose_and_return_new()).unwrap();
    assert!(llt.equals(&a, 1e-10));
}

#[test]
fn test_svd_reconstruction_and_orthonormality() {
    let a = random(7, 5, 10);
    let mut svd = SingularValueDecomposer::with_matrix(&a);
    svd.decompose().unwrap();

    let u = svd.u().unwrap();
    let v = svd.v().unwrap();
    assert_orthonormal_columns(&u, 1e-10);
    assert_orthonormal_columns(&v, 1e-10);

    let usv = u
        .multiply_and_return_new(&svd.w().unwrap())
        .unwrap()
        .multiply_and_return_new(&v.transpose_and_return_new())
        .unwrap();
    assert!(usv.equals(&a, 1e-10));

    let s = svd.singular_values().unwrap();
    assert!(s.windows(2).all(|w| w[0] >= w[1]));
    assert_abs_diff_eq!(svd.norm2().unwrap(), s[0]);
    assert_eq!(svd.rank().unwrap(), 5);
}

#[test]
fn test_pseudo_inverse_penrose_conditions() {
    let a = random(6, 4, 11);
    let pinv = utils::pseudo_inverse(&a).unwrap();
    assert_eq!(pinv.shape(), (4, 6));

    let apa = a
        .multiply_and_return_new(&pinv)
        .unwrap()
        .multiply_and_return_new(&a)
        .unwrap();
    assert!(apa.equals(&a, 1e-9));
    let pap = pinv
        .multiply_and_return_new(&a)
        .unwrap()
        .multiply_and_return_new(&pinv)
        .unwrap();
    assert!(pap.equals(&pinv, 1e-9));
}

// ============================================================================
// Lifecycle
// ============================================================================

fn check_lifecycle<'a, D: Decomposer<'a>>(mut d: D, first: &'a Matrix, second: &'a Matrix) {
    assert!(!d.is_ready());
    assert!(!d.is_locked());
    assert_eq!(d.decompose().unwrap_err(), AlgebraError::NotReady);

    d.set_input_matrix(first).unwrap();
    assert!(d.is_ready());
    assert!(!d.is_decomposition_available());

    d.decompose().unwrap();
    assert!(d.is_decomposition_available());
    assert!(!d.is_locked());

    d.set_input_matrix(second).unwrap();
    assert!(d.is_ready());
    assert!(!d.is_decomposition_available());
    d.decompose().unwrap();
    assert!(d.is_decomposition_available());
}

#[test]
fn test_decomposer_lifecycle() {
    let first = spd(4, 12);
    let second = spd(4, 13);
    check_lifecycle(LuDecomposer::new(), &first, &second);
    check_lifecycle(QrDecomposer::new(), &first, &second);
    check_lifecycle(EconomyQrDecomposer::new(), &first, &second);
    check_lifecycle(CholeskyDecomposer::new(), &first, &second);
    check_lifecycle(SingularValueDecomposer::new(), &first, &second);
}

#[test]
fn test_factors_not_available_before_decompose() {
    let a = spd(3, 14);
    let qr = EconomyQrDecomposer::with_matrix(&a);
    assert_eq!(qr.q().unwrap_err(), AlgebraError::NotAvailable);
    let lu = LuDecomposer::with_matrix(&a);
    assert_eq!(lu.determinant().unwrap_err(), AlgebraError::NotAvailable);
    let svd = SingularValueDecomposer::with_matrix(&a);
    assert_eq!(svd.rank().unwrap_err(), AlgebraError::NotAvailable);
}
