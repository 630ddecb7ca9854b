//! Matrix-level helpers built on top of the decomposers.
//!
//! | Function | Backed by |
//! |----------|-----------|
//! | [`solve`] | LU (square) or economy QR (tall) |
//! | [`inverse`] | LU (square) or SVD pseudo-inverse (rectangular) |
//! | [`pseudo_inverse`], [`rank`], [`cond`], [`norm2`] | SVD |
//! | [`det`] | LU |
//! | [`norm_f`], [`norm_1`], [`norm_inf`] | [`norm`](crate::norm) computers |
//! | [`schurc`] | LU inverse of one block, optional Cholesky |
//!
//! Every function builds its decomposer internally; nothing is cached
//! between calls.

use crate::Matrix;
use crate::decomposer::{
    CholeskyDecomposer, Decomposer, EconomyQrDecomposer, LuDecomposer, SingularValueDecomposer,
    check_round_error,
};
use crate::error::{AlgebraError, Result};
use crate::norm::{FrobeniusNormComputer, InfinityNormComputer, NormComputer, OneNormComputer};

/// Threshold used by [`is_orthogonal_default`] and [`is_orthonormal_default`].
pub const DEFAULT_ORTHOGONALITY_THRESHOLD: f64 = 1e-6;

/// Threshold used by [`is_symmetric_default`].
pub const DEFAULT_SYMMETRY_THRESHOLD: f64 = 0.0;

/// Relative rounding error used by [`solve`], [`inverse`] and [`schurc`].
///
/// A pivot counts as zero when its magnitude is at most this value times
/// `max(norm_1(m), norm_inf(m))`, so uniformly scaling a matrix does not
/// change whether it is considered singular.
pub const DEFAULT_ROUND_ERROR: f64 = 1e-8;

fn decomposed_lu(m: &Matrix) -> Result<LuDecomposer<'_>> {
    let mut lu = LuDecomposer::with_matrix(m);
    lu.decompose()?;
    Ok(lu)
}

fn decomposed_svd(m: &Matrix) -> Result<SingularValueDecomposer<'_>> {
    let mut svd = SingularValueDecomposer::with_matrix(m);
    svd.decompose()?;
    Ok(svd)
}

/// `round_error` scaled by the magnitude of `m`.
fn scaled_round_error(m: &Matrix, round_error: f64) -> Result<f64> {
    check_round_error(round_error)?;
    Ok(round_error * norm_1(m).max(norm_inf(m)))
}

fn check_threshold(threshold: f64) -> Result<()> {
    if threshold < 0.0 {
        return Err(AlgebraError::InvalidArgument {
            reason: "threshold must be non-negative",
        });
    }
    Ok(())
}

fn check_square(m: &Matrix) -> Result<()> {
    if !m.is_square() {
        return Err(AlgebraError::DimensionMismatch {
            expected: (m.rows(), m.rows()),
            got: m.shape(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Linear systems and inverses
// ---------------------------------------------------------------------------

/// Solve `m · x = b`.
///
/// Square matrices go through LU; tall matrices get the least-squares
/// solution from economy QR. Wide matrices are rejected. Singularity is
/// judged with [`DEFAULT_ROUND_ERROR`] relative to the size of `m`.
///
/// ```
/// # use densalg_core::{Matrix, utils};
/// let a = Matrix::from_rows(2, 2, &[2.0, 1.0, 1.0, 4.0]).unwrap();
/// let b = Matrix::from_rows(2, 1, &[5.0, 6.0]).unwrap();
/// let x = utils::solve(&a, &b).unwrap();
/// assert!((x.get(0, 0) - 2.0).abs() < 1e-10);
/// assert!((x.get(1, 0) - 1.0).abs() < 1e-10);
/// ```
pub fn solve(m: &Matrix, b: &Matrix) -> Result<Matrix> {
    solve_with_tolerance(m, b, DEFAULT_ROUND_ERROR)
}

/// [`solve`] with an explicit relative rounding error.
pub fn solve_with_tolerance(m: &Matrix, b: &Matrix, round_error: f64) -> Result<Matrix> {
    let mut x = Matrix::zeros_unchecked(1, 1);
    solve_into_with_tolerance(m, b, round_error, &mut x)?;
    Ok(x)
}

/// Like [`solve`], writing the solution into `result`.
pub fn solve_into(m: &Matrix, b: &Matrix, result: &mut Matrix) -> Result<()> {
    solve_into_with_tolerance(m, b, DEFAULT_ROUND_ERROR, result)
}

/// Like [`solve_with_tolerance`], writing the solution into `result`.
pub fn solve_into_with_tolerance(
    m: &Matrix,
    b: &Matrix,
    round_error: f64,
    result: &mut Matrix,
) -> Result<()> {
    let tolerance = scaled_round_error(m, round_error)?;
    let (rows, columns) = m.shape();
    if rows < columns {
        return Err(AlgebraError::DimensionMismatch {
            expected: (columns, columns),
            got: m.shape(),
        });
    }
    if rows == columns {
        let x = decomposed_lu(m)?.solve(b, tolerance)?;
        result.copy_from(&x);
        Ok(())
    } else {
        let mut qr = EconomyQrDecomposer::with_matrix(m);
        qr.decompose()?;
        qr.solve_into(b, tolerance, result)
    }
}

/// Inverse of `m`: the true inverse for square matrices (fails with
/// [`AlgebraError::RankDeficient`] when singular), the Moore-Penrose
/// pseudo-inverse otherwise.
///
/// ```
/// # use densalg_core::{Matrix, utils};
/// let a = Matrix::from_rows(2, 2, &[2.0, 1.0, 1.0, 4.0]).unwrap();
/// let inv = utils::inverse(&a).unwrap();
/// let eye = a.multiply_and_return_new(&inv).unwrap();
/// assert!(eye.equals(&Matrix::identity(2, 2).unwrap(), 1e-12));
/// ```
pub fn inverse(m: &Matrix) -> Result<Matrix> {
    inverse_with_tolerance(m, DEFAULT_ROUND_ERROR)
}

/// [`inverse`] with an explicit relative rounding error. The tolerance
/// only applies to square matrices.
pub fn inverse_with_tolerance(m: &Matrix, round_error: f64) -> Result<Matrix> {
    let tolerance = scaled_round_error(m, round_error)?;
    if m.is_square() {
        decomposed_lu(m)?.inverse_with_round_error(tolerance)
    } else {
        pseudo_inverse(m)
    }
}

/// Like [`inverse`], writing into `result`.
pub fn inverse_into(m: &Matrix, result: &mut Matrix) -> Result<()> {
    let inv = inverse(m)?;
    result.copy_from(&inv);
    Ok(())
}

/// Moore-Penrose pseudo-inverse, defined for any matrix.
pub fn pseudo_inverse(m: &Matrix) -> Result<Matrix> {
    decomposed_svd(m)?.pseudo_inverse()
}

/// Determinant of a square matrix.
pub fn det(m: &Matrix) -> Result<f64> {
    check_square(m)?;
    decomposed_lu(m)?.determinant()
}

// ---------------------------------------------------------------------------
// Spectral quantities
// ---------------------------------------------------------------------------

/// Numerical rank: singular values above the negligible threshold.
pub fn rank(m: &Matrix) -> Result<usize> {
    decomposed_svd(m)?.rank()
}

/// 2-norm condition number `σ_max / σ_min`.
pub fn cond(m: &Matrix) -> Result<f64> {
    decomposed_svd(m)?.condition_number()
}

/// Spectral norm (largest singular value).
pub fn norm2(m: &Matrix) -> Result<f64> {
    decomposed_svd(m)?.norm2()
}

/// Sum of the `min(rows, columns)` diagonal entries.
pub fn trace(m: &Matrix) -> f64 {
    m.get_diagonal().iter().sum()
}

/// Frobenius norm.
pub fn norm_f(m: &Matrix) -> f64 {
    FrobeniusNormComputer.norm(m)
}

/// Euclidean norm of a vector.
pub fn norm_f_array(v: &[f64]) -> f64 {
    FrobeniusNormComputer.norm_of_array(v)
}

/// Maximum absolute column sum.
pub fn norm_1(m: &Matrix) -> f64 {
    OneNormComputer.norm(m)
}

/// Sum of absolute values of a vector.
pub fn norm_1_array(v: &[f64]) -> f64 {
    OneNormComputer.norm_of_array(v)
}

/// Maximum absolute row sum.
pub fn norm_inf(m: &Matrix) -> f64 {
    InfinityNormComputer.norm(m)
}

/// Largest absolute value of a vector.
pub fn norm_inf_array(v: &[f64]) -> f64 {
    InfinityNormComputer.norm_of_array(v)
}

// ---------------------------------------------------------------------------
// Structural predicates
// ---------------------------------------------------------------------------

/// Whether `|m[i, j] - m[j, i]| <= threshold` for every pair of cells.
/// Non-square matrices are never symmetric.
pub fn is_symmetric(m: &Matrix, threshold: f64) -> Result<bool> {
    check_threshold(threshold)?;
    if !m.is_square() {
        return Ok(false);
    }
    let n = m.rows();
    Ok((0..n).all(|i| (0..i).all(|j| (m.get(i, j) - m.get(j, i)).abs() <= threshold)))
}

/// [`is_symmetric`] with exact comparison.
pub fn is_symmetric_default(m: &Matrix) -> bool {
    is_symmetric(m, DEFAULT_SYMMETRY_THRESHOLD).unwrap_or(false)
}

fn gram(m: &Matrix) -> Result<Matrix> {
    m.transpose_and_return_new().multiply_and_return_new(m)
}

/// Whether the columns of a square `m` are mutually perpendicular: every
/// off-diagonal entry of `mᵗ · m` is within `threshold` of zero.
pub fn is_orthogonal(m: &Matrix, threshold: f64) -> Result<bool> {
    check_threshold(threshold)?;
    if !m.is_square() {
        return Ok(false);
    }
    let g = gram(m)?;
    let n = g.rows();
    Ok((0..n).all(|j| (0..n).all(|i| i == j || g.get(i, j).abs() <= threshold)))
}

/// [`is_orthogonal`] with [`DEFAULT_ORTHOGONALITY_THRESHOLD`].
pub fn is_orthogonal_default(m: &Matrix) -> bool {
    is_orthogonal(m, DEFAULT_ORTHOGONALITY_THRESHOLD).unwrap_or(false)
}

/// Whether a square `m` is orthogonal with unit-norm columns: `mᵗ · m` is
/// the identity within `threshold`.
pub fn is_orthonormal(m: &Matrix, threshold: f64) -> Result<bool> {
    check_threshold(threshold)?;
    if !m.is_square() {
        return Ok(false);
    }
    let g = gram(m)?;
    Ok(g.equals(&Matrix::identity(g.rows(), g.columns())?, threshold))
}

/// [`is_orthonormal`] with [`DEFAULT_ORTHOGONALITY_THRESHOLD`].
pub fn is_orthonormal_default(m: &Matrix) -> bool {
    is_orthonormal(m, DEFAULT_ORTHOGONALITY_THRESHOLD).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// 3-D vector algebra
// ---------------------------------------------------------------------------

fn check_len(v: &[f64], expected: usize) -> Result<()> {
    if v.len() != expected {
        return Err(AlgebraError::InvalidLength {
            expected,
            got: v.len(),
        });
    }
    Ok(())
}

/// Cross-product matrix `[v]ₓ` of a 3-vector, so that `[v]ₓ · w = v × w`.
///
/// ```
/// # use densalg_core::{Matrix, utils};
/// let s = utils::skew_matrix(&[1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(
///     s.to_array_with_order(false),
///     vec![0.0, -3.0, 2.0, 3.0, 0.0, -1.0, -2.0, 1.0, 0.0]
/// );
/// ```
pub fn skew_matrix(v: &[f64]) -> Result<Matrix> {
    let mut s = Matrix::zeros_unchecked(3, 3);
    skew_matrix_into(v, &mut s)?;
    Ok(s)
}

/// Like [`skew_matrix`], writing into `result` (resized to `3 x 3`).
pub fn skew_matrix_into(v: &[f64], result: &mut Matrix) -> Result<()> {
    check_len(v, 3)?;
    result.ensure_shape(3, 3)?;
    result.from_array_with_order(
        &[0.0, -v[2], v[1], v[2], 0.0, -v[0], -v[1], v[0], 0.0],
        false,
    )
}

/// [`skew_matrix`] of a `3 x 1` or `1 x 3` matrix.
pub fn skew_matrix_from_matrix(v: &Matrix) -> Result<Matrix> {
    if v.shape() != (3, 1) && v.shape() != (1, 3) {
        return Err(AlgebraError::DimensionMismatch {
            expected: (3, 1),
            got: v.shape(),
        });
    }
    skew_matrix(v.buffer())
}

/// [`skew_matrix`] together with its `9 x 3` jacobian: row `k` holds the
/// derivative of the `k`-th column-major entry of `[v]ₓ` with respect to
/// `v`.
pub fn skew_matrix_with_jacobian(v: &[f64]) -> Result<(Matrix, Matrix)> {
    let s = skew_matrix(v)?;
    let mut jacobian = Matrix::zeros_unchecked(9, 3);
    // column-major entries: s10 = v2, s20 = -v1, s01 = -v2,
    // s21 = v0, s02 = v1, s12 = -v0
    jacobian.set(1, 2, 1.0);
    jacobian.set(2, 1, -1.0);
    jacobian.set(3, 2, -1.0);
    jacobian.set(5, 0, 1.0);
    jacobian.set(6, 1, 1.0);
    jacobian.set(7, 0, -1.0);
    Ok((s, jacobian))
}

/// `a × b` for 3-vectors.
pub fn cross_product(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    check_len(a, 3)?;
    check_len(b, 3)?;
    Ok(vec![
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ])
}

/// [`cross_product`] with its jacobians: `-[b]ₓ` with respect to `a` and
/// `[a]ₓ` with respect to `b`.
pub fn cross_product_with_jacobians(a: &[f64], b: &[f64]) -> Result<(Vec<f64>, Matrix, Matrix)> {
    let c = cross_product(a, b)?;
    let mut jacobian_a = skew_matrix(b)?;
    jacobian_a.multiply_by_scalar(-1.0);
    let jacobian_b = skew_matrix(a)?;
    Ok((c, jacobian_a, jacobian_b))
}

/// Sum of element-wise products.
pub fn dot_product(a: &[f64], b: &[f64]) -> Result<f64> {
    crate::array_utils::dot_product(a, b)
}

/// [`dot_product`] with its `1 x n` jacobians `bᵗ` and `aᵗ`.
pub fn dot_product_with_jacobians(a: &[f64], b: &[f64]) -> Result<(f64, Matrix, Matrix)> {
    let d = dot_product(a, b)?;
    let jacobian_a = Matrix::from_column_major(1, b.len(), b.to_vec())?;
    let jacobian_b = Matrix::from_column_major(1, a.len(), a.to_vec())?;
    Ok((d, jacobian_a, jacobian_b))
}

// ---------------------------------------------------------------------------
// Schur complement
// ---------------------------------------------------------------------------

/// Output of [`schurc`].
#[derive(Debug, Clone)]
pub struct SchurComplement {
    /// The Schur complement itself.
    pub complement: Matrix,
    /// Upper triangular `R` with `Rᵗ R = complement`, when requested.
    pub sqrt: Option<Matrix>,
    /// Inverse of the eliminated block.
    pub inverse_block: Matrix,
}

/// Schur complement of a square matrix split at `pos`:
///
/// ```text
/// m = | A  B |   A is pos x pos
///     | C  D |
/// ```
///
/// With `from_start` the leading block is eliminated (`D - C A⁻¹ B`),
/// otherwise the trailing one (`A - B D⁻¹ C`). With `sqrt`, the Cholesky
/// factor of the symmetrized complement is returned as well.
///
/// ```
/// # use densalg_core::{Matrix, utils};
/// let m = Matrix::from_rows(2, 2, &[4.0, 2.0, 2.0, 3.0]).unwrap();
/// let s = utils::schurc(&m, 1, true, false).unwrap();
/// // 3 - 2 * (1/4) * 2
/// assert!((s.complement.get(0, 0) - 2.0).abs() < 1e-12);
/// ```
pub fn schurc(m: &Matrix, pos: usize, from_start: bool, sqrt: bool) -> Result<SchurComplement> {
    schurc_with_tolerance(m, pos, from_start, sqrt, DEFAULT_ROUND_ERROR)
}

/// [`schurc`] with an explicit rounding error for the block inverse,
/// relative to the magnitude of `m`.
pub fn schurc_with_tolerance(
    m: &Matrix,
    pos: usize,
    from_start: bool,
    sqrt: bool,
    round_error: f64,
) -> Result<SchurComplement> {
    let n = m.rows();
    if !m.is_square() {
        return Err(AlgebraError::InvalidArgument {
            reason: "Schur complement requires a square matrix",
        });
    }
    if pos == 0 || pos >= n {
        return Err(AlgebraError::InvalidArgument {
            reason: "Schur complement split position must lie strictly inside the matrix",
        });
    }

    // block pivots are judged against the whole matrix
    let tolerance = scaled_round_error(m, round_error)?;

    let a = m.get_submatrix(0, 0, pos - 1, pos - 1)?;
    let b = m.get_submatrix(0, pos, pos - 1, n - 1)?;
    let c = m.get_submatrix(pos, 0, n - 1, pos - 1)?;
    let d = m.get_submatrix(pos, pos, n - 1, n - 1)?;

    let (inverse_block, complement) = if from_start {
        let inv = decomposed_lu(&a)?.inverse_with_round_error(tolerance)?;
        let cab = c
            .multiply_and_return_new(&inv)?
            .multiply_and_return_new(&b)?;
        (inv, d.subtract_and_return_new(&cab)?)
    } else {
        let inv = decomposed_lu(&d)?.inverse_with_round_error(tolerance)?;
        let bdc = b
            .multiply_and_return_new(&inv)?
            .multiply_and_return_new(&c)?;
        (inv, a.subtract_and_return_new(&bdc)?)
    };

    let sqrt = if sqrt {
        let symmetric = complement.symmetrize_and_return_new()?;
        let mut chol = CholeskyDecomposer::with_matrix(&symmetric);
        chol.decompose()?;
        Some(chol.r()?)
    } else {
        None
    };

    Ok(SchurComplement {
        complement,
        sqrt,
        inverse_block,
    })
}
