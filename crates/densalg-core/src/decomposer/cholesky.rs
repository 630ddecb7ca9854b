//! Cholesky decomposition for symmetric positive-definite matrices.
//!
//! Decomposes a symmetric positive-definite matrix `A` into `A = L Lᵗ`
//! where `L` is lower triangular with positive diagonal entries.
//! Equivalently `A = Rᵗ R` with `R = Lᵗ` upper triangular.

use crate::Matrix;
use crate::error::{AlgebraError, Result};

use super::{Decomposer, DecomposerState, DecomposerType};

/// Cholesky decomposer.
///
/// ```
/// # use densalg_core::Matrix;
/// # use densalg_core::decomposer::{CholeskyDecomposer, Decomposer};
/// let a = Matrix::from_rows(2, 2, &[4.0, 2.0, 2.0, 3.0]).unwrap();
/// let mut chol = CholeskyDecomposer::with_matrix(&a);
/// chol.decompose().unwrap();
/// let l = chol.l().unwrap();
/// let llt = l.multiply_and_return_new(&l.transpose_and_return_new()).unwrap();
/// assert!(llt.equals(&a, 1e-12));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CholeskyDecomposer<'a> {
    state: DecomposerState<'a>,
    l: Option<Matrix>,
}

impl<'a> CholeskyDecomposer<'a> {
    /// Largest relative difference `|a_ij - a_ji| / max(|a_ij|, |a_ji|, 1)`
    /// accepted as symmetric.
    pub const DEFAULT_SYMMETRY_THRESHOLD: f64 = 1e-10;

    /// A decomposer with no input matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// A decomposer ready to decompose `m`.
    pub fn with_matrix(m: &'a Matrix) -> Self {
        Self {
            state: DecomposerState::new(Some(m)),
            l: None,
        }
    }

    fn factor(&self) -> Result<&Matrix> {
        self.l.as_ref().ok_or(AlgebraError::NotAvailable)
    }

    /// Lower triangular factor `L`.
    pub fn l(&self) -> Result<Matrix> {
        self.factor().cloned()
    }

    /// Upper triangular factor `R = Lᵗ`, with `Rᵗ R = A`.
    pub fn r(&self) -> Result<Matrix> {
        Ok(self.factor()?.transpose_and_return_new())
    }

    /// `det(A) = product(diag(L))²`.
    pub fn determinant(&self) -> Result<f64> {
        let d: f64 = self.factor()?.get_diagonal().iter().product();
        Ok(d * d)
    }

    /// Solve `A X = B` by forward substitution on `L` then back
    /// substitution on `Lᵗ`.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        let l = self.factor()?;
        let n = l.rows();
        if b.rows() != n {
            return Err(AlgebraError::DimensionMismatch {
                expected: (n, b.columns()),
                got: b.shape(),
            });
        }

        let mut x = b.clone();
        for c in 0..b.columns() {
            // L y = b
            for i in 0..n {
                let mut sum = x.get(i, c);
                for k in 0..i {
                    sum -= l.get(i, k) * x.get(k, c);
                }
                x.set(i, c, sum / l.get(i, i));
            }
            // Lᵗ x = y
            for i in (0..n).rev() {
                let mut sum = x.get(i, c);
                for k in (i + 1)..n {
                    sum -= l.get(k, i) * x.get(k, c);
                }
                x.set(i, c, sum / l.get(i, i));
            }
        }
        Ok(x)
    }

    /// `A⁻¹`, solving against the identity.
    pub fn inverse(&self) -> Result<Matrix> {
        let n = self.factor()?.rows();
        self.solve(&Matrix::identity(n, n)?)
    }
}

/// Whether `a` is symmetric within `threshold` relative error.
fn is_symmetric(a: &Matrix, threshold: f64) -> bool {
    let n = a.rows();
    (0..n).all(|i| {
        (0..i).all(|j| {
            let (x, y) = (a.get(i, j), a.get(j, i));
            (x - y).abs() <= threshold * x.abs().max(y.abs()).max(1.0)
        })
    })
}

/// Cholesky–Banachiewicz: `L` is built row by row.
fn factorize(a: &Matrix) -> Result<Matrix> {
    if !a.is_square() {
        return Err(AlgebraError::DimensionMismatch {
            expected: (a.rows(), a.rows()),
            got: a.shape(),
        });
    }
    if !is_symmetric(a, CholeskyDecomposer::DEFAULT_SYMMETRY_THRESHOLD) {
        return Err(AlgebraError::NotPositiveDefinite);
    }

    let n = a.rows();
    let mut l = Matrix::zeros_unchecked(n, n);
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a.get(i, j);
            for k in 0..j {
                sum -= l.get(i, k) * l.get(j, k);
            }
            if i == j {
                if sum <= 0.0 {
                    return Err(AlgebraError::NotPositiveDefinite);
                }
                l.set(i, i, sum.sqrt());
            } else {
                l.set(i, j, sum / l.get(j, j));
            }
        }
    }
    Ok(l)
}

impl<'a> Decomposer<'a> for CholeskyDecomposer<'a> {
    fn decomposer_type(&self) -> DecomposerType {
        DecomposerType::CholeskyDecomposition
    }

    fn state(&self) -> &DecomposerState<'a> {
        &self.state
    }

    fn set_input_matrix(&mut self, m: &'a Matrix) -> Result<()> {
        self.state.set_input(m)?;
        self.l = None;
        Ok(())
    }

    fn decompose(&mut self) -> Result<()> {
        let kind = self.decomposer_type();
        let a = self.state.begin(kind)?;
        self.l = None;
        let l = self.state.finish(kind, factorize(a))?;
        self.l = Some(l);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn spd() -> Matrix {
        Matrix::from_rows(3, 3, &[4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0])
            .unwrap()
    }

    #[test]
    fn test_cholesky_3x3() {
        // L = [[2, 0, 0], [6, 1, 0], [-8, 5, 3]]
        let a = spd();
        let mut chol = CholeskyDecomposer::with_matrix(&a);
        chol.decompose().unwrap();
        let l = chol.l().unwrap();
        let expected = Matrix::from_rows(3, 3, &[2.0, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0])
            .unwrap();
        assert!(l.equals(&expected, 1e-12));

        let r = chol.r().unwrap();
        let rtr = r.transpose_and_return_new().multiply_and_return_new(&r).unwrap();
        assert!(rtr.equals(&a, 1e-10));
        assert_abs_diff_eq!(chol.determinant().unwrap(), 36.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cholesky_solve_and_inverse() {
        let a = spd();
        let mut chol = CholeskyDecomposer::with_matrix(&a);
        chol.decompose().unwrap();
        let b = Matrix::from_rows(3, 2, &[1.0, 0.0, 2.0, 1.0, 3.0, -1.0]).unwrap();
        let x = chol.solve(&b).unwrap();
        assert!(a.multiply_and_return_new(&x).unwrap().equals(&b, 1e-9));

        let inv = chol.inverse().unwrap();
        let eye = a.multiply_and_return_new(&inv).unwrap();
        assert!(eye.equals(&Matrix::identity(3, 3).unwrap(), 1e-9));
    }

    #[test]
    fn test_cholesky_not_positive_definite() {
        let a = Matrix::from_rows(2, 2, &[1.0, 2.0, 2.0, 1.0]).unwrap();
        let mut chol = CholeskyDecomposer::with_matrix(&a);
        assert_eq!(chol.decompose().unwrap_err(), AlgebraError::NotPositiveDefinite);
        assert!(chol.is_ready());
        assert!(!chol.is_decomposition_available());
        assert_eq!(chol.l().unwrap_err(), AlgebraError::NotAvailable);
    }

    #[test]
    fn test_cholesky_not_symmetric() {
        let a = Matrix::from_rows(2, 2, &[4.0, 1.0, 0.0, 3.0]).unwrap();
        let mut chol = CholeskyDecomposer::with_matrix(&a);
        assert_eq!(chol.decompose().unwrap_err(), AlgebraError::NotPositiveDefinite);
    }

    #[test]
    fn test_cholesky_non_square() {
        let a = Matrix::new(2, 3).unwrap();
        let mut chol = CholeskyDecomposer::with_matrix(&a);
        assert!(matches!(
            chol.decompose(),
            Err(AlgebraError::DimensionMismatch { .. })
        ));
        assert_eq!(chol.decomposer_type().to_string(), "CHOLESKY");
    }
}
