//! LU decomposition with partial pivoting.
//!
//! Decomposes a matrix `A` (m x n) into `PA = LU` where:
//! - `P` is a row permutation (stored as a pivot vector)
//! - `L` is `m x min(m, n)` lower trapezoidal with unit diagonal
//! - `U` is `min(m, n) x n` upper trapezoidal
//!
//! A zero pivot does not abort the factorization; singularity is reported
//! by [`LuDecomposer::is_singular`] and by `solve`.

use crate::Matrix;
use crate::error::{AlgebraError, Result};

use super::{Decomposer, DecomposerState, DecomposerType, check_round_error};

/// Packed factors: the strict lower part of `lu` holds `L` (unit diagonal
/// implicit), the upper part including the diagonal holds `U`.
#[derive(Debug, Clone)]
struct LuFactors {
    lu: Matrix,
    pivots: Vec<usize>,
    sign: f64,
}

/// LU decomposer with partial pivoting.
///
/// ```
/// # use densalg_core::Matrix;
/// # use densalg_core::decomposer::{Decomposer, LuDecomposer};
/// let a = Matrix::from_rows(2, 2, &[2.0, 1.0, 1.0, 4.0]).unwrap();
/// let mut lu = LuDecomposer::with_matrix(&a);
/// lu.decompose().unwrap();
/// assert!((lu.determinant().unwrap() - 7.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LuDecomposer<'a> {
    state: DecomposerState<'a>,
    factors: Option<LuFactors>,
}

impl<'a> LuDecomposer<'a> {
    /// Threshold on `|U[k, k]|` at or below which the matrix is singular.
    pub const DEFAULT_ROUND_ERROR: f64 = 1e-8;

    /// A decomposer with no input matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// A decomposer ready to decompose `m`.
    pub fn with_matrix(m: &'a Matrix) -> Self {
        Self {
            state: DecomposerState::new(Some(m)),
            factors: None,
        }
    }

    fn factors(&self) -> Result<&LuFactors> {
        self.factors.as_ref().ok_or(AlgebraError::NotAvailable)
    }

    fn square_factors(&self) -> Result<&LuFactors> {
        let f = self.factors()?;
        if !f.lu.is_square() {
            return Err(AlgebraError::DimensionMismatch {
                expected: (f.lu.rows(), f.lu.rows()),
                got: f.lu.shape(),
            });
        }
        Ok(f)
    }

    /// `m x min(m, n)` unit lower factor.
    pub fn l(&self) -> Result<Matrix> {
        let lu = &self.factors()?.lu;
        let (m, n) = lu.shape();
        let k = m.min(n);
        let mut l = Matrix::zeros_unchecked(m, k);
        for j in 0..k {
            l.set(j, j, 1.0);
            for i in (j + 1)..m {
                l.set(i, j, lu.get(i, j));
            }
        }
        Ok(l)
    }

    /// `min(m, n) x n` upper factor.
    pub fn u(&self) -> Result<Matrix> {
        let lu = &self.factors()?.lu;
        let (m, n) = lu.shape();
        let k = m.min(n);
        let mut u = Matrix::zeros_unchecked(k, n);
        for j in 0..n {
            for i in 0..=j.min(k - 1) {
                u.set(i, j, lu.get(i, j));
            }
        }
        Ok(u)
    }

    /// Row permutation: row `i` of `LU` is row `pivots[i]` of `A`.
    pub fn pivots(&self) -> Result<&[usize]> {
        Ok(&self.factors()?.pivots)
    }

    /// `m x m` permutation matrix with `P A = L U`.
    pub fn p(&self) -> Result<Matrix> {
        let pivots = &self.factors()?.pivots;
        let m = pivots.len();
        let mut p = Matrix::zeros_unchecked(m, m);
        for (i, &pi) in pivots.iter().enumerate() {
            p.set(i, pi, 1.0);
        }
        Ok(p)
    }

    /// Sign of the permutation, `+1` or `-1`.
    pub fn pivot_sign(&self) -> Result<f64> {
        Ok(self.factors()?.sign)
    }

    /// `det(A) = sign * product(diag(U))`.
    pub fn determinant(&self) -> Result<f64> {
        let f = self.square_factors()?;
        Ok(f.lu.get_diagonal().iter().fold(f.sign, |d, &u| d * u))
    }

    /// Whether some `|U[k, k]|` is at most `round_error`.
    pub fn is_singular(&self, round_error: f64) -> Result<bool> {
        let f = self.square_factors()?;
        check_round_error(round_error)?;
        Ok(f.lu.get_diagonal().iter().any(|u| u.abs() <= round_error))
    }

    /// [`is_singular`](Self::is_singular) with [`Self::DEFAULT_ROUND_ERROR`].
    pub fn is_singular_default(&self) -> Result<bool> {
        self.is_singular(Self::DEFAULT_ROUND_ERROR)
    }

    /// Solve `A X = B` for every column of `b`.
    ///
    /// Fails with [`AlgebraError::RankDeficient`] when the matrix is singular
    /// within `round_error`.
    pub fn solve(&self, b: &Matrix, round_error: f64) -> Result<Matrix> {
        let f = self.square_factors()?;
        check_round_error(round_error)?;
        let n = f.lu.rows();
        if b.rows() != n {
            return Err(AlgebraError::DimensionMismatch {
                expected: (n, b.columns()),
                got: b.shape(),
            });
        }
        if self.is_singular(round_error)? {
            log::warn!(target: "densalg", "LU solve on a singular matrix");
            return Err(AlgebraError::RankDeficient);
        }

        let lu = &f.lu;
        let mut x = Matrix::zeros_unchecked(n, b.columns());
        for c in 0..b.columns() {
            for (i, &pi) in f.pivots.iter().enumerate() {
                x.set(i, c, b.get(pi, c));
            }
            // forward substitution with unit L
            for k in 0..n {
                let xk = x.get(k, c);
                for i in (k + 1)..n {
                    let v = x.get(i, c) - xk * lu.get(i, k);
                    x.set(i, c, v);
                }
            }
            // back substitution with U
            for k in (0..n).rev() {
                let xk = x.get(k, c) / lu.get(k, k);
                x.set(k, c, xk);
                for i in 0..k {
                    let v = x.get(i, c) - xk * lu.get(i, k);
                    x.set(i, c, v);
                }
            }
        }
        Ok(x)
    }

    /// [`solve`](Self::solve) with [`Self::DEFAULT_ROUND_ERROR`].
    pub fn solve_default(&self, b: &Matrix) -> Result<Matrix> {
        self.solve(b, Self::DEFAULT_ROUND_ERROR)
    }

    /// `A⁻¹`, solving against the identity.
    pub fn inverse(&self) -> Result<Matrix> {
        self.inverse_with_round_error(Self::DEFAULT_ROUND_ERROR)
    }

    /// `A⁻¹` with an explicit singularity threshold on `|U[k, k]|`.
    pub fn inverse_with_round_error(&self, round_error: f64) -> Result<Matrix> {
        let n = self.square_factors()?.lu.rows();
        self.solve(&Matrix::identity(n, n)?, round_error)
    }
}

fn factorize(a: &Matrix) -> LuFactors {
    let (m, n) = a.shape();
    let mut lu = a.clone();
    let mut pivots: Vec<usize> = (0..m).collect();
    let mut sign = 1.0;

    for k in 0..m.min(n) {
        // row with largest |lu[i, k]| for i >= k
        let mut max_row = k;
        let mut max_val = lu.get(k, k).abs();
        for i in (k + 1)..m {
            let v = lu.get(i, k).abs();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }

        if max_row != k {
            for j in 0..n {
                let tmp = lu.get(k, j);
                lu.set(k, j, lu.get(max_row, j));
                lu.set(max_row, j, tmp);
            }
            pivots.swap(k, max_row);
            sign = -sign;
        }

        let pivot = lu.get(k, k);
        if pivot == 0.0 {
            continue;
        }
        for i in (k + 1)..m {
            let factor = lu.get(i, k) / pivot;
            lu.set(i, k, factor);
        }
        for j in (k + 1)..n {
            let ukj = lu.get(k, j);
            if ukj == 0.0 {
                continue;
            }
            for i in (k + 1)..m {
                let v = lu.get(i, j) - lu.get(i, k) * ukj;
                lu.set(i, j, v);
            }
        }
    }

    LuFactors { lu, pivots, sign }
}

impl<'a> Decomposer<'a> for LuDecomposer<'a> {
    fn decomposer_type(&self) -> DecomposerType {
        DecomposerType::LuDecomposition
    }

    fn state(&self) -> &DecomposerState<'a> {
        &self.state
    }

    fn set_input_matrix(&mut self, m: &'a Matrix) -> Result<()> {
        self.state.set_input(m)?;
        self.factors = None;
        Ok(())
    }

    fn decompose(&mut self) -> Result<()> {
        let kind = self.decomposer_type();
        let a = self.state.begin(kind)?;
        self.factors = None;
        let factors = self.state.finish(kind, Ok(factorize(a)))?;
        self.factors = Some(factors);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn decomposed(a: &Matrix) -> LuDecomposer<'_> {
        let mut lu = LuDecomposer::with_matrix(a);
        lu.decompose().unwrap();
        lu
    }

    #[test]
    fn test_lu_2x2() {
        let a = Matrix::from_rows(2, 2, &[2.0, 1.0, 1.0, 4.0]).unwrap();
        let lu = decomposed(&a);
        let pa = lu.p().unwrap().multiply_and_return_new(&a).unwrap();
        let l_u = lu.l().unwrap().multiply_and_return_new(&lu.u().unwrap()).unwrap();
        assert!(pa.equals(&l_u, 1e-12));
        assert_abs_diff_eq!(lu.determinant().unwrap(), 7.0, epsilon = 1e-10);
    }

    #[test]
    fn test_lu_with_pivoting() {
        let a = Matrix::from_rows(3, 3, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 9.0]).unwrap();
        let lu = decomposed(&a);
        assert_eq!(lu.pivots().unwrap()[0], 2);
        let pa = lu.p().unwrap().multiply_and_return_new(&a).unwrap();
        let l_u = lu.l().unwrap().multiply_and_return_new(&lu.u().unwrap()).unwrap();
        assert!(pa.equals(&l_u, 1e-12));
        // det = 0*(36-35) - 1*(27-30) + 2*(21-24) = -3
        assert_abs_diff_eq!(lu.determinant().unwrap(), -3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_lu_rectangular() {
        let mut rng = StdRng::seed_from_u64(3);
        for (m, n) in [(5, 3), (3, 5)] {
            let a = Matrix::create_with_uniform_random_values_with_rng(m, n, -1.0, 1.0, &mut rng)
                .unwrap();
            let lu = decomposed(&a);
            let l = lu.l().unwrap();
            let u = lu.u().unwrap();
            assert_eq!(l.shape(), (m, m.min(n)));
            assert_eq!(u.shape(), (m.min(n), n));
            let pa = lu.p().unwrap().multiply_and_return_new(&a).unwrap();
            assert!(pa.equals(&l.multiply_and_return_new(&u).unwrap(), 1e-12));
            assert!(matches!(
                lu.determinant(),
                Err(AlgebraError::DimensionMismatch { .. })
            ));
        }
    }

    #[test]
    fn test_lu_solve_and_inverse() {
        let a = Matrix::from_rows(3, 3, &[4.0, -2.0, 1.0, -2.0, 4.0, -2.0, 1.0, -2.0, 4.0]).unwrap();
        let lu = decomposed(&a);
        let b = Matrix::from_rows(3, 1, &[11.0, -16.0, 17.0]).unwrap();
        let x = lu.solve_default(&b).unwrap();
        assert!(a.multiply_and_return_new(&x).unwrap().equals(&b, 1e-10));

        let inv = lu.inverse().unwrap();
        let eye = a.multiply_and_return_new(&inv).unwrap();
        assert!(eye.equals(&Matrix::identity(3, 3).unwrap(), 1e-12));
    }

    #[test]
    fn test_lu_singular() {
        let a = Matrix::from_rows(2, 2, &[1.0, 2.0, 2.0, 4.0]).unwrap();
        let lu = decomposed(&a);
        assert!(lu.is_singular_default().unwrap());
        assert_abs_diff_eq!(lu.determinant().unwrap(), 0.0);
        let b = Matrix::from_rows(2, 1, &[1.0, 2.0]).unwrap();
        assert_eq!(lu.solve_default(&b).unwrap_err(), AlgebraError::RankDeficient);
        assert_eq!(lu.inverse().unwrap_err(), AlgebraError::RankDeficient);
    }

    #[test]
    fn test_lu_inverse_round_error() {
        let a = Matrix::diagonal(&[1e-9, 2e-9]).unwrap();
        let lu = decomposed(&a);
        assert_eq!(lu.inverse().unwrap_err(), AlgebraError::RankDeficient);
        let inv = lu.inverse_with_round_error(1e-12).unwrap();
        assert_abs_diff_eq!(inv.get(0, 0), 1e9, epsilon = 1e-3);
        assert_abs_diff_eq!(inv.get(1, 1), 5e8, epsilon = 1e-3);
        assert!(matches!(
            lu.inverse_with_round_error(-1.0),
            Err(AlgebraError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_lu_solve_dimension_mismatch() {
        let a = Matrix::identity(2, 2).unwrap();
        let lu = decomposed(&a);
        let b = Matrix::new(3, 1).unwrap();
        assert!(matches!(
            lu.solve_default(&b),
            Err(AlgebraError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            lu.is_singular(-1.0),
            Err(AlgebraError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_lu_not_available() {
        let lu = LuDecomposer::new();
        assert_eq!(lu.l().unwrap_err(), AlgebraError::NotAvailable);
        assert_eq!(lu.pivot_sign().unwrap_err(), AlgebraError::NotAvailable);
        assert_eq!(lu.decomposer_type().to_string(), "LU");
    }
}
