//! Economy QR decomposition via Householder reflections.
//!
//! Decomposes a matrix `A` (m x n) into `A = QR` where:
//! - `Q` is `m x n` with orthonormal columns (`Qᵗ Q = I`)
//! - `R` is `n x n` upper triangular
//!
//! Any shape can be decomposed, but `Q` and `R` (and therefore `solve`) are
//! only defined when `m >= n`.

use crate::Matrix;
use crate::error::{AlgebraError, Result};

use super::householder::Householder;
use super::{Decomposer, DecomposerState, DecomposerType, check_round_error};

/// Economy-size QR decomposer.
///
/// ```
/// # use densalg_core::Matrix;
/// # use densalg_core::decomposer::{Decomposer, EconomyQrDecomposer};
/// let a = Matrix::from_rows(3, 2, &[1.0, 1.0, 1.0, 2.0, 1.0, 3.0]).unwrap();
/// let b = Matrix::from_rows(3, 1, &[6.0, 5.0, 7.0]).unwrap();
/// let mut qr = EconomyQrDecomposer::with_matrix(&a);
/// qr.decompose().unwrap();
/// let x = qr.solve_default(&b).unwrap();
/// assert!((x.get(0, 0) - 5.0).abs() < 1e-10);
/// assert!((x.get(1, 0) - 0.5).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EconomyQrDecomposer<'a> {
    state: DecomposerState<'a>,
    factors: Option<Householder>,
}

impl<'a> EconomyQrDecomposer<'a> {
    /// Threshold on `|R[k, k]|` below which a column counts as dependent.
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

    fn factors(&self) -> Result<&Householder> {
        self.factors.as_ref().ok_or(AlgebraError::NotAvailable)
    }

    fn check_tall(&self) -> Result<()> {
        let (rows, columns) = self.state.input().map_or((0, 0), Matrix::shape);
        if rows < columns {
            return Err(AlgebraError::DimensionMismatch {
                expected: (columns, columns),
                got: (rows, columns),
            });
        }
        Ok(())
    }

    /// Lower trapezoidal `m x n` matrix of Householder vectors.
    pub fn h(&self) -> Result<Matrix> {
        Ok(self.factors()?.h())
    }

    /// `m x n` factor with orthonormal columns.
    pub fn q(&self) -> Result<Matrix> {
        let f = self.factors()?;
        self.check_tall()?;
        let n = self.state.input().map_or(0, Matrix::columns);
        Ok(f.q(n))
    }

    /// `n x n` upper triangular factor.
    pub fn r(&self) -> Result<Matrix> {
        let f = self.factors()?;
        self.check_tall()?;
        let n = self.state.input().map_or(0, Matrix::columns);
        Ok(f.r(n))
    }

    /// Whether every `|R[k, k]|` exceeds `round_error`.
    pub fn is_full_rank(&self, round_error: f64) -> Result<bool> {
        let f = self.factors()?;
        check_round_error(round_error)?;
        self.check_tall()?;
        Ok(f.is_full_rank(round_error))
    }

    /// [`is_full_rank`](Self::is_full_rank) with [`Self::DEFAULT_ROUND_ERROR`].
    pub fn is_full_rank_default(&self) -> Result<bool> {
        self.is_full_rank(Self::DEFAULT_ROUND_ERROR)
    }

    /// Least-squares solution `x` of `A x = b`; `b` may hold several
    /// right-hand sides as columns.
    pub fn solve(&self, b: &Matrix, round_error: f64) -> Result<Matrix> {
        let mut x = Matrix::zeros_unchecked(1, 1);
        self.solve_into(b, round_error, &mut x)?;
        Ok(x)
    }

    /// [`solve`](Self::solve) with [`Self::DEFAULT_ROUND_ERROR`].
    pub fn solve_default(&self, b: &Matrix) -> Result<Matrix> {
        self.solve(b, Self::DEFAULT_ROUND_ERROR)
    }

    /// Like [`solve`](Self::solve), writing into `result` (resized to
    /// `n x b.columns()`).
    pub fn solve_into(&self, b: &Matrix, round_error: f64, result: &mut Matrix) -> Result<()> {
        let f = self.factors()?;
        check_round_error(round_error)?;
        self.check_tall()?;
        let rows = self.state.input().map_or(0, Matrix::rows);
        if b.rows() != rows {
            return Err(AlgebraError::DimensionMismatch {
                expected: (rows, b.columns()),
                got: b.shape(),
            });
        }
        if !f.is_full_rank(round_error) {
            log::warn!(target: "densalg", "economy QR solve on a rank deficient matrix");
            return Err(AlgebraError::RankDeficient);
        }
        f.solve_into(b, result)
    }
}

impl<'a> Decomposer<'a> for EconomyQrDecomposer<'a> {
    fn decomposer_type(&self) -> DecomposerType {
        DecomposerType::EconomyQrDecomposition
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
        let factors = self.state.finish(kind, Ok(Householder::factorize(a)))?;
        self.factors = Some(factors);
        Ok(())
    }
}
