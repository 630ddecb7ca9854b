//! Full QR decomposition via Householder reflections.
//!
//! Decomposes a matrix `A` (m x n, m >= n) into `A = QR` where:
//! - `Q` is an orthogonal matrix (m x m) such that `Qᵗ Q = I`
//! - `R` is upper triangular (m x n)

use crate::Matrix;
use crate::error::{AlgebraError, Result};

use super::householder::Householder;
use super::{Decomposer, DecomposerState, DecomposerType, check_round_error};

/// Full-size QR decomposer.
///
/// ```
/// # use densalg_core::Matrix;
/// # use densalg_core::decomposer::{Decomposer, QrDecomposer};
/// let a = Matrix::from_rows(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// let mut qr = QrDecomposer::with_matrix(&a);
/// qr.decompose().unwrap();
/// let q = qr.q().unwrap();
/// let qtq = q.transpose_and_return_new().multiply_and_return_new(&q).unwrap();
/// assert!(qtq.equals(&Matrix::identity(3, 3).unwrap(), 1e-10));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QrDecomposer<'a> {
    state: DecomposerState<'a>,
    factors: Option<Householder>,
    rows: usize,
    columns: usize,
}

impl<'a> QrDecomposer<'a> {
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
            ..Self::default()
        }
    }

    fn factors(&self) -> Result<&Householder> {
        self.factors.as_ref().ok_or(AlgebraError::NotAvailable)
    }

    /// `m x m` orthogonal factor.
    pub fn q(&self) -> Result<Matrix> {
        Ok(self.factors()?.q(self.rows))
    }

    /// `m x n` upper trapezoidal factor.
    pub fn r(&self) -> Result<Matrix> {
        Ok(self.factors()?.r(self.rows))
    }

    /// Lower trapezoidal `m x n` matrix of Householder vectors.
    pub fn h(&self) -> Result<Matrix> {
        Ok(self.factors()?.h())
    }

    /// Whether every `|R[k, k]|` exceeds `round_error`.
    pub fn is_full_rank(&self, round_error: f64) -> Result<bool> {
        let f = self.factors()?;
        check_round_error(round_error)?;
        Ok(f.is_full_rank(round_error))
    }

    /// Least-squares solution `x` of `A x = b` for every column of `b`.
    pub fn solve(&self, b: &Matrix, round_error: f64) -> Result<Matrix> {
        let f = self.factors()?;
        check_round_error(round_error)?;
        if b.rows() != self.rows {
            return Err(AlgebraError::DimensionMismatch {
                expected: (self.rows, b.columns()),
                got: b.shape(),
            });
        }
        if !f.is_full_rank(round_error) {
            log::warn!(target: "densalg", "QR solve on a rank deficient matrix");
            return Err(AlgebraError::RankDeficient);
        }
        let mut x = Matrix::zeros_unchecked(self.columns, b.columns());
        f.solve_into(b, &mut x)?;
        Ok(x)
    }
}

impl<'a> Decomposer<'a> for QrDecomposer<'a> {
    fn decomposer_type(&self) -> DecomposerType {
        DecomposerType::QrDecomposition
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
        let (rows, columns) = a.shape();
        let outcome = if rows < columns {
            Err(AlgebraError::DimensionMismatch {
                expected: (columns, columns),
                got: (rows, columns),
            })
        } else {
            Ok(Householder::factorize(a))
        };
        let factors = self.state.finish(kind, outcome)?;
        self.factors = Some(factors);
        self.rows = rows;
        self.columns = columns;
        Ok(())
    }
}
