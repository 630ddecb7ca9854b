//! Matrix and vector norms.
//!
//! | Norm | Matrix | Vector |
//! |------|--------|--------|
//! | [`FrobeniusNormComputer`] | `sqrt(sum(a_ij^2))` | Euclidean length |
//! | [`OneNormComputer`] | max absolute column sum | `sum(|v_i|)` |
//! | [`InfinityNormComputer`] | max absolute row sum | `max(|v_i|)` |
//!
//! The 2-norm of a matrix requires its singular values and lives in
//! [`utils::norm2`](crate::utils::norm2).

use crate::Matrix;

/// Identifies a norm strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormType {
    /// Frobenius (Euclidean) norm.
    Frobenius,
    /// Maximum absolute column sum.
    One,
    /// Maximum absolute row sum.
    Infinity,
}

impl NormType {
    /// A boxed computer implementing this norm.
    pub fn computer(self) -> Box<dyn NormComputer> {
        match self {
            Self::Frobenius => Box::new(FrobeniusNormComputer),
            Self::One => Box::new(OneNormComputer),
            Self::Infinity => Box::new(InfinityNormComputer),
        }
    }
}

/// A stateless norm strategy over matrices and flat vectors.
pub trait NormComputer {
    /// Norm of a matrix.
    fn norm(&self, m: &Matrix) -> f64;

    /// Norm of a vector given as a slice.
    fn norm_of_array(&self, v: &[f64]) -> f64;

    /// Which norm this computer evaluates.
    fn norm_type(&self) -> NormType;
}

/// Frobenius norm: square root of the sum of squared cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrobeniusNormComputer;

impl FrobeniusNormComputer {
    /// Euclidean norm of `v` together with its `1 x n` jacobian `vᵗ / ‖v‖`.
    ///
    /// A zero vector has no defined gradient; its jacobian is filled with
    /// `f64::MAX`, matching [`array_utils::normalize`](crate::array_utils::normalize).
    pub fn norm_with_jacobian(v: &[f64]) -> crate::Result<(f64, Matrix)> {
        let norm = Self.norm_of_array(v);
        let mut jacobian = Matrix::new(1, v.len())?;
        if norm == 0.0 {
            jacobian.initialize(f64::MAX);
        } else {
            for (j, &x) in v.iter().enumerate() {
                jacobian.set(0, j, x / norm);
            }
        }
        Ok((norm, jacobian))
    }
}

impl NormComputer for FrobeniusNormComputer {
    fn norm(&self, m: &Matrix) -> f64 {
        self.norm_of_array(m.buffer())
    }

    fn norm_of_array(&self, v: &[f64]) -> f64 {
        v.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    fn norm_type(&self) -> NormType {
        NormType::Frobenius
    }
}

/// 1-norm: maximum absolute column sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneNormComputer;

impl NormComputer for OneNormComputer {
    fn norm(&self, m: &Matrix) -> f64 {
        m.buffer()
            .chunks_exact(m.rows())
            .map(|col| self.norm_of_array(col))
            .fold(0.0, f64::max)
    }

    fn norm_of_array(&self, v: &[f64]) -> f64 {
        v.iter().map(|x| x.abs()).sum()
    }

    fn norm_type(&self) -> NormType {
        NormType::One
    }
}

/// Infinity norm: maximum absolute row sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfinityNormComputer;

impl NormComputer for InfinityNormComputer {
    fn norm(&self, m: &Matrix) -> f64 {
        (0..m.rows())
            .map(|i| (0..m.columns()).map(|j| m.get(i, j).abs()).sum::<f64>())
            .fold(0.0, f64::max)
    }

    fn norm_of_array(&self, v: &[f64]) -> f64 {
        v.iter().map(|x| x.abs()).fold(0.0, f64::max)
    }

    fn norm_type(&self) -> NormType {
        NormType::Infinity
    }
}
