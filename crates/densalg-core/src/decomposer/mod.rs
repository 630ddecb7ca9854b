//! Matrix decomposers.
//!
//! | Decomposer | Module | Factorization |
//! |------------|--------|---------------|
//! | LU | [`lu`] | `PA = LU` |
//! | QR | [`qr`] | `A = QR`, `Q` is `m x m` |
//! | Economy QR | [`economy_qr`] | `A = QR`, `Q` is `m x n` |
//! | Cholesky | [`cholesky`] | `A = L Lᵗ` |
//! | SVD | [`svd`] | `A = U diag(s) Vᵗ` |
//!
//! Every decomposer follows the same lifecycle, exposed through the
//! [`Decomposer`] trait:
//!
//! ```text
//! NOT_READY --set_input_matrix--> READY --decompose--> DECOMPOSED
//!                                   ^                      |
//!                                   +--set_input_matrix----+
//! ```
//!
//! A decomposer borrows its input matrix; it never copies it until
//! `decompose()` runs. The `locked` flag is raised for the duration of
//! `decompose()` and makes `set_input_matrix`/`decompose` fail with
//! [`AlgebraError::Locked`]. It is a reentrancy guard, not a mutex.

pub mod cholesky;
pub mod economy_qr;
mod householder;
pub mod lu;
pub mod qr;
pub mod svd;

use core::fmt;

pub use cholesky::CholeskyDecomposer;
pub use economy_qr::EconomyQrDecomposer;
pub use lu::LuDecomposer;
pub use qr::QrDecomposer;
pub use svd::SingularValueDecomposer;

use crate::Matrix;
use crate::error::{AlgebraError, Result};

/// Tag identifying a decomposition algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecomposerType {
    LuDecomposition,
    QrDecomposition,
    EconomyQrDecomposition,
    CholeskyDecomposition,
    SingularValueDecomposition,
}

impl fmt::Display for DecomposerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::LuDecomposition => "LU",
            Self::QrDecomposition => "QR",
            Self::EconomyQrDecomposition => "QR_ECONOMY",
            Self::CholeskyDecomposition => "CHOLESKY",
            Self::SingularValueDecomposition => "SVD",
        };
        f.write_str(tag)
    }
}

/// Common lifecycle of every decomposer.
///
/// ```
/// # use densalg_core::Matrix;
/// # use densalg_core::decomposer::{Decomposer, EconomyQrDecomposer};
/// let a = Matrix::from_rows(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 7.0]).unwrap();
/// let mut qr = EconomyQrDecomposer::new();
/// assert!(!qr.is_ready());
/// qr.set_input_matrix(&a).unwrap();
/// assert!(qr.is_ready() && !qr.is_decomposition_available());
/// qr.decompose().unwrap();
/// assert!(qr.is_decomposition_available());
/// ```
pub trait Decomposer<'a> {
    /// Which algorithm this decomposer runs.
    fn decomposer_type(&self) -> DecomposerType;

    /// Shared lifecycle bookkeeping.
    fn state(&self) -> &DecomposerState<'a>;

    /// Borrow `m` as the new input, invalidating any cached factors.
    fn set_input_matrix(&mut self, m: &'a Matrix) -> Result<()>;

    /// Run the decomposition on the current input matrix.
    ///
    /// Fails with [`AlgebraError::NotReady`] if no input was set and with
    /// [`AlgebraError::Locked`] while another decomposition is running. On
    /// failure the decomposer stays ready but holds no factors.
    fn decompose(&mut self) -> Result<()>;

    /// The borrowed input matrix, if one has been set.
    fn input_matrix(&self) -> Option<&'a Matrix> {
        self.state().input()
    }

    /// Whether an input matrix is available.
    fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Whether a decomposition is currently in progress.
    fn is_locked(&self) -> bool {
        self.state().is_locked()
    }

    /// Whether factors from a successful `decompose()` are cached.
    fn is_decomposition_available(&self) -> bool {
        self.state().is_decomposition_available()
    }
}

/// Lifecycle flags shared by all decomposers.
#[derive(Debug, Clone, Default)]
pub struct DecomposerState<'a> {
    input: Option<&'a Matrix>,
    locked: bool,
    available: bool,
}

impl<'a> DecomposerState<'a> {
    pub(crate) fn new(input: Option<&'a Matrix>) -> Self {
        Self {
            input,
            locked: false,
            available: false,
        }
    }

    /// The borrowed input matrix.
    pub fn input(&self) -> Option<&'a Matrix> {
        self.input
    }

    /// Whether an input matrix is set.
    pub fn is_ready(&self) -> bool {
        self.input.is_some()
    }

    /// Whether a decomposition is in progress.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether factors are cached.
    pub fn is_decomposition_available(&self) -> bool {
        self.available
    }

    pub(crate) fn set_input(&mut self, m: &'a Matrix) -> Result<()> {
        if self.locked {
            return Err(AlgebraError::Locked);
        }
        self.input = Some(m);
        self.available = false;
        Ok(())
    }

    /// Enter `decompose()`: checks readiness, raises the lock and drops the
    /// availability of previous factors.
    pub(crate) fn begin(&mut self, kind: DecomposerType) -> Result<&'a Matrix> {
        if self.locked {
            return Err(AlgebraError::Locked);
        }
        let input = self.input.ok_or(AlgebraError::NotReady)?;
        self.locked = true;
        self.available = false;
        log::debug!(
            target: "densalg",
            "{kind} decomposition of {}x{} matrix started",
            input.rows(),
            input.columns()
        );
        Ok(input)
    }

    /// Leave `decompose()`: releases the lock and records the outcome.
    pub(crate) fn finish<T>(&mut self, kind: DecomposerType, outcome: Result<T>) -> Result<T> {
        self.locked = false;
        self.available = outcome.is_ok();
        match &outcome {
            Ok(_) => log::debug!(target: "densalg", "{kind} decomposition finished"),
            Err(e) => log::debug!(target: "densalg", "{kind} decomposition failed: {e}"),
        }
        outcome
    }
}

pub(crate) fn check_round_error(round_error: f64) -> Result<()> {
    if round_error < 0.0 {
        return Err(AlgebraError::InvalidArgument {
            reason: "rounding error must be non-negative",
        });
    }
    Ok(())
}
