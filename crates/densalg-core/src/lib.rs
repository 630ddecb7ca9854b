//! `densalg-core` — dense `f64` linear algebra.
//!
//! Provides a column-major [`Matrix`], matrix and vector norms, random
//! fills, the LU/QR/Cholesky/SVD decomposers and a set of linear algebra
//! helpers (solve, inverse, pseudo-inverse, skew matrices, Schur
//! complements). The `densalg` umbrella crate re-exports everything here.
//!
//! # Design
//!
//! - **Column-major storage**: element `(i, j)` lives at `j * rows + i`.
//! - **Explicit lifecycle**: decomposers borrow their input, are decomposed
//!   once and expose factors only after success (see [`decomposer`]).
//! - Every fallible operation returns [`Result`] with an [`AlgebraError`].
//!   Only element indexing and the `+ - *` operators on `&Matrix` panic.

pub mod array_utils;
pub mod decomposer;
pub mod error;
pub mod matrix;
pub mod norm;
pub mod random;
pub mod utils;

// Re-export key types at crate root for convenience.
pub use decomposer::{
    CholeskyDecomposer, Decomposer, DecomposerType, EconomyQrDecomposer, LuDecomposer,
    QrDecomposer, SingularValueDecomposer,
};
pub use error::{AlgebraError, Result};
pub use matrix::Matrix;

/// Items intended for glob-import: `use densalg_core::prelude::*;`
pub mod prelude {
    pub use crate::decomposer::{
        CholeskyDecomposer, Decomposer, DecomposerType, EconomyQrDecomposer, LuDecomposer,
        QrDecomposer, SingularValueDecomposer,
    };
    pub use crate::error::{AlgebraError, Result};
    pub use crate::matrix::Matrix;
    pub use crate::norm::{NormComputer, NormType};
    pub use crate::random::{GaussianRandomizer, Randomizer, UniformRandomizer};
}
