//! # densalg
//!
//! Dense numerical linear algebra in pure Rust.
//!
//! One `use densalg::prelude::*;` gives you the column-major matrix type,
//! the LU, QR, Cholesky and singular value decomposers, and their error
//! type.
//!
//! ## Feature Flags
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `core` *(default)* | Matrix, norms, decomposers, solvers and utilities |

#[cfg(feature = "core")]
pub use densalg_core as core;

/// Glob-import convenience: `use densalg::prelude::*;`
pub mod prelude {
    #[cfg(feature = "core")]
    pub use densalg_core::prelude::*;
}
