use thiserror::Error;

/// All errors returned by `densalg-core`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgebraError {
    /// A matrix was requested with zero rows or zero columns.
    #[error("invalid dimension: {rows}x{columns} (rows and columns must be at least 1)")]
    InvalidDimension { rows: usize, columns: usize },

    /// Random-value bounds or distribution parameters are not usable.
    #[error("invalid range: {reason}")]
    InvalidRange { reason: &'static str },

    /// Operand shapes do not match the layout the operation requires.
    #[error("dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// Submatrix bounds are out of range or inverted.
    #[error("invalid index: {reason}")]
    InvalidIndex { reason: &'static str },

    /// A flat buffer does not hold exactly the number of cells required.
    #[error("invalid length: expected {expected} elements, got {got}")]
    InvalidLength { expected: usize, got: usize },

    /// `decompose()` was called before an input matrix was provided.
    #[error("decomposer is not ready: no input matrix has been set")]
    NotReady,

    /// A mutating call arrived while a decomposition is in progress.
    #[error("decomposer is locked while a decomposition is in progress")]
    Locked,

    /// A factor or query was requested before a successful decomposition.
    #[error("decomposition is not available: call decompose() first")]
    NotAvailable,

    /// The matrix is singular (or numerically so) for the requested operation.
    #[error("matrix is rank deficient")]
    RankDeficient,

    /// Cholesky input is not symmetric positive definite.
    #[error("matrix is not symmetric positive definite")]
    NotPositiveDefinite,

    /// The SVD iteration did not converge within its iteration budget.
    #[error("singular value decomposition did not converge after {iterations} iterations")]
    NotConverged { iterations: usize },

    /// A tolerance or positional argument is outside its valid domain.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: &'static str },
}

/// Convenience alias used throughout `densalg-core`.
pub type Result<T> = std::result::Result<T, AlgebraError>;
