//! Arithmetic on [`Matrix`].
//!
//! Every operation exists as an in-place method mutating `self` and as an
//! `*_and_return_new` method allocating the result. Binary operations return
//! [`AlgebraError::DimensionMismatch`] for incompatible shapes.
//!
//! The `core::ops` operator impls (`&a + &b`, `&a * &b`, ...) are
//! convenience wrappers that panic on shape mismatch. They are implemented
//! through full paths so `core::ops::Add` never shadows the in-place `add`.

use crate::error::{AlgebraError, Result};

use super::Matrix;

impl Matrix {
    fn check_same_shape(&self, other: &Matrix) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(AlgebraError::DimensionMismatch {
                expected: self.shape(),
                got: other.shape(),
            });
        }
        Ok(())
    }

    fn zip_apply<F>(&mut self, other: &Matrix, f: F) -> Result<()>
    where
        F: Fn(f64, f64) -> f64,
    {
        self.check_same_shape(other)?;
        for (a, &b) in self.buffer.iter_mut().zip(&other.buffer) {
            *a = f(*a, b);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Element-wise
    // ------------------------------------------------------------------

    /// `self += other`.
    pub fn add(&mut self, other: &Matrix) -> Result<()> {
        self.zip_apply(other, |a, b| a + b)
    }

    /// `self + other` as a new matrix.
    pub fn add_and_return_new(&self, other: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.add(other)?;
        Ok(out)
    }

    /// Write `self + other` into `result`, resizing it if needed.
    pub fn add_into(&self, other: &Matrix, result: &mut Matrix) -> Result<()> {
        self.check_same_shape(other)?;
        result.copy_from(self);
        result.add(other)
    }

    /// `self -= other`.
    pub fn subtract(&mut self, other: &Matrix) -> Result<()> {
        self.zip_apply(other, |a, b| a - b)
    }

    /// `self - other` as a new matrix.
    pub fn subtract_and_return_new(&self, other: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.subtract(other)?;
        Ok(out)
    }

    /// Write `self - other` into `result`, resizing it if needed.
    pub fn subtract_into(&self, other: &Matrix, result: &mut Matrix) -> Result<()> {
        self.check_same_shape(other)?;
        result.copy_from(self);
        result.subtract(other)
    }

    /// Hadamard product in place: `self[i,j] *= other[i,j]`.
    pub fn element_by_element_product(&mut self, other: &Matrix) -> Result<()> {
        self.zip_apply(other, |a, b| a * b)
    }

    /// Hadamard product as a new matrix.
    pub fn element_by_element_product_and_return_new(&self, other: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.element_by_element_product(other)?;
        Ok(out)
    }

    /// Multiply every cell by `scalar`.
    pub fn multiply_by_scalar(&mut self, scalar: f64) {
        for v in &mut self.buffer {
            *v *= scalar;
        }
    }

    /// `scalar * self` as a new matrix.
    pub fn multiply_by_scalar_and_return_new(&self, scalar: f64) -> Matrix {
        self.map(|v| v * scalar)
    }

    // ------------------------------------------------------------------
    // Matrix product
    // ------------------------------------------------------------------

    /// Replace `self` with `self * other`.
    ///
    /// Requires `self.columns() == other.rows()`; the result has shape
    /// `(self.rows(), other.columns())`.
    pub fn multiply(&mut self, other: &Matrix) -> Result<()> {
        let product = self.multiply_and_return_new(other)?;
        *self = product;
        Ok(())
    }

    /// `self * other` as a new matrix.
    ///
    /// ```
    /// # use densalg_core::Matrix;
    /// let a = Matrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    /// let b = Matrix::from_rows(2, 1, &[5.0, 6.0]).unwrap();
    /// let c = a.multiply_and_return_new(&b).unwrap();
    /// assert_eq!(c.to_array(), vec![17.0, 39.0]);
    /// ```
    pub fn multiply_and_return_new(&self, other: &Matrix) -> Result<Matrix> {
        let mut out = Matrix::zeros_unchecked(self.rows, other.columns);
        self.multiply_into(other, &mut out)?;
        Ok(out)
    }

    /// Write `self * other` into `result`, resizing it if needed.
    pub fn multiply_into(&self, other: &Matrix, result: &mut Matrix) -> Result<()> {
        if self.columns != other.rows {
            return Err(AlgebraError::DimensionMismatch {
                expected: (self.columns, other.columns),
                got: other.shape(),
            });
        }
        result.ensure_shape(self.rows, other.columns)?;
        let (m, k, n) = (self.rows, self.columns, other.columns);
        result.buffer.fill(0.0);
        // j-p-i loop order walks every buffer contiguously in column-major
        for j in 0..n {
            let out_col = &mut result.buffer[j * m..(j + 1) * m];
            for p in 0..k {
                let b = other.buffer[j * k + p];
                let a_col = &self.buffer[p * m..(p + 1) * m];
                for (o, &a) in out_col.iter_mut().zip(a_col) {
                    *o += a * b;
                }
            }
        }
        Ok(())
    }

    /// Replace `self` with the Kronecker product `self ⊗ other`.
    pub fn multiply_kronecker(&mut self, other: &Matrix) {
        *self = self.multiply_kronecker_and_return_new(other);
    }

    /// Kronecker (tensor) product `self ⊗ other` as a new matrix.
    ///
    /// The result has shape `(ra * rb, ca * cb)`; block `(bi, bj)` equals
    /// `self[bi, bj] * other`.
    ///
    /// ```
    /// # use densalg_core::Matrix;
    /// let a = Matrix::from_rows(2, 2, &[1.0, 3.0, 2.0, 1.0]).unwrap();
    /// let b = Matrix::from_rows(2, 2, &[0.0, 2.0, 3.0, 1.0]).unwrap();
    /// let k = a.multiply_kronecker_and_return_new(&b);
    /// assert_eq!(k.get(1, 2), 9.0);
    /// ```
    pub fn multiply_kronecker_and_return_new(&self, other: &Matrix) -> Matrix {
        let (ra, ca) = self.shape();
        let (rb, cb) = other.shape();
        let mut out = Matrix::zeros_unchecked(ra * rb, ca * cb);
        for bj in 0..ca {
            for bi in 0..ra {
                let scale = self.get(bi, bj);
                for j in 0..cb {
                    for i in 0..rb {
                        out.set(bi * rb + i, bj * cb + j, scale * other.get(i, j));
                    }
                }
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Transpose / symmetrize
    // ------------------------------------------------------------------

    /// Transpose in place, swapping the dimensions.
    pub fn transpose(&mut self) {
        *self = self.transpose_and_return_new();
    }

    /// The transpose as a new matrix.
    pub fn transpose_and_return_new(&self) -> Matrix {
        let mut out = Matrix::zeros_unchecked(self.columns, self.rows);
        self.transpose_into_unchecked(&mut out);
        out
    }

    /// Write the transpose into `result`, resizing it if needed.
    pub fn transpose_into(&self, result: &mut Matrix) -> Result<()> {
        result.ensure_shape(self.columns, self.rows)?;
        self.transpose_into_unchecked(result);
        Ok(())
    }

    fn transpose_into_unchecked(&self, result: &mut Matrix) {
        for j in 0..self.columns {
            for i in 0..self.rows {
                result.set(j, i, self.get(i, j));
            }
        }
    }

    /// Replace `self` with `0.5 * (self + selfᵗ)`. Requires a square matrix.
    pub fn symmetrize(&mut self) -> Result<()> {
        if !self.is_square() {
            return Err(AlgebraError::DimensionMismatch {
                expected: (self.rows, self.rows),
                got: self.shape(),
            });
        }
        let n = self.rows;
        for j in 0..n {
            for i in (j + 1)..n {
                let avg = 0.5 * (self.get(i, j) + self.get(j, i));
                self.set(i, j, avg);
                self.set(j, i, avg);
            }
        }
        Ok(())
    }

    /// `0.5 * (self + selfᵗ)` as a new matrix.
    pub fn symmetrize_and_return_new(&self) -> Result<Matrix> {
        let mut out = self.clone();
        out.symmetrize()?;
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Reductions
    // ------------------------------------------------------------------

    /// Sum of every cell.
    pub fn sum(&self) -> f64 {
        self.buffer.iter().sum()
    }

    /// Smallest cell value.
    pub fn min_value(&self) -> f64 {
        self.buffer.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest cell value.
    pub fn max_value(&self) -> f64 {
        self.buffer.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

// ======================================================================
// Operators (panic on mismatch; use the named methods for `Result`s)
// ======================================================================

impl core::ops::Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: &Matrix) -> Matrix {
        match self.add_and_return_new(rhs) {
            Ok(m) => m,
            Err(e) => panic!("matrix addition: {e}"),
        }
    }
}

impl core::ops::Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: &Matrix) -> Matrix {
        match self.subtract_and_return_new(rhs) {
            Ok(m) => m,
            Err(e) => panic!("matrix subtraction: {e}"),
        }
    }
}

impl core::ops::Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        match self.multiply_and_return_new(rhs) {
            Ok(m) => m,
            Err(e) => panic!("matrix product: {e}"),
        }
    }
}

impl core::ops::Mul<f64> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: f64) -> Matrix {
        self.multiply_by_scalar_and_return_new(rhs)
    }
}

impl core::ops::Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self.map(|v| -v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: usize, columns: usize, values: &[f64]) -> Matrix {
        Matrix::from_rows(rows, columns, values).unwrap()
    }

    #[test]
    fn test_add_subtract() {
        let mut a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = m(2, 2, &[10.0, 20.0, 30.0, 40.0]);
        let c = a.add_and_return_new(&b).unwrap();
        assert_eq!(c, m(2, 2, &[11.0, 22.0, 33.0, 44.0]));
        assert_eq!(a, m(2, 2, &[1.0, 2.0, 3.0, 4.0]));

        a.subtract(&b).unwrap();
        assert_eq!(a, m(2, 2, &[-9.0, -18.0, -27.0, -36.0]));

        let mut out = Matrix::new(1, 1).unwrap();
        b.subtract_into(&b, &mut out).unwrap();
        assert_eq!(out.shape(), (2, 2));
        assert!(out.iter().all(|&v| v == 0.0));
        b.add_into(&b, &mut out).unwrap();
        assert_eq!(out, &b * 2.0);
    }

    #[test]
    fn test_multiply_propagates_non_finite() {
        let a = m(2, 2, &[f64::INFINITY, 1.0, 2.0, 3.0]);
        let b = m(2, 1, &[0.0, 1.0]);
        let c = a.multiply_and_return_new(&b).unwrap();
        assert!(c.get(0, 0).is_nan());
        assert!((c.get(1, 0) - 3.0).abs() < f64::EPSILON);

        let nan = m(1, 1, &[f64::NAN]);
        let zero = m(1, 1, &[0.0]);
        assert!(zero.multiply_and_return_new(&nan).unwrap().get(0, 0).is_nan());
    }

    #[test]
    fn test_shape_mismatch() {
        let mut a = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let b = m(1, 2, &[1.0, 2.0]);
        assert_eq!(
            a.add(&b).unwrap_err(),
            AlgebraError::DimensionMismatch {
                expected: (2, 2),
                got: (1, 2)
            }
        );
        assert!(a.subtract_and_return_new(&b).is_err());
        assert!(a.element_by_element_product(&b).is_err());
        // operand untouched after a failed in-place call
        assert_eq!(a, m(2, 2, &[1.0, 2.0, 3.0, 4.0]));
    }

    #[test]
    fn test_element_by_element_product() {
        let a = m(1, 3, &[1.0, 2.0, 3.0]);
        let b = m(1, 3, &[4.0, 5.0, 6.0]);
        let c = a.element_by_element_product_and_return_new(&b).unwrap();
        assert_eq!(c, m(1, 3, &[4.0, 10.0, 18.0]));
    }

    #[test]
    fn test_multiply_by_scalar() {
        let mut a = m(1, 2, &[1.0, -2.0]);
        assert_eq!(a.multiply_by_scalar_and_return_new(3.0), m(1, 2, &[3.0, -6.0]));
        a.multiply_by_scalar(-1.0);
        assert_eq!(a, m(1, 2, &[-1.0, 2.0]));
    }

    #[test]
    fn test_multiply() {
        let a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = m(3, 2, &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = a.multiply_and_return_new(&b).unwrap();
        assert_eq!(c, m(2, 2, &[58.0, 64.0, 139.0, 154.0]));

        let mut a2 = a.clone();
        a2.multiply(&b).unwrap();
        assert_eq!(a2, c);
        assert_eq!(&a * &b, c);
    }

    #[test]
    fn test_multiply_mismatch() {
        let mut a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = m(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(
            a.multiply(&b),
            Err(AlgebraError::DimensionMismatch { .. })
        ));
        assert_eq!(a.shape(), (2, 3));
    }

    #[test]
    fn test_kronecker_literal() {
        let a = m(2, 2, &[1.0, 3.0, 2.0, 1.0]);
        let b = m(2, 2, &[0.0, 2.0, 3.0, 1.0]);
        let expected = m(
            4,
            4,
            &[
                0.0, 2.0, 0.0, 6.0, 3.0, 1.0, 9.0, 3.0, 0.0, 4.0, 0.0, 2.0, 6.0, 2.0, 3.0, 1.0,
            ],
        );
        assert_eq!(a.multiply_kronecker_and_return_new(&b), expected);

        let mut a2 = a.clone();
        a2.multiply_kronecker(&b);
        assert_eq!(a2, expected);
    }

    #[test]
    fn test_kronecker_rectangular_shape() {
        let a = m(1, 2, &[1.0, 2.0]);
        let b = m(3, 1, &[1.0, 1.0, 1.0]);
        let k = a.multiply_kronecker_and_return_new(&b);
        assert_eq!(k.shape(), (3, 2));
        assert_eq!(k.get(2, 1), 2.0);
    }

    #[test]
    fn test_transpose() {
        let mut a = m(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = a.transpose_and_return_new();
        assert_eq!(t, m(3, 2, &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]));
        a.transpose();
        assert_eq!(a, t);

        let mut out = Matrix::new(1, 1).unwrap();
        t.transpose_into(&mut out).unwrap();
        assert_eq!(out.shape(), (2, 3));
    }

    #[test]
    fn test_symmetrize() {
        let a = m(2, 2, &[1.0, 2.0, 4.0, 3.0]);
        let s = a.symmetrize_and_return_new().unwrap();
        assert_eq!(s, m(2, 2, &[1.0, 3.0, 3.0, 3.0]));
        let mut r = m(2, 3, &[0.0; 6]);
        assert!(matches!(
            r.symmetrize(),
            Err(AlgebraError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_reductions_and_neg() {
        let a = m(2, 2, &[1.0, -2.0, 5.0, 0.5]);
        assert_eq!(a.sum(), 4.5);
        assert_eq!(a.min_value(), -2.0);
        assert_eq!(a.max_value(), 5.0);
        assert_eq!(-&a, m(2, 2, &[-1.0, 2.0, -5.0, -0.5]));
        assert_eq!(&(&a + &a) - &a, a);
    }

    #[test]
    #[should_panic(expected = "matrix product")]
    fn test_mul_operator_panics_on_mismatch() {
        let a = m(2, 3, &[0.0; 6]);
        let _ = &a * &a;
    }
}
