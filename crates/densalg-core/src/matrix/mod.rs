//! Dense two-dimensional matrix of `f64` values.
//!
//! The [`Matrix`] type owns a contiguous buffer of `rows * columns` cells
//! stored in column-major order (`index = column * rows + row`). Every
//! operation that flattens or loads a buffer also accepts an explicit
//! `column_order` flag so data laid out in row-major order round-trips
//! consistently.
//!
//! Arithmetic comes in two forms: an in-place method that mutates `self`
//! (`add`, `multiply`, `transpose`, ...) and an `*_and_return_new` method that
//! leaves the operands untouched and hands a freshly allocated matrix to the
//! caller.

mod create;
mod display;
mod ops;
mod submatrix;

use core::hash::{Hash, Hasher};
use core::ops::{Index, IndexMut};

use crate::error::{AlgebraError, Result};

/// A dense `rows x columns` matrix of `f64` values.
///
/// Data is stored contiguously in column-major order. The matrix owns its
/// buffer and cloning performs a deep copy.
#[derive(Debug, Clone)]
pub struct Matrix {
    rows: usize,
    columns: usize,
    buffer: Vec<f64>,
}

impl Matrix {
    /// Storage order used by every matrix: `true` means column-major.
    pub const DEFAULT_USE_COLUMN_ORDER: bool = true;

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a zero-filled matrix.
    ///
    /// Returns [`AlgebraError::InvalidDimension`] if `rows` or `columns` is 0.
    ///
    /// ```
    /// # use densalg_core::Matrix;
    /// let m = Matrix::new(2, 3).unwrap();
    /// assert_eq!(m.rows(), 2);
    /// assert_eq!(m.columns(), 3);
    /// assert!(m.buffer().iter().all(|&v| v == 0.0));
    /// ```
    pub fn new(rows: usize, columns: usize) -> Result<Self> {
        check_dimensions(rows, columns)?;
        Ok(Self {
            rows,
            columns,
            buffer: vec![0.0; rows * columns],
        })
    }

    /// Create a matrix from a flat buffer laid out in column-major order.
    pub fn from_column_major(rows: usize, columns: usize, buffer: Vec<f64>) -> Result<Self> {
        check_dimensions(rows, columns)?;
        if buffer.len() != rows * columns {
            return Err(AlgebraError::InvalidLength {
                expected: rows * columns,
                got: buffer.len(),
            });
        }
        Ok(Self {
            rows,
            columns,
            buffer,
        })
    }

    /// Create a matrix from values listed row by row.
    ///
    /// Handy for writing matrix literals in their natural reading order.
    ///
    /// ```
    /// # use densalg_core::Matrix;
    /// let m = Matrix::from_rows(2, 2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(m.get(0, 1), 2.0);
    /// assert_eq!(m.get(1, 0), 3.0);
    /// ```
    pub fn from_rows(rows: usize, columns: usize, values: &[f64]) -> Result<Self> {
        let mut m = Self::new(rows, columns)?;
        m.from_array_with_order(values, false)?;
        Ok(m)
    }

    /// Internal constructor for shapes already known to be valid.
    pub(crate) fn zeros_unchecked(rows: usize, columns: usize) -> Self {
        debug_assert!(rows > 0 && columns > 0);
        Self {
            rows,
            columns,
            buffer: vec![0.0; rows * columns],
        }
    }

    // ------------------------------------------------------------------
    // Shape
    // ------------------------------------------------------------------

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Total number of cells (`rows * columns`).
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always `false`: a matrix has at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether `rows == columns`.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.columns
    }

    /// `(rows, columns)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// Reallocate the buffer to a new shape, zero-filling every cell.
    pub fn resize(&mut self, rows: usize, columns: usize) -> Result<()> {
        check_dimensions(rows, columns)?;
        self.rows = rows;
        self.columns = columns;
        self.buffer = vec![0.0; rows * columns];
        Ok(())
    }

    /// Reallocate the buffer to a new shape and fill it with `value`.
    pub fn reset(&mut self, rows: usize, columns: usize, value: f64) -> Result<()> {
        check_dimensions(rows, columns)?;
        self.rows = rows;
        self.columns = columns;
        self.buffer = vec![value; rows * columns];
        Ok(())
    }

    /// Set every cell to `value`, keeping the current shape.
    pub fn initialize(&mut self, value: f64) {
        self.buffer.fill(value);
    }

    /// Resize only when the shape differs; used by the `*_into` helpers.
    pub(crate) fn ensure_shape(&mut self, rows: usize, columns: usize) -> Result<()> {
        if self.rows != rows || self.columns != columns {
            self.resize(rows, columns)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------

    /// Flat buffer index of cell `(row, column)` in the default order.
    #[inline]
    pub fn get_index(&self, row: usize, column: usize) -> usize {
        column * self.rows + row
    }

    /// Flat index of `(row, column)` in the requested order.
    #[inline]
    pub fn get_index_with_order(&self, row: usize, column: usize, column_order: bool) -> usize {
        if column_order {
            column * self.rows + row
        } else {
            row * self.columns + column
        }
    }

    /// Value at `(row, column)`. Panics if the cell lies outside the buffer.
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.buffer[column * self.rows + row]
    }

    /// Overwrite the value at `(row, column)`.
    #[inline]
    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        let idx = column * self.rows + row;
        self.buffer[idx] = value;
    }

    /// Value at a flat buffer position.
    #[inline]
    pub fn get_at(&self, index: usize) -> f64 {
        self.buffer[index]
    }

    /// Overwrite the value at a flat buffer position.
    #[inline]
    pub fn set_at(&mut self, index: usize, value: f64) {
        self.buffer[index] = value;
    }

    /// Borrow the internal column-major buffer.
    #[inline]
    pub fn buffer(&self) -> &[f64] {
        &self.buffer
    }

    /// Mutably borrow the internal column-major buffer.
    #[inline]
    pub fn buffer_mut(&mut self) -> &mut [f64] {
        &mut self.buffer
    }

    /// Consume the matrix and return its column-major buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<f64> {
        self.buffer
    }

    /// Copy of the cells in the default (column-major) order.
    pub fn to_array(&self) -> Vec<f64> {
        self.buffer.clone()
    }

    /// Copy of the cells in the requested order.
    pub fn to_array_with_order(&self, column_order: bool) -> Vec<f64> {
        if column_order {
            return self.buffer.clone();
        }
        let mut out = Vec::with_capacity(self.buffer.len());
        for i in 0..self.rows {
            for j in 0..self.columns {
                out.push(self.buffer[j * self.rows + i]);
            }
        }
        out
    }

    /// Load cells from a flat slice in the default order.
    ///
    /// The slice must hold exactly `rows * columns` values.
    #[allow(clippy::wrong_self_convention)]
    pub fn from_array(&mut self, values: &[f64]) -> Result<()> {
        self.from_array_with_order(values, Self::DEFAULT_USE_COLUMN_ORDER)
    }

    /// Load cells from a flat slice laid out in the requested order.
    #[allow(clippy::wrong_self_convention)]
    pub fn from_array_with_order(&mut self, values: &[f64], column_order: bool) -> Result<()> {
        if values.len() != self.buffer.len() {
            return Err(AlgebraError::InvalidLength {
                expected: self.buffer.len(),
                got: values.len(),
            });
        }
        if column_order {
            self.buffer.copy_from_slice(values);
        } else {
            for i in 0..self.rows {
                for j in 0..self.columns {
                    self.buffer[j * self.rows + i] = values[i * self.columns + j];
                }
            }
        }
        Ok(())
    }

    /// Copy shape and contents of `other` into `self`, reusing the allocation
    /// when the sizes agree.
    pub fn copy_from(&mut self, other: &Matrix) {
        self.rows = other.rows;
        self.columns = other.columns;
        self.buffer.clear();
        self.buffer.extend_from_slice(&other.buffer);
    }

    // ------------------------------------------------------------------
    // Comparison
    // ------------------------------------------------------------------

    /// Whether `other` has the same shape and every cell differs by at most
    /// `threshold`.
    ///
    /// ```
    /// # use densalg_core::Matrix;
    /// let a = Matrix::from_rows(1, 2, &[1.0, 2.0]).unwrap();
    /// let b = Matrix::from_rows(1, 2, &[1.0, 2.05]).unwrap();
    /// assert!(a.equals(&b, 0.1));
    /// assert!(!a.equals(&b, 0.01));
    /// ```
    pub fn equals(&self, other: &Matrix, threshold: f64) -> bool {
        self.rows == other.rows
            && self.columns == other.columns
            && self
                .buffer
                .iter()
                .zip(&other.buffer)
                .all(|(&a, &b)| (a - b).abs() <= threshold)
    }

    // ------------------------------------------------------------------
    // Map / apply
    // ------------------------------------------------------------------

    /// Iterate over all cells in column-major order.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.buffer.iter()
    }

    /// Apply a function to every cell, returning a new matrix.
    pub fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            columns: self.columns,
            buffer: self.buffer.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Apply a function to every cell in place.
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        for x in &mut self.buffer {
            *x = f(*x);
        }
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, 0.0)
    }
}

impl Hash for Matrix {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rows.hash(state);
        self.columns.hash(state);
        for &v in &self.buffer {
            // -0.0 == 0.0, so both must hash alike
            let v = if v == 0.0 { 0.0_f64 } else { v };
            v.to_bits().hash(state);
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (row, column): (usize, usize)) -> &f64 {
        &self.buffer[column * self.rows + row]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut f64 {
        &mut self.buffer[column * self.rows + row]
    }
}

pub(crate) fn check_dimensions(rows: usize, columns: usize) -> Result<()> {
    if rows == 0 || columns == 0 {
        return Err(AlgebraError::InvalidDimension { rows, columns });
    }
    Ok(())
}
