//! Submatrix extraction and assignment, plus row/column/diagonal access.
//!
//! Bounds are inclusive: `(top_row, top_column)` and
//! `(bottom_row, bottom_column)` both belong to the selected block.

use crate::error::{AlgebraError, Result};

use super::Matrix;

/// Inclusive rectangular block of a matrix.
#[derive(Debug, Clone, Copy)]
struct Block {
    top_row: usize,
    top_column: usize,
    bottom_row: usize,
    bottom_column: usize,
}

impl Block {
    fn rows(&self) -> usize {
        self.bottom_row - self.top_row + 1
    }

    fn columns(&self) -> usize {
        self.bottom_column - self.top_column + 1
    }

    fn len(&self) -> usize {
        self.rows() * self.columns()
    }
}

impl Matrix {
    fn block(
        &self,
        top_row: usize,
        top_column: usize,
        bottom_row: usize,
        bottom_column: usize,
    ) -> Result<Block> {
        if bottom_row >= self.rows || bottom_column >= self.columns {
            return Err(AlgebraError::InvalidIndex {
                reason: "submatrix bounds exceed matrix dimensions",
            });
        }
        if top_row > bottom_row || top_column > bottom_column {
            return Err(AlgebraError::InvalidIndex {
                reason: "submatrix top bound is after bottom bound",
            });
        }
        Ok(Block {
            top_row,
            top_column,
            bottom_row,
            bottom_column,
        })
    }

    // ------------------------------------------------------------------
    // Extraction
    // ------------------------------------------------------------------

    /// Copy the inclusive block `[top_row..=bottom_row, top_column..=bottom_column]`.
    ///
    /// ```
    /// # use densalg_core::Matrix;
    /// let m = Matrix::from_rows(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]).unwrap();
    /// let s = m.get_submatrix(1, 1, 2, 2).unwrap();
    /// assert_eq!(s.to_array_with_order(false), vec![5.0, 6.0, 8.0, 9.0]);
    /// ```
    pub fn get_submatrix(
        &self,
        top_row: usize,
        top_column: usize,
        bottom_row: usize,
        bottom_column: usize,
    ) -> Result<Matrix> {
        let b = self.block(top_row, top_column, bottom_row, bottom_column)?;
        let mut out = Matrix::zeros_unchecked(b.rows(), b.columns());
        self.copy_block_into(b, &mut out);
        Ok(out)
    }

    /// Copy the inclusive block into `result`, resizing it if needed.
    pub fn get_submatrix_into(
        &self,
        top_row: usize,
        top_column: usize,
        bottom_row: usize,
        bottom_column: usize,
        result: &mut Matrix,
    ) -> Result<()> {
        let b = self.block(top_row, top_column, bottom_row, bottom_column)?;
        result.ensure_shape(b.rows(), b.columns())?;
        self.copy_block_into(b, result);
        Ok(())
    }

    fn copy_block_into(&self, b: Block, out: &mut Matrix) {
        for j in 0..b.columns() {
            let src = (b.top_column + j) * self.rows + b.top_row;
            let dst = j * out.rows;
            out.buffer[dst..dst + b.rows()].copy_from_slice(&self.buffer[src..src + b.rows()]);
        }
    }

    /// Copy the inclusive block as a flat vector in the default order.
    pub fn get_submatrix_as_array(
        &self,
        top_row: usize,
        top_column: usize,
        bottom_row: usize,
        bottom_column: usize,
    ) -> Result<Vec<f64>> {
        self.get_submatrix_as_array_with_order(
            top_row,
            top_column,
            bottom_row,
            bottom_column,
            Self::DEFAULT_USE_COLUMN_ORDER,
        )
    }

    /// Copy the inclusive block as a flat vector in the requested order.
    pub fn get_submatrix_as_array_with_order(
        &self,
        top_row: usize,
        top_column: usize,
        bottom_row: usize,
        bottom_column: usize,
        column_order: bool,
    ) -> Result<Vec<f64>> {
        let b = self.block(top_row, top_column, bottom_row, bottom_column)?;
        let mut out = Vec::with_capacity(b.len());
        if column_order {
            for j in b.top_column..=b.bottom_column {
                for i in b.top_row..=b.bottom_row {
                    out.push(self.get(i, j));
                }
            }
        } else {
            for i in b.top_row..=b.bottom_row {
                for j in b.top_column..=b.bottom_column {
                    out.push(self.get(i, j));
                }
            }
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    /// Overwrite the inclusive block with the contents of `source`.
    ///
    /// `source` must have exactly the block's shape.
    pub fn set_submatrix(
        &mut self,
        top_row: usize,
        top_column: usize,
        bottom_row: usize,
        bottom_column: usize,
        source: &Matrix,
    ) -> Result<()> {
        let b = self.block(top_row, top_column, bottom_row, bottom_column)?;
        if source.shape() != (b.rows(), b.columns()) {
            return Err(AlgebraError::DimensionMismatch {
                expected: (b.rows(), b.columns()),
                got: source.shape(),
            });
        }
        for j in 0..b.columns() {
            let dst = (b.top_column + j) * self.rows + b.top_row;
            let src = j * source.rows;
            self.buffer[dst..dst + b.rows()].copy_from_slice(&source.buffer[src..src + b.rows()]);
        }
        Ok(())
    }

    /// Overwrite the inclusive block from a flat slice in the default order.
    pub fn set_submatrix_from_array(
        &mut self,
        top_row: usize,
        top_column: usize,
        bottom_row: usize,
        bottom_column: usize,
        values: &[f64],
    ) -> Result<()> {
        self.set_submatrix_from_array_with_order(
            top_row,
            top_column,
            bottom_row,
            bottom_column,
            values,
            Self::DEFAULT_USE_COLUMN_ORDER,
        )
    }

    /// Overwrite the inclusive block from a flat slice in the requested order.
    ///
    /// The slice length must equal the number of cells in the block.
    pub fn set_submatrix_from_array_with_order(
        &mut self,
        top_row: usize,
        top_column: usize,
        bottom_row: usize,
        bottom_column: usize,
        values: &[f64],
        column_order: bool,
    ) -> Result<()> {
        let b = self.block(top_row, top_column, bottom_row, bottom_column)?;
        if values.len() != b.len() {
            return Err(AlgebraError::InvalidLength {
                expected: b.len(),
                got: values.len(),
            });
        }
        let mut it = values.iter();
        if column_order {
            for j in b.top_column..=b.bottom_column {
                for i in b.top_row..=b.bottom_row {
                    if let Some(&v) = it.next() {
                        self.set(i, j, v);
                    }
                }
            }
        } else {
            for i in b.top_row..=b.bottom_row {
                for j in b.top_column..=b.bottom_column {
                    if let Some(&v) = it.next() {
                        self.set(i, j, v);
                    }
                }
            }
        }
        Ok(())
    }

    /// Fill the inclusive block with `value`.
    pub fn set_submatrix_value(
        &mut self,
        top_row: usize,
        top_column: usize,
        bottom_row: usize,
        bottom_column: usize,
        value: f64,
    ) -> Result<()> {
        let b = self.block(top_row, top_column, bottom_row, bottom_column)?;
        for j in b.top_column..=b.bottom_column {
            let start = j * self.rows + b.top_row;
            self.buffer[start..start + b.rows()].fill(value);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rows, columns, diagonal
    // ------------------------------------------------------------------

    /// Copy of row `row` as a `1 x columns` matrix.
    pub fn get_row(&self, row: usize) -> Result<Matrix> {
        self.get_submatrix(row, 0, row, self.columns - 1)
    }

    /// Copy of column `column` as a `rows x 1` matrix.
    pub fn get_column(&self, column: usize) -> Result<Matrix> {
        self.get_submatrix(0, column, self.rows - 1, column)
    }

    /// Overwrite row `row` with `values` (length `columns`).
    pub fn set_row(&mut self, row: usize, values: &[f64]) -> Result<()> {
        let last = self.columns - 1;
        self.set_submatrix_from_array(row, 0, row, last, values)
    }

    /// Overwrite column `column` with `values` (length `rows`).
    pub fn set_column(&mut self, column: usize, values: &[f64]) -> Result<()> {
        let last = self.rows - 1;
        self.set_submatrix_from_array(0, column, last, column, values)
    }

    /// The main diagonal (`min(rows, columns)` values).
    pub fn get_diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.columns))
            .map(|i| self.get(i, i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Matrix {
        Matrix::from_rows(
            3,
            4,
            &[
                1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_get_submatrix() {
        let m = sample();
        let s = m.get_submatrix(0, 1, 1, 3).unwrap();
        assert_eq!(s.shape(), (2, 3));
        assert_eq!(s.to_array_with_order(false), vec![2.0, 3.0, 4.0, 6.0, 7.0, 8.0]);

        let mut out = Matrix::new(1, 1).unwrap();
        m.get_submatrix_into(2, 0, 2, 3, &mut out).unwrap();
        assert_eq!(out.to_array(), vec![9.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_get_submatrix_invalid_index() {
        let m = sample();
        assert!(matches!(
            m.get_submatrix(0, 0, 3, 0),
            Err(AlgebraError::InvalidIndex { .. })
        ));
        assert!(matches!(
            m.get_submatrix(0, 0, 0, 4),
            Err(AlgebraError::InvalidIndex { .. })
        ));
        assert!(matches!(
            m.get_submatrix(2, 0, 1, 0),
            Err(AlgebraError::InvalidIndex { .. })
        ));
        assert!(matches!(
            m.get_submatrix(0, 3, 0, 2),
            Err(AlgebraError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_get_submatrix_as_array() {
        let m = sample();
        assert_eq!(
            m.get_submatrix_as_array(1, 1, 2, 2).unwrap(),
            vec![6.0, 10.0, 7.0, 11.0]
        );
        assert_eq!(
            m.get_submatrix_as_array_with_order(1, 1, 2, 2, false).unwrap(),
            vec![6.0, 7.0, 10.0, 11.0]
        );
    }

    #[test]
    fn test_set_submatrix() {
        let mut m = sample();
        let src = Matrix::from_rows(2, 2, &[-1.0, -2.0, -3.0, -4.0]).unwrap();
        m.set_submatrix(1, 2, 2, 3, &src).unwrap();
        assert_eq!(m.get(1, 2), -1.0);
        assert_eq!(m.get(2, 3), -4.0);
        assert_eq!(m.get(0, 0), 1.0);

        let wrong = Matrix::new(3, 2).unwrap();
        assert!(matches!(
            m.set_submatrix(1, 2, 2, 3, &wrong),
            Err(AlgebraError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_set_submatrix_from_array_orders() {
        let mut a = Matrix::new(2, 2).unwrap();
        a.set_submatrix_from_array(0, 0, 1, 1, &[1.0, 2.0, 3.0, 4.0])
            .unwrap();
        assert_eq!(a.get(1, 0), 2.0);

        let mut b = Matrix::new(2, 2).unwrap();
        b.set_submatrix_from_array_with_order(0, 0, 1, 1, &[1.0, 2.0, 3.0, 4.0], false)
            .unwrap();
        assert_eq!(b.get(0, 1), 2.0);
        assert_eq!(b, a.transpose_and_return_new());
    }

    #[test]
    fn test_set_submatrix_from_array_invalid_length() {
        let mut m = sample();
        assert_eq!(
            m.set_submatrix_from_array(0, 0, 1, 1, &[1.0, 2.0, 3.0])
                .unwrap_err(),
            AlgebraError::InvalidLength {
                expected: 4,
                got: 3
            }
        );
        assert!(matches!(
            m.set_submatrix_from_array(0, 0, 5, 1, &[1.0]),
            Err(AlgebraError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_set_submatrix_value() {
        let mut m = sample();
        m.set_submatrix_value(0, 0, 2, 1, 0.0).unwrap();
        assert_eq!(m.get_column(1).unwrap().to_array(), vec![0.0; 3]);
        assert_eq!(m.get(0, 2), 3.0);
    }

    #[test]
    fn test_rows_columns_diagonal() {
        let mut m = sample();
        assert_eq!(m.get_row(1).unwrap().to_array(), vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(m.get_column(3).unwrap().to_array(), vec![4.0, 8.0, 12.0]);
        m.set_row(0, &[0.0, 0.0, 0.0, 0.0]).unwrap();
        m.set_column(0, &[7.0, 7.0, 7.0]).unwrap();
        assert_eq!(m.get(0, 0), 7.0);
        assert_eq!(m.get(0, 1), 0.0);
        assert_eq!(m.get_diagonal(), vec![7.0, 6.0, 11.0]);
        assert!(m.get_row(3).is_err());
        assert!(m.set_column(0, &[1.0]).is_err());
    }
}
