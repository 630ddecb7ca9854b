//! Matrix factories: identity, diagonal, random-filled and from-array.

use rand::Rng;

use crate::error::Result;
use crate::random::{self, GaussianRandomizer, Randomizer, UniformRandomizer};

use super::{Matrix, check_dimensions};

impl Matrix {
    /// Create a `rows x columns` matrix with ones on the main diagonal.
    ///
    /// ```
    /// # use densalg_core::Matrix;
    /// let eye = Matrix::identity(3, 2).unwrap();
    /// assert_eq!(eye.get(0, 0), 1.0);
    /// assert_eq!(eye.get(1, 1), 1.0);
    /// assert_eq!(eye.get(2, 1), 0.0);
    /// ```
    pub fn identity(rows: usize, columns: usize) -> Result<Self> {
        let mut m = Self::new(rows, columns)?;
        for i in 0..rows.min(columns) {
            m.set(i, i, 1.0);
        }
        Ok(m)
    }

    /// Create a square matrix with `values` on the diagonal.
    pub fn diagonal(values: &[f64]) -> Result<Self> {
        let n = values.len();
        let mut m = Self::new(n, n)?;
        for (i, &v) in values.iter().enumerate() {
            m.set(i, i, v);
        }
        Ok(m)
    }

    /// Create a matrix filled with values uniformly distributed in
    /// `[min, max)`.
    ///
    /// Returns an error if a dimension is 0 or `min >= max`.
    pub fn create_with_uniform_random_values(
        rows: usize,
        columns: usize,
        min: f64,
        max: f64,
    ) -> Result<Self> {
        check_dimensions(rows, columns)?;
        let mut randomizer = UniformRandomizer::new(min, max)?;
        let mut m = Self::zeros_unchecked(rows, columns);
        randomizer.fill(m.buffer_mut());
        Ok(m)
    }

    /// Same as [`Matrix::create_with_uniform_random_values`] drawing from a
    /// caller-supplied generator.
    pub fn create_with_uniform_random_values_with_rng<R: Rng + ?Sized>(
        rows: usize,
        columns: usize,
        min: f64,
        max: f64,
        rng: &mut R,
    ) -> Result<Self> {
        check_dimensions(rows, columns)?;
        let mut m = Self::zeros_unchecked(rows, columns);
        random::fill_uniform(m.buffer_mut(), min, max, rng)?;
        Ok(m)
    }

    /// Create a matrix filled with Gaussian samples.
    ///
    /// Returns an error if a dimension is 0 or `standard_deviation < 0`.
    pub fn create_with_gaussian_random_values(
        rows: usize,
        columns: usize,
        mean: f64,
        standard_deviation: f64,
    ) -> Result<Self> {
        check_dimensions(rows, columns)?;
        let mut randomizer = GaussianRandomizer::new(mean, standard_deviation)?;
        let mut m = Self::zeros_unchecked(rows, columns);
        randomizer.fill(m.buffer_mut());
        Ok(m)
    }

    /// Same as [`Matrix::create_with_gaussian_random_values`] drawing from a
    /// caller-supplied generator.
    pub fn create_with_gaussian_random_values_with_rng<R: Rng + ?Sized>(
        rows: usize,
        columns: usize,
        mean: f64,
        standard_deviation: f64,
        rng: &mut R,
    ) -> Result<Self> {
        check_dimensions(rows, columns)?;
        let mut m = Self::zeros_unchecked(rows, columns);
        random::fill_gaussian(m.buffer_mut(), mean, standard_deviation, rng)?;
        Ok(m)
    }

    /// Build a vector matrix holding a copy of `values`.
    ///
    /// The result is a column vector (`n x 1`) in the default order.
    pub fn new_from_array(values: &[f64]) -> Result<Self> {
        Self::new_from_array_with_order(values, Self::DEFAULT_USE_COLUMN_ORDER)
    }

    /// Build a vector matrix holding a copy of `values`: a column vector
    /// (`n x 1`) when `column_order` is true, a row vector (`1 x n`) otherwise.
    ///
    /// ```
    /// # use densalg_core::Matrix;
    /// let col = Matrix::new_from_array_with_order(&[1.0, 2.0, 3.0], true).unwrap();
    /// assert_eq!(col.shape(), (3, 1));
    /// let row = Matrix::new_from_array_with_order(&[1.0, 2.0, 3.0], false).unwrap();
    /// assert_eq!(row.shape(), (1, 3));
    /// ```
    pub fn new_from_array_with_order(values: &[f64], column_order: bool) -> Result<Self> {
        let (rows, columns) = if column_order {
            (values.len(), 1)
        } else {
            (1, values.len())
        };
        Self::from_column_major(rows, columns, values.to_vec())
    }
}
