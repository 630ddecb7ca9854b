//! Element-wise helpers over plain `f64` and [`Complex64`] slices.
//!
//! Binary operations require equal lengths and fail with
//! [`AlgebraError::InvalidLength`] otherwise. The `*_into` variants write
//! into a caller-provided slice of the same length.

use num_complex::Complex64;

use crate::Matrix;
use crate::error::{AlgebraError, Result};
use crate::norm::{FrobeniusNormComputer, NormComputer};

fn check_same_len(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(AlgebraError::InvalidLength { expected, got });
    }
    Ok(())
}

fn zip_into<T: Copy>(a: &[T], b: &[T], out: &mut [T], f: impl Fn(T, T) -> T) -> Result<()> {
    check_same_len(a.len(), b.len())?;
    check_same_len(a.len(), out.len())?;
    for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
        *o = f(x, y);
    }
    Ok(())
}

// ======================================================================
// Real vectors
// ======================================================================

/// `a + b`, element-wise.
///
/// ```
/// # use densalg_core::array_utils;
/// let s = array_utils::sum(&[1.0, 2.0], &[10.0, 20.0]).unwrap();
/// assert_eq!(s, vec![11.0, 22.0]);
/// ```
pub fn sum(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    let mut out = vec![0.0; a.len()];
    sum_into(a, b, &mut out)?;
    Ok(out)
}

/// `out = a + b`.
pub fn sum_into(a: &[f64], b: &[f64], out: &mut [f64]) -> Result<()> {
    zip_into(a, b, out, |x, y| x + y)
}

/// `a - b`, element-wise.
pub fn subtract(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    let mut out = vec![0.0; a.len()];
    subtract_into(a, b, &mut out)?;
    Ok(out)
}

/// `out = a - b`.
pub fn subtract_into(a: &[f64], b: &[f64], out: &mut [f64]) -> Result<()> {
    zip_into(a, b, out, |x, y| x - y)
}

/// `scalar * v`.
pub fn multiply_by_scalar(v: &[f64], scalar: f64) -> Vec<f64> {
    v.iter().map(|x| x * scalar).collect()
}

/// `out = scalar * v`.
pub fn multiply_by_scalar_into(v: &[f64], scalar: f64, out: &mut [f64]) -> Result<()> {
    check_same_len(v.len(), out.len())?;
    for (o, &x) in out.iter_mut().zip(v) {
        *o = x * scalar;
    }
    Ok(())
}

/// Inner product `sum(a_i * b_i)`.
pub fn dot_product(a: &[f64], b: &[f64]) -> Result<f64> {
    check_same_len(a.len(), b.len())?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).sum())
}

/// Angle in radians between two vectors, in `[0, π]`.
///
/// NaN when either vector is zero.
pub fn angle(a: &[f64], b: &[f64]) -> Result<f64> {
    let norms = FrobeniusNormComputer.norm_of_array(a) * FrobeniusNormComputer.norm_of_array(b);
    let cos = dot_product(a, b)? / norms;
    Ok(cos.clamp(-1.0, 1.0).acos())
}

/// `v / ‖v‖`.
///
/// A zero vector has no direction; the result is then filled with
/// `f64::MAX` so that callers can detect it.
///
/// ```
/// # use densalg_core::array_utils;
/// assert_eq!(array_utils::normalize(&[3.0, 4.0]), vec![0.6, 0.8]);
/// assert_eq!(array_utils::normalize(&[0.0, 0.0]), vec![f64::MAX; 2]);
/// ```
pub fn normalize(v: &[f64]) -> Vec<f64> {
    let n = FrobeniusNormComputer.norm_of_array(v);
    if n == 0.0 {
        return vec![f64::MAX; v.len()];
    }
    v.iter().map(|x| x / n).collect()
}

/// [`normalize`] together with its `n x n` jacobian
/// `(I ‖v‖² - v vᵗ) / ‖v‖³`.
///
/// For a zero vector both the result and the jacobian are filled with
/// `f64::MAX`.
pub fn normalize_with_jacobian(v: &[f64]) -> Result<(Vec<f64>, Matrix)> {
    let len = v.len();
    let mut jacobian = Matrix::new(len, len)?;
    let n = FrobeniusNormComputer.norm_of_array(v);
    if n == 0.0 {
        jacobian.initialize(f64::MAX);
        return Ok((vec![f64::MAX; len], jacobian));
    }
    let n2 = n * n;
    let n3 = n2 * n;
    for j in 0..len {
        for i in 0..len {
            let identity = if i == j { n2 } else { 0.0 };
            jacobian.set(i, j, (identity - v[i] * v[j]) / n3);
        }
    }
    Ok((normalize(v), jacobian))
}

/// Copy of `v` in reverse order.
pub fn reverse(v: &[f64]) -> Vec<f64> {
    v.iter().rev().copied().collect()
}

/// Element-wise square root.
pub fn sqrt(v: &[f64]) -> Vec<f64> {
    v.iter().map(|x| x.sqrt()).collect()
}

/// Smallest value and its position; `None` for an empty slice.
pub fn min(v: &[f64]) -> Option<(f64, usize)> {
    v.iter()
        .enumerate()
        .fold(None, |best, (i, &x)| match best {
            Some((b, _)) if b <= x => best,
            _ => Some((x, i)),
        })
}

/// Largest value and its position; `None` for an empty slice.
pub fn max(v: &[f64]) -> Option<(f64, usize)> {
    v.iter()
        .enumerate()
        .fold(None, |best, (i, &x)| match best {
            Some((b, _)) if b >= x => best,
            _ => Some((x, i)),
        })
}

// ======================================================================
// Complex vectors
// ======================================================================

/// `a + b` over complex slices.
pub fn sum_complex(a: &[Complex64], b: &[Complex64]) -> Result<Vec<Complex64>> {
    let mut out = vec![Complex64::new(0.0, 0.0); a.len()];
    zip_into(a, b, &mut out, |x, y| x + y)?;
    Ok(out)
}

/// `a - b` over complex slices.
pub fn subtract_complex(a: &[Complex64], b: &[Complex64]) -> Result<Vec<Complex64>> {
    let mut out = vec![Complex64::new(0.0, 0.0); a.len()];
    zip_into(a, b, &mut out, |x, y| x - y)?;
    Ok(out)
}

/// `scalar * v` over complex values.
pub fn multiply_by_scalar_complex(v: &[Complex64], scalar: Complex64) -> Vec<Complex64> {
    v.iter().map(|&x| x * scalar).collect()
}

/// Unconjugated product `sum(a_i * b_i)`.
pub fn dot_product_complex(a: &[Complex64], b: &[Complex64]) -> Result<Complex64> {
    check_same_len(a.len(), b.len())?;
    Ok(a.iter().zip(b).map(|(&x, &y)| x * y).sum())
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_sum_and_subtract() {
        assert_eq!(sum(&[1.0, 2.0], &[3.0, 4.0]).unwrap(), vec![4.0, 6.0]);
        assert_eq!(subtract(&[1.0, 2.0], &[3.0, 5.0]).unwrap(), vec![-2.0, -3.0]);

        let mut out = [0.0; 2];
        sum_into(&[1.0, 2.0], &[3.0, 4.0], &mut out).unwrap();
        assert_eq!(out, [4.0, 6.0]);
        assert_eq!(
            subtract_into(&[1.0, 2.0], &[3.0, 4.0], &mut [0.0; 3]).unwrap_err(),
            AlgebraError::InvalidLength { expected: 2, got: 3 }
        );
        assert!(sum(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_multiply_by_scalar() {
        assert_eq!(multiply_by_scalar(&[1.0, -2.0], 3.0), vec![3.0, -6.0]);
        let mut out = [0.0; 2];
        multiply_by_scalar_into(&[1.0, -2.0], 0.5, &mut out).unwrap();
        assert_eq!(out, [0.5, -1.0]);
        assert!(multiply_by_scalar_into(&[1.0], 1.0, &mut out).is_err());
    }

    #[test]
    fn test_dot_and_angle() {
        assert_eq!(dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap(), 32.0);
        assert_abs_diff_eq!(
            angle(&[1.0, 0.0], &[0.0, 2.0]).unwrap(),
            core::f64::consts::FRAC_PI_2
        );
        assert_abs_diff_eq!(angle(&[1.0, 1.0], &[2.0, 2.0]).unwrap(), 0.0, epsilon = 1e-7);
        assert!(angle(&[0.0, 0.0], &[1.0, 0.0]).unwrap().is_nan());
    }

    #[test]
    fn test_normalize() {
        let n = normalize(&[3.0, 0.0, 4.0]);
        assert_abs_diff_eq!(n[0], 0.6);
        assert_abs_diff_eq!(n[2], 0.8);
        assert_eq!(normalize(&[0.0, 0.0, 0.0]), vec![f64::MAX; 3]);

        let v = [1.0, -2.0, 2.0];
        let scale = FrobeniusNormComputer.norm_of_array(&v);
        assert_abs_diff_eq!(scale, 3.0);
        for (x, y) in normalize(&v).iter().zip(&v) {
            assert_abs_diff_eq!(x * scale, *y, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_normalize_jacobian() {
        let v = [1.0, 2.0, 2.0];
        let (n, jac) = normalize_with_jacobian(&v).unwrap();
        assert_abs_diff_eq!(n[1], 2.0 / 3.0);
        // (I * 9 - v vᵗ) / 27
        assert_abs_diff_eq!(jac.get(0, 0), 8.0 / 27.0);
        assert_abs_diff_eq!(jac.get(1, 2), -4.0 / 27.0);
        assert_abs_diff_eq!(jac.get(2, 0), -2.0 / 27.0);

        // finite-difference check of one column
        let h = 1e-7;
        let shifted = normalize(&[1.0, 2.0 + h, 2.0]);
        for i in 0..3 {
            assert_abs_diff_eq!((shifted[i] - n[i]) / h, jac.get(i, 1), epsilon = 1e-6);
        }

        let (zero, jac) = normalize_with_jacobian(&[0.0, 0.0]).unwrap();
        assert_eq!(zero, vec![f64::MAX; 2]);
        assert_eq!(jac.shape(), (2, 2));
        assert!(jac.iter().all(|&x| x == f64::MAX));
    }

    #[test]
    fn test_reverse_sqrt_min_max() {
        assert_eq!(reverse(&[1.0, 2.0, 3.0]), vec![3.0, 2.0, 1.0]);
        assert_eq!(sqrt(&[4.0, 9.0]), vec![2.0, 3.0]);
        let v = [3.0, -1.0, 7.0, -1.0, 7.0];
        assert_eq!(min(&v), Some((-1.0, 1)));
        assert_eq!(max(&v), Some((7.0, 2)));
        assert_eq!(min(&[]), None);
        assert_eq!(max(&[]), None);
    }

    #[test]
    fn test_complex() {
        let a = [Complex64::new(1.0, 2.0), Complex64::new(0.0, -1.0)];
        let b = [Complex64::new(3.0, -1.0), Complex64::new(2.0, 2.0)];
        assert_eq!(
            sum_complex(&a, &b).unwrap(),
            vec![Complex64::new(4.0, 1.0), Complex64::new(2.0, 1.0)]
        );
        assert_eq!(
            subtract_complex(&a, &b).unwrap(),
            vec![Complex64::new(-2.0, 3.0), Complex64::new(-2.0, -3.0)]
        );
        assert_eq!(
            multiply_by_scalar_complex(&a, Complex64::new(0.0, 1.0)),
            vec![Complex64::new(-2.0, 1.0), Complex64::new(1.0, 0.0)]
        );
        // (1+2i)(3-i) + (-i)(2+2i) = (5+5i) + (2-2i)
        assert_eq!(dot_product_complex(&a, &b).unwrap(), Complex64::new(7.0, 3.0));
        assert!(dot_product_complex(&a, &b[..1]).is_err());
    }
}
