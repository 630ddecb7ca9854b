//! Householder triangularization shared by the QR decomposers.
//!
//! The working buffer is column-major: column `k` below the diagonal holds
//! the k-th Householder vector (with its leading element shifted by one),
//! the strict upper triangle holds `R`, and the diagonal of `R` is kept
//! separately in `r_diag`.

use crate::Matrix;
use crate::error::Result;

#[derive(Debug, Clone)]
pub(crate) struct Householder {
    qr: Vec<f64>,
    r_diag: Vec<f64>,
    m: usize,
    n: usize,
}

#[allow(clippy::many_single_char_names)]
impl Householder {
    pub(crate) fn factorize(a: &Matrix) -> Self {
        let (m, n) = a.shape();
        let mut qr = a.buffer().to_vec();
        let mut r_diag = vec![0.0; n];

        for k in 0..n {
            let col = k * m;
            let mut norm = (k..m)
                .map(|i| qr[col + i] * qr[col + i])
                .sum::<f64>()
                .sqrt();
            if norm == 0.0 {
                continue;
            }

            // sign chosen to avoid cancellation in qr[k, k] + 1
            if qr[col + k] > 0.0 {
                norm = -norm;
            }
            for i in k..m {
                qr[col + i] /= -norm;
            }
            qr[col + k] += 1.0;

            for j in (k + 1)..n {
                let other = j * m;
                let mut s = 0.0;
                for i in k..m {
                    s += qr[col + i] * qr[other + i];
                }
                s = -s / qr[col + k];
                for i in k..m {
                    qr[other + i] += s * qr[col + i];
                }
            }
            r_diag[k] = norm;
        }

        Self { qr, r_diag, m, n }
    }

    fn at(&self, i: usize, j: usize) -> f64 {
        self.qr[j * self.m + i]
    }

    /// `|R[k, k]| > round_error` for every column.
    pub(crate) fn is_full_rank(&self, round_error: f64) -> bool {
        self.r_diag.iter().all(|d| d.abs() > round_error)
    }

    /// Lower trapezoidal `m x n` matrix of Householder vectors.
    pub(crate) fn h(&self) -> Matrix {
        let mut h = Matrix::zeros_unchecked(self.m, self.n);
        for j in 0..self.n {
            for i in j..self.m {
                h.set(i, j, self.at(i, j));
            }
        }
        h
    }

    /// Upper triangular factor with `rows` rows (`n` or `m`, both `>= n`).
    pub(crate) fn r(&self, rows: usize) -> Matrix {
        let mut r = Matrix::zeros_unchecked(rows, self.n);
        for j in 0..self.n {
            for i in 0..j {
                r.set(i, j, self.at(i, j));
            }
            r.set(j, j, self.r_diag[j]);
        }
        r
    }

    /// Orthonormal factor with `columns` columns (`n` for the economy form,
    /// `m` for the full one), built by applying the reflections in reverse
    /// order to the leading columns of the identity.
    pub(crate) fn q(&self, columns: usize) -> Matrix {
        let m = self.m;
        let mut q = Matrix::zeros_unchecked(m, columns);
        for k in 0..columns.min(m) {
            q.set(k, k, 1.0);
        }
        for k in (0..self.n.min(m)).rev() {
            let vkk = self.at(k, k);
            if vkk == 0.0 {
                continue;
            }
            for j in 0..columns {
                let mut s = 0.0;
                for i in k..m {
                    s += self.at(i, k) * q.get(i, j);
                }
                s = -s / vkk;
                for i in k..m {
                    let v = q.get(i, j) + s * self.at(i, k);
                    q.set(i, j, v);
                }
            }
        }
        q
    }

    /// Least-squares solution of `A x = b` for every column of `b`.
    ///
    /// Callers guarantee full rank, `m >= n` and `b.rows() == m`.
    pub(crate) fn solve_into(&self, b: &Matrix, result: &mut Matrix) -> Result<()> {
        let (m, n) = (self.m, self.n);
        let mut y = b.clone();

        // y = Qᵗ b
        for k in 0..n {
            let vkk = self.at(k, k);
            if vkk == 0.0 {
                continue;
            }
            for j in 0..y.columns() {
                let mut s = 0.0;
                for i in k..m {
                    s += self.at(i, k) * y.get(i, j);
                }
                s = -s / vkk;
                for i in k..m {
                    let v = y.get(i, j) + s * self.at(i, k);
                    y.set(i, j, v);
                }
            }
        }

        // back substitution on R x = y
        for j in 0..y.columns() {
            for k in (0..n).rev() {
                let xk = y.get(k, j) / self.r_diag[k];
                y.set(k, j, xk);
                for i in 0..k {
                    let v = y.get(i, j) - xk * self.at(i, k);
                    y.set(i, j, v);
                }
            }
        }

        y.get_submatrix_into(0, 0, n - 1, y.columns() - 1, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstructs_input() {
        let a = Matrix::from_rows(3, 3, &[12.0, -51.0, 4.0, 6.0, 167.0, -68.0, -4.0, 24.0, -41.0])
            .unwrap();
        let hh = Householder::factorize(&a);
        let qr = hh.q(3).multiply_and_return_new(&hh.r(3)).unwrap();
        assert!(qr.equals(&a, 1e-10));
        assert!(hh.is_full_rank(1e-8));
    }

    #[test]
    fn test_h_is_lower_trapezoidal() {
        let a = Matrix::from_rows(4, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
        let h = Householder::factorize(&a).h();
        assert_eq!(h.shape(), (4, 2));
        assert_eq!(h.get(0, 1), 0.0);
    }

    #[test]
    fn test_zero_column_is_skipped() {
        let a = Matrix::from_rows(3, 2, &[0.0, 1.0, 0.0, 2.0, 0.0, 3.0]).unwrap();
        let hh = Householder::factorize(&a);
        assert!(!hh.is_full_rank(0.0));
        let qr = hh.q(2).multiply_and_return_new(&hh.r(2)).unwrap();
        assert!(qr.equals(&a, 1e-12));
    }
}
