//! Singular Value Decomposition (SVD).
//!
//! Decomposes a matrix `A` (m x n) into `A = U diag(s) Vᵗ` where, with
//! `k = min(m, n)`:
//! - `U` is `m x k` with orthonormal columns (left singular vectors)
//! - `s` holds the `k` singular values in descending order
//! - `V` is `n x k` with orthonormal columns (right singular vectors)
//!
//! Uses Householder bidiagonalization followed by implicit-shift QR
//! iterations on the bidiagonal (Golub–Kahan). Wide matrices are
//! decomposed through their transpose.

use crate::Matrix;
use crate::error::{AlgebraError, Result};

use super::{Decomposer, DecomposerState, DecomposerType};

#[derive(Debug, Clone)]
struct SvdFactors {
    u: Matrix,
    s: Vec<f64>,
    v: Matrix,
    rows: usize,
    columns: usize,
}

impl SvdFactors {
    fn threshold(&self) -> f64 {
        self.rows.max(self.columns) as f64 * self.s[0] * f64::EPSILON
    }

    fn rank(&self) -> usize {
        let tol = self.threshold();
        self.s.iter().filter(|&&sv| sv > tol).count()
    }
}

/// SVD decomposer.
///
/// ```
/// # use densalg_core::Matrix;
/// # use densalg_core::decomposer::{Decomposer, SingularValueDecomposer};
/// let a = Matrix::diagonal(&[3.0, 4.0]).unwrap();
/// let mut svd = SingularValueDecomposer::with_matrix(&a);
/// svd.decompose().unwrap();
/// let s = svd.singular_values().unwrap();
/// assert!((s[0] - 4.0).abs() < 1e-12);
/// assert!((s[1] - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct SingularValueDecomposer<'a> {
    state: DecomposerState<'a>,
    factors: Option<SvdFactors>,
    max_iterations: usize,
}

impl Default for SingularValueDecomposer<'_> {
    fn default() -> Self {
        Self {
            state: DecomposerState::default(),
            factors: None,
            max_iterations: Self::DEFAULT_MAX_ITERS,
        }
    }
}

impl<'a> SingularValueDecomposer<'a> {
    /// QR sweeps allowed per singular value before giving up.
    pub const DEFAULT_MAX_ITERS: usize = 75;

    /// A decomposer with no input matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// A decomposer ready to decompose `m`.
    pub fn with_matrix(m: &'a Matrix) -> Self {
        Self {
            state: DecomposerState::new(Some(m)),
            ..Self::default()
        }
    }

    /// Current iteration budget per singular value.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Change the iteration budget; must be positive. Fails with
    /// [`AlgebraError::Locked`] while decomposing.
    pub fn set_max_iterations(&mut self, max_iterations: usize) -> Result<()> {
        if self.state.is_locked() {
            return Err(AlgebraError::Locked);
        }
        if max_iterations == 0 {
            return Err(AlgebraError::InvalidArgument {
                reason: "maximum number of iterations must be positive",
            });
        }
        self.max_iterations = max_iterations;
        Ok(())
    }

    fn factors(&self) -> Result<&SvdFactors> {
        self.factors.as_ref().ok_or(AlgebraError::NotAvailable)
    }

    /// `m x k` left singular vectors.
    pub fn u(&self) -> Result<Matrix> {
        Ok(self.factors()?.u.clone())
    }

    /// `n x k` right singular vectors.
    pub fn v(&self) -> Result<Matrix> {
        Ok(self.factors()?.v.clone())
    }

    /// Singular values in descending order.
    pub fn singular_values(&self) -> Result<&[f64]> {
        Ok(&self.factors()?.s)
    }

    /// `k x k` diagonal matrix of singular values.
    pub fn w(&self) -> Result<Matrix> {
        Matrix::diagonal(&self.factors()?.s)
    }

    /// Singular values at or below this value are treated as zero:
    /// `max(m, n) * s[0] * ε`.
    pub fn negligible_singular_value_threshold(&self) -> Result<f64> {
        Ok(self.factors()?.threshold())
    }

    /// Number of singular values above the negligible threshold.
    pub fn rank(&self) -> Result<usize> {
        Ok(self.factors()?.rank())
    }

    /// Dimension of the null space, `n - rank`.
    pub fn nullity(&self) -> Result<usize> {
        let f = self.factors()?;
        Ok(f.columns - f.rank())
    }

    /// Largest singular value.
    pub fn norm2(&self) -> Result<f64> {
        Ok(self.factors()?.s[0])
    }

    /// `s[0] / s[k - 1]`; infinite for a singular matrix.
    pub fn condition_number(&self) -> Result<f64> {
        let s = &self.factors()?.s;
        let min = s[s.len() - 1];
        if min == 0.0 {
            return Ok(f64::INFINITY);
        }
        Ok(s[0] / min)
    }

    /// `s[k - 1] / s[0]`; zero for a singular matrix, NaN for a zero matrix.
    pub fn reciprocal_condition_number(&self) -> Result<f64> {
        let s = &self.factors()?.s;
        Ok(s[s.len() - 1] / s[0])
    }

    /// Orthonormal basis of the column space (`m x rank`), `None` when the
    /// rank is zero.
    pub fn range(&self) -> Result<Option<Matrix>> {
        let f = self.factors()?;
        let rank = f.rank();
        if rank == 0 {
            return Ok(None);
        }
        Ok(Some(f.u.get_submatrix(0, 0, f.rows - 1, rank - 1)?))
    }

    /// Orthonormal basis of the null space (`n x nullity`), `None` when the
    /// matrix has full column rank.
    pub fn nullspace(&self) -> Result<Option<Matrix>> {
        let f = self.factors()?;
        let tol = f.threshold();
        let n = f.columns;
        let mut basis: Vec<Vec<f64>> = Vec::new();
        for (j, &sv) in f.s.iter().enumerate() {
            if sv <= tol {
                basis.push((0..n).map(|i| f.v.get(i, j)).collect());
            }
        }
        if f.v.columns() < n {
            let existing: Vec<Vec<f64>> = (0..f.v.columns())
                .map(|j| (0..n).map(|i| f.v.get(i, j)).collect())
                .collect();
            basis.extend(complete_basis(&existing, n));
        }
        if basis.is_empty() {
            return Ok(None);
        }
        let mut out = Matrix::zeros_unchecked(n, basis.len());
        for (j, col) in basis.iter().enumerate() {
            out.set_column(j, col)?;
        }
        Ok(Some(out))
    }

    /// Moore-Penrose pseudo-inverse `V diag(1/s) Uᵗ` (`n x m`), zeroing
    /// singular values below the negligible threshold.
    pub fn pseudo_inverse(&self) -> Result<Matrix> {
        let f = self.factors()?;
        let tol = f.threshold();
        let mut vs = f.v.clone();
        for (j, &sv) in f.s.iter().enumerate() {
            let inv = if sv > tol { 1.0 / sv } else { 0.0 };
            for i in 0..vs.rows() {
                vs[(i, j)] *= inv;
            }
        }
        vs.multiply_and_return_new(&f.u.transpose_and_return_new())
    }

    /// Minimum-norm least-squares solution of `A X = B`.
    pub fn solve(&self, b: &Matrix) -> Result<Matrix> {
        let f = self.factors()?;
        if b.rows() != f.rows {
            return Err(AlgebraError::DimensionMismatch {
                expected: (f.rows, b.columns()),
                got: b.shape(),
            });
        }
        self.pseudo_inverse()?.multiply_and_return_new(b)
    }
}

impl<'a> Decomposer<'a> for SingularValueDecomposer<'a> {
    fn decomposer_type(&self) -> DecomposerType {
        DecomposerType::SingularValueDecomposition
    }

    fn state(&self) -> &DecomposerState<'a> {
        &self.state
    }

    fn set_input_matrix(&mut self, m: &'a Matrix) -> Result<()> {
        self.state.set_input(m)?;
        self.factors = None;
        Ok(())
    }

    fn decompose(&mut self) -> Result<()> {
        let kind = self.decomposer_type();
        let a = self.state.begin(kind)?;
        self.factors = None;
        let outcome = factorize(a, self.max_iterations);
        let factors = self.state.finish(kind, outcome)?;
        self.factors = Some(factors);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Golub–Kahan
// ---------------------------------------------------------------------------

fn factorize(a: &Matrix, max_iterations: usize) -> Result<SvdFactors> {
    let (rows, columns) = a.shape();
    if rows >= columns {
        let (u, s, v) = golub_kahan(a.clone(), max_iterations)?;
        Ok(SvdFactors {
            u,
            s,
            v,
            rows,
            columns,
        })
    } else {
        // Aᵗ = U' S V'ᵗ  =>  A = V' S U'ᵗ
        let (u, s, v) = golub_kahan(a.transpose_and_return_new(), max_iterations)?;
        Ok(SvdFactors {
            u: v,
            s,
            v: u,
            rows,
            columns,
        })
    }
}

/// Next action of the implicit QR iteration on the bidiagonal.
enum Step {
    /// `s[p - 1]` is negligible.
    DeflateLast,
    /// `s[k - 1]` is negligible.
    Split,
    /// One shifted QR sweep.
    QrSweep,
    /// `e[p - 2]` is negligible: `s[p - 1]` converged.
    Converged,
}

fn swap_columns(m: &mut Matrix, a: usize, b: usize) {
    for i in 0..m.rows() {
        let t = m[(i, a)];
        m[(i, a)] = m[(i, b)];
        m[(i, b)] = t;
    }
}

/// Apply the Givens rotation `(cs, sn)` to columns `j` and `k` of `m`.
fn rotate_columns(m: &mut Matrix, j: usize, k: usize, cs: f64, sn: f64) {
    for i in 0..m.rows() {
        let t = cs * m[(i, j)] + sn * m[(i, k)];
        m[(i, k)] = -sn * m[(i, j)] + cs * m[(i, k)];
        m[(i, j)] = t;
    }
}

/// SVD of a tall or square matrix (`m >= n`).
#[allow(
    clippy::too_many_lines,
    clippy::many_single_char_names,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
fn golub_kahan(mut a: Matrix, max_iterations: usize) -> Result<(Matrix, Vec<f64>, Matrix)> {
    let (m, n) = a.shape();
    let mut s = vec![0.0; n];
    let mut e = vec![0.0; n];
    let mut work = vec![0.0; m];
    let mut u = Matrix::zeros_unchecked(m, n);
    let mut v = Matrix::zeros_unchecked(n, n);

    // Reduce A to bidiagonal form, storing the diagonal in s and the
    // super-diagonal in e.
    let nct = (m - 1).min(n);
    let nrt = n.saturating_sub(2).min(m);
    for k in 0..nct.max(nrt) {
        if k < nct {
            let mut norm = (k..m).fold(0.0_f64, |acc, i| acc.hypot(a[(i, k)]));
            if norm != 0.0 {
                if a[(k, k)] < 0.0 {
                    norm = -norm;
                }
                for i in k..m {
                    a[(i, k)] /= norm;
                }
                a[(k, k)] += 1.0;
            }
            s[k] = -norm;
        }
        for j in (k + 1)..n {
            if k < nct && s[k] != 0.0 {
                let mut t = 0.0;
                for i in k..m {
                    t += a[(i, k)] * a[(i, j)];
                }
                t = -t / a[(k, k)];
                for i in k..m {
                    let aik = a[(i, k)];
                    a[(i, j)] += t * aik;
                }
            }
            e[j] = a[(k, j)];
        }
        if k < nct {
            for i in k..m {
                u[(i, k)] = a[(i, k)];
            }
        }
        if k < nrt {
            let mut norm = e[(k + 1)..n].iter().fold(0.0_f64, |acc, &x| acc.hypot(x));
            if norm != 0.0 {
                if e[k + 1] < 0.0 {
                    norm = -norm;
                }
                for x in &mut e[(k + 1)..n] {
                    *x /= norm;
                }
                e[k + 1] += 1.0;
            }
            e[k] = -norm;
            if k + 1 < m && norm != 0.0 {
                work[(k + 1)..m].fill(0.0);
                for j in (k + 1)..n {
                    for i in (k + 1)..m {
                        work[i] += e[j] * a[(i, j)];
                    }
                }
                for j in (k + 1)..n {
                    let t = -e[j] / e[k + 1];
                    for i in (k + 1)..m {
                        a[(i, j)] += t * work[i];
                    }
                }
            }
            for i in (k + 1)..n {
                v[(i, k)] = e[i];
            }
        }
    }

    // Final bidiagonal of order p.
    let mut p = n;
    if nct < n {
        s[nct] = a[(nct, nct)];
    }
    if nrt + 1 < p {
        e[nrt] = a[(nrt, p - 1)];
    }
    e[p - 1] = 0.0;

    // Generate U.
    for j in nct..n {
        for i in 0..m {
            u[(i, j)] = 0.0;
        }
        u[(j, j)] = 1.0;
    }
    for k in (0..nct).rev() {
        if s[k] == 0.0 {
            for i in 0..m {
                u[(i, k)] = 0.0;
            }
            u[(k, k)] = 1.0;
            continue;
        }
        for j in (k + 1)..n {
            let mut t = 0.0;
            for i in k..m {
                t += u[(i, k)] * u[(i, j)];
            }
            t = -t / u[(k, k)];
            for i in k..m {
                let uik = u[(i, k)];
                u[(i, j)] += t * uik;
            }
        }
        for i in k..m {
            u[(i, k)] = -u[(i, k)];
        }
        u[(k, k)] += 1.0;
        for i in 0..k {
            u[(i, k)] = 0.0;
        }
    }

    // Generate V.
    for k in (0..n).rev() {
        if k < nrt && e[k] != 0.0 {
            for j in (k + 1)..n {
                let mut t = 0.0;
                for i in (k + 1)..n {
                    t += v[(i, k)] * v[(i, j)];
                }
                t = -t / v[(k + 1, k)];
                for i in (k + 1)..n {
                    let vik = v[(i, k)];
                    v[(i, j)] += t * vik;
                }
            }
        }
        for i in 0..n {
            v[(i, k)] = 0.0;
        }
        v[(k, k)] = 1.0;
    }

    // Implicit-shift QR on the bidiagonal.
    let pp = p - 1;
    let eps = f64::EPSILON;
    let tiny = 2.0_f64.powi(-966);
    let mut iterations = 0;
    while p > 0 {
        let last = p as isize - 1;

        // k: largest index below p - 1 with a negligible e[k], or -1
        let mut k = last - 1;
        while k >= 0 {
            let ku = k as usize;
            if e[ku].abs() <= tiny + eps * (s[ku].abs() + s[ku + 1].abs()) {
                e[ku] = 0.0;
                break;
            }
            k -= 1;
        }

        let step = if k == last - 1 {
            Step::Converged
        } else {
            let mut ks = last;
            while ks > k {
                let ksu = ks as usize;
                let t = e[ksu].abs() + if ks == k + 1 { 0.0 } else { e[ksu - 1].abs() };
                if s[ksu].abs() <= tiny + eps * t {
                    s[ksu] = 0.0;
                    break;
                }
                ks -= 1;
            }
            if ks == k {
                Step::QrSweep
            } else if ks == last {
                Step::DeflateLast
            } else {
                k = ks;
                Step::Split
            }
        };
        let k = (k + 1) as usize;

        match step {
            Step::DeflateLast => {
                let mut f = e[p - 2];
                e[p - 2] = 0.0;
                for j in (k..=(p - 2)).rev() {
                    let t = s[j].hypot(f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    if j != k {
                        f = -sn * e[j - 1];
                        e[j - 1] *= cs;
                    }
                    rotate_columns(&mut v, j, p - 1, cs, sn);
                }
            }
            Step::Split => {
                let mut f = e[k - 1];
                e[k - 1] = 0.0;
                for j in k..p {
                    let t = s[j].hypot(f);
                    let cs = s[j] / t;
                    let sn = f / t;
                    s[j] = t;
                    f = -sn * e[j];
                    e[j] *= cs;
                    rotate_columns(&mut u, j, k - 1, cs, sn);
                }
            }
            Step::QrSweep => {
                iterations += 1;
                if iterations > max_iterations {
                    log::warn!(
                        target: "densalg",
                        "SVD did not converge after {max_iterations} iterations"
                    );
                    return Err(AlgebraError::NotConverged {
                        iterations: max_iterations,
                    });
                }

                let scale = s[p - 1]
                    .abs()
                    .max(s[p - 2].abs())
                    .max(e[p - 2].abs())
                    .max(s[k].abs())
                    .max(e[k].abs());
                let sp = s[p - 1] / scale;
                let spm1 = s[p - 2] / scale;
                let epm1 = e[p - 2] / scale;
                let sk = s[k] / scale;
                let ek = e[k] / scale;
                let b = ((spm1 + sp) * (spm1 - sp) + epm1 * epm1) / 2.0;
                let c = (sp * epm1) * (sp * epm1);
                let mut shift = 0.0;
                if b != 0.0 || c != 0.0 {
                    shift = (b * b + c).sqrt();
                    if b < 0.0 {
                        shift = -shift;
                    }
                    shift = c / (b + shift);
                }
                let mut f = (sk + sp) * (sk - sp) + shift;
                let mut g = sk * ek;

                // chase the bulge
                for j in k..(p - 1) {
                    let t = f.hypot(g);
                    let cs = f / t;
                    let sn = g / t;
                    if j != k {
                        e[j - 1] = t;
                    }
                    f = cs * s[j] + sn * e[j];
                    e[j] = cs * e[j] - sn * s[j];
                    g = sn * s[j + 1];
                    s[j + 1] *= cs;
                    rotate_columns(&mut v, j, j + 1, cs, sn);

                    let t = f.hypot(g);
                    let cs = f / t;
                    let sn = g / t;
                    s[j] = t;
                    f = cs * e[j] + sn * s[j + 1];
                    s[j + 1] = -sn * e[j] + cs * s[j + 1];
                    g = sn * e[j + 1];
                    e[j + 1] *= cs;
                    rotate_columns(&mut u, j, j + 1, cs, sn);
                }
                e[p - 2] = f;
            }
            Step::Converged => {
                // make the singular value non-negative
                if s[k] <= 0.0 {
                    s[k] = if s[k] < 0.0 { -s[k] } else { 0.0 };
                    for i in 0..=pp {
                        v[(i, k)] = -v[(i, k)];
                    }
                }
                // bubble it into descending order
                let mut k = k;
                while k < pp && s[k] < s[k + 1] {
                    s.swap(k, k + 1);
                    swap_columns(&mut v, k, k + 1);
                    swap_columns(&mut u, k, k + 1);
                    k += 1;
                }
                iterations = 0;
                p -= 1;
            }
        }
    }

    Ok((u, s, v))
}

/// Extend the orthonormal columns `existing` (each of length `n`) to a basis
/// of `Rⁿ`, returning only the new vectors.
///
/// Gram-Schmidt (applied twice) over the canonical basis vectors, skipping
/// candidates that are numerically inside the current span.
fn complete_basis(existing: &[Vec<f64>], n: usize) -> Vec<Vec<f64>> {
    let needed = n - existing.len();
    let mut basis: Vec<Vec<f64>> = existing.to_vec();
    let mut added = Vec::with_capacity(needed);
    for j in 0..n {
        if added.len() == needed {
            break;
        }
        let mut w = vec![0.0; n];
        w[j] = 1.0;
        for _ in 0..2 {
            for b in &basis {
                let dot: f64 = w.iter().zip(b).map(|(x, y)| x * y).sum();
                for (x, y) in w.iter_mut().zip(b) {
                    *x -= dot * y;
                }
            }
        }
        let norm = w.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 1e-8 {
            for x in &mut w {
                *x /= norm;
            }
            basis.push(w.clone());
            added.push(w);
        }
    }
    added
}
