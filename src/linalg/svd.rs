use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::linalg::symmetric_eigen::givens;
use crate::linalg::Lu;
use crate::traits::{FloatScalar, MatrixMut};
use crate::{DynMatrix, DynVector, Matrix};

// ── Householder bidiagonalization ───────────────────────────────────

/// Reduce an M×N matrix (M ≥ N) to upper bidiagonal form with Householder
/// reflections.
///
/// On return `diag[0..n]` and `off_diag[0..n-1]` hold the bidiagonal, and
/// `u` (M×M) and `v` (N×N) hold the accumulated reflections, so that
/// `A = U · B · Vᵀ`.
pub(crate) fn bidiagonalize<T: FloatScalar>(
    a: &mut impl MatrixMut<T>,
    diag: &mut [T],
    off_diag: &mut [T],
    u: &mut impl MatrixMut<T>,
    v: &mut impl MatrixMut<T>,
) {
    let m = a.nrows();
    let n = a.ncols();
    debug_assert!(m >= n);

    for i in 0..m {
        for j in 0..m {
            *u.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
        }
    }
    for i in 0..n {
        for j in 0..n {
            *v.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
        }
    }

    let tiny = T::epsilon() * T::epsilon();

    for k in 0..n {
        // ── Left reflection: zero a[k+1:m, k] ──
        let norm_sq = (k..m).fold(T::zero(), |acc, i| acc + *a.get(i, k) * *a.get(i, k));

        if norm_sq > tiny {
            let akk = *a.get(k, k);
            let sigma = norm_sq.sqrt().copysign(akk);
            let v0 = akk + sigma;
            *a.get_mut(k, k) = v0;
            for i in (k + 1)..m {
                *a.get_mut(i, k) = *a.get(i, k) / v0;
            }
            let tau = v0 / sigma;

            // A[k:m, k+1:n] -= tau · v · (vᵀ · A)
            for j in (k + 1)..n {
                let mut dot = *a.get(k, j);
                for i in (k + 1)..m {
                    dot = dot + *a.get(i, k) * *a.get(i, j);
                }
                dot = dot * tau;
                *a.get_mut(k, j) = *a.get(k, j) - dot;
                for i in (k + 1)..m {
                    let vi = *a.get(i, k);
                    *a.get_mut(i, j) = *a.get(i, j) - dot * vi;
                }
            }

            // U = U · (I − tau · v · vᵀ)
            for row in 0..m {
                let mut dot = *u.get(row, k);
                for i in (k + 1)..m {
                    dot = dot + *u.get(row, i) * *a.get(i, k);
                }
                dot = dot * tau;
                *u.get_mut(row, k) = *u.get(row, k) - dot;
                for i in (k + 1)..m {
                    let vi = *a.get(i, k);
                    *u.get_mut(row, i) = *u.get(row, i) - dot * vi;
                }
            }

            diag[k] = -sigma;
        } else {
            diag[k] = *a.get(k, k);
        }

        // ── Right reflection: zero a[k, k+2:n] ──
        if k + 2 < n {
            let norm_sq =
                ((k + 1)..n).fold(T::zero(), |acc, j| acc + *a.get(k, j) * *a.get(k, j));

            if norm_sq > tiny {
                let ak1 = *a.get(k, k + 1);
                let sigma = norm_sq.sqrt().copysign(ak1);
                let v0 = ak1 + sigma;
                *a.get_mut(k, k + 1) = v0;
                for j in (k + 2)..n {
                    *a.get_mut(k, j) = *a.get(k, j) / v0;
                }
                let tau = v0 / sigma;

                for i in (k + 1)..m {
                    let mut dot = *a.get(i, k + 1);
                    for j in (k + 2)..n {
                        dot = dot + *a.get(i, j) * *a.get(k, j);
                    }
                    dot = dot * tau;
                    *a.get_mut(i, k + 1) = *a.get(i, k + 1) - dot;
                    for j in (k + 2)..n {
                        let vj = *a.get(k, j);
                        *a.get_mut(i, j) = *a.get(i, j) - dot * vj;
                    }
                }

                for row in 0..n {
                    let mut dot = *v.get(row, k + 1);
                    for j in (k + 2)..n {
                        dot = dot + *v.get(row, j) * *a.get(k, j);
                    }
                    dot = dot * tau;
                    *v.get_mut(row, k + 1) = *v.get(row, k + 1) - dot;
                    for j in (k + 2)..n {
                        let vj = *a.get(k, j);
                        *v.get_mut(row, j) = *v.get(row, j) - dot * vj;
                    }
                }

                off_diag[k] = -sigma;
            } else {
                off_diag[k] = *a.get(k, k + 1);
            }
        } else if k + 1 < n {
            off_diag[k] = *a.get(k, k + 1);
        }
    }
}

/// Rotate columns `(p, q)` of `m` by the Givens pair `(c, s)`:
/// `col_p ← c·col_p + s·col_q`, `col_q ← c·col_q − s·col_p`.
fn rotate_cols<T: FloatScalar>(m: &mut impl MatrixMut<T>, p: usize, q: usize, c: T, s: T) {
    for row in 0..m.nrows() {
        let mp = *m.get(row, p);
        let mq = *m.get(row, q);
        *m.get_mut(row, p) = c * mp + s * mq;
        *m.get_mut(row, q) = c * mq - s * mp;
    }
}

fn swap_cols<T: FloatScalar>(m: &mut impl MatrixMut<T>, p: usize, q: usize) {
    for row in 0..m.nrows() {
        let tmp = *m.get(row, p);
        *m.get_mut(row, p) = *m.get(row, q);
        *m.get_mut(row, q) = tmp;
    }
}

// ── Golub-Kahan bidiagonal QR ───────────────────────────────────────

/// Golub-Kahan implicit-shift QR iteration on a bidiagonal matrix.
///
/// On return `diag` holds the non-negative singular values sorted
/// descending, `off_diag` is zeroed and the rotations have been
/// accumulated into the columns of `u` and `v`. Returns the number of
/// sweeps performed.
pub(crate) fn bidiagonal_qr<T: FloatScalar>(
    diag: &mut [T],
    off_diag: &mut [T],
    u: &mut impl MatrixMut<T>,
    v: &mut impl MatrixMut<T>,
    max_iter: usize,
) -> Result<usize> {
    let n = diag.len();
    let eps = T::epsilon();
    // Zero test for diagonal entries, relative to the size of the bidiagonal
    let b_norm = (0..n).fold(T::zero(), |m, i| {
        let e = if i < off_diag.len() { off_diag[i].abs() } else { T::zero() };
        m.max(diag[i].abs() + e)
    });
    let zero_tol = eps * b_norm;
    let mut iter = 0usize;
    let mut hi = n.saturating_sub(1);

    while hi > 0 {
        // Deflate a negligible trailing super-diagonal entry
        if off_diag[hi - 1].abs() <= eps * (diag[hi - 1].abs() + diag[hi].abs()) {
            off_diag[hi - 1] = T::zero();
            hi -= 1;
            continue;
        }

        // Start of the unreduced block
        let mut lo = hi - 1;
        while lo > 0 {
            if off_diag[lo - 1].abs() <= eps * (diag[lo - 1].abs() + diag[lo].abs()) {
                off_diag[lo - 1] = T::zero();
                break;
            }
            lo -= 1;
        }

        iter += 1;
        if iter > max_iter {
            return Err(Error::ConvergenceFailure);
        }

        // A zero on the diagonal breaks the shift: chase its row's
        // super-diagonal entry off the bottom with left rotations instead.
        if let Some(idx) = (lo..hi).find(|&i| diag[i].abs() <= zero_tol) {
            diag[idx] = T::zero();
            let mut z = off_diag[idx];
            off_diag[idx] = T::zero();
            for j in (idx + 1)..=hi {
                let (c, s) = givens(diag[j], z);
                diag[j] = c * diag[j] + s * z;
                if j < hi {
                    z = -s * off_diag[j];
                    off_diag[j] = c * off_diag[j];
                }
                rotate_cols(u, j, idx, c, s);
            }
            continue;
        }

        // Wilkinson shift from the trailing 2×2 of BᵀB
        let d_hi = diag[hi];
        let d_hi1 = diag[hi - 1];
        let e_hi1 = off_diag[hi - 1];
        let e_hi2 = if hi >= lo + 2 { off_diag[hi - 2] } else { T::zero() };

        let t11 = d_hi1 * d_hi1 + e_hi2 * e_hi2;
        let t12 = d_hi1 * e_hi1;
        let t22 = d_hi * d_hi + e_hi1 * e_hi1;

        let d = (t11 - t22) / T::lit(2.0);
        let sign_d = if d >= T::zero() { T::one() } else { -T::one() };
        let mu = t22 - t12 * t12 / (d + sign_d * (d * d + t12 * t12).sqrt());

        // Implicit QR chase
        let mut x = diag[lo] * diag[lo] - mu;
        let mut z = diag[lo] * off_diag[lo];

        for k in lo..hi {
            let (c, s) = givens(x, z);
            if k > lo {
                off_diag[k - 1] = c * x + s * z;
            }

            let dk = diag[k];
            let ek = off_diag[k];
            let dk1 = diag[k + 1];
            diag[k] = c * dk + s * ek;
            off_diag[k] = c * ek - s * dk;
            let bulge = s * dk1;
            diag[k + 1] = c * dk1;
            rotate_cols(v, k, k + 1, c, s);

            let (c2, s2) = givens(diag[k], bulge);
            diag[k] = c2 * diag[k] + s2 * bulge;
            let old_ek = off_diag[k];
            let old_dk1 = diag[k + 1];
            off_diag[k] = c2 * old_ek + s2 * old_dk1;
            diag[k + 1] = c2 * old_dk1 - s2 * old_ek;

            if k + 1 < hi {
                let old_ek1 = off_diag[k + 1];
                x = off_diag[k];
                z = s2 * old_ek1;
                off_diag[k + 1] = c2 * old_ek1;
            }
            rotate_cols(u, k, k + 1, c2, s2);
        }
    }

    // Non-negative singular values
    for i in 0..n {
        if diag[i] < T::zero() {
            diag[i] = -diag[i];
            for row in 0..u.nrows() {
                let val = *u.get(row, i);
                *u.get_mut(row, i) = -val;
            }
        }
    }

    // Sort descending, permuting U and V columns alongside
    for i in 0..n {
        let mut max_idx = i;
        for j in (i + 1)..n {
            if diag[j] > diag[max_idx] {
                max_idx = j;
            }
        }
        if max_idx != i {
            diag.swap(i, max_idx);
            swap_cols(u, i, max_idx);
            swap_cols(v, i, max_idx);
        }
    }

    Ok(iter)
}

// ── Svd wrapper ─────────────────────────────────────────────────────

/// Singular value decomposition `A = U · diag(σ) · Vᵀ` of an M×N matrix.
///
/// `U` is M×M, `Vᵀ` is N×N, and the `min(M, N)` singular values are
/// non-negative and sorted descending. Wide matrices are handled by
/// factoring the transpose.
///
/// [`Svd::solve`] returns the minimum-norm least-squares solution. Singular
/// values at or below `max(M, N)·ε·σ_max` are treated as zero; this is a
/// numerical policy, not an error, and it is logged at `warn` level when it
/// kicks in. [`Svd::solve_strict`] turns it into
/// [`Error::RankDeficient`].
///
/// # Example
///
/// ```
/// use geotrf::{DynMatrix, DynVector};
/// use geotrf::linalg::Svd;
///
/// // Over-determined line fit y = a + b·x through four points.
/// let a = DynMatrix::from_rows(4, 2, &[1.0_f64, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0]);
/// let y = DynVector::from_slice(&[1.0, 3.0, 5.0, 7.0]);
/// let x = Svd::new(&a).unwrap().solve(&y).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12);
/// assert!((x[1] - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Svd<T> {
    u: DynMatrix<T>,
    singular_values: Vec<T>,
    vt: DynMatrix<T>,
}

impl<T: FloatScalar> Svd<T> {
    /// Factor a matrix of any shape.
    ///
    /// Fails with [`Error::ConvergenceFailure`] if the bidiagonal QR does
    /// not converge within its iteration budget.
    pub fn new(a: &DynMatrix<T>) -> Result<Self> {
        let (m, n) = a.shape();
        if m < n {
            // Aᵀ = U'·Σ·V'ᵀ  ⇒  A = V'·Σ·U'ᵀ
            let t = Self::new(&a.transpose())?;
            return Ok(Self {
                u: t.vt.transpose(),
                singular_values: t.singular_values,
                vt: t.u.transpose(),
            });
        }

        let mut work = a.clone();
        let mut u = DynMatrix::zeros(m, m, T::zero());
        let mut v = DynMatrix::zeros(n, n, T::zero());
        let mut diag = alloc::vec![T::zero(); n];
        let mut off_diag = alloc::vec![T::zero(); n.saturating_sub(1)];

        bidiagonalize(&mut work, &mut diag, &mut off_diag, &mut u, &mut v);
        let sweeps = bidiagonal_qr(&mut diag, &mut off_diag, &mut u, &mut v, 30 * m.max(n))?;
        log::trace!("svd {}x{}: {} QR sweeps", m, n, sweeps);

        Ok(Self {
            u,
            singular_values: diag,
            vt: v.transpose(),
        })
    }

    /// Left singular vectors U (M×M).
    pub fn u(&self) -> &DynMatrix<T> {
        &self.u
    }

    /// Singular values, sorted descending.
    pub fn singular_values(&self) -> &[T] {
        &self.singular_values
    }

    /// Right singular vectors as rows of Vᵀ (N×N).
    pub fn vt(&self) -> &DynMatrix<T> {
        &self.vt
    }

    pub fn nrows(&self) -> usize {
        self.u.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.vt.nrows()
    }

    fn sigma_max(&self) -> T {
        self.singular_values.first().copied().unwrap_or_else(T::zero)
    }

    /// Default relative cutoff `max(M, N)·ε`.
    pub fn default_tolerance(&self) -> T {
        T::from_usize(self.nrows().max(self.ncols())) * T::epsilon()
    }

    /// Numerical rank: singular values above `rel_tol·σ_max`.
    pub fn rank(&self, rel_tol: T) -> usize {
        let cutoff = rel_tol * self.sigma_max();
        self.singular_values.iter().filter(|&&s| s > cutoff).count()
    }

    /// Condition number `σ_max / σ_min`, infinite when `σ_min` is zero.
    pub fn condition_number(&self) -> T {
        match self.singular_values.last() {
            None => T::one(),
            Some(&s_min) if s_min == T::zero() => T::infinity(),
            Some(&s_min) => self.sigma_max() / s_min,
        }
    }

    /// `V · diag(σ⁺) · Uᵀ · B` for every column of `b`, flooring singular
    /// values at or below `rel_tol·σ_max`. Returns the solution and the
    /// number of singular values kept.
    fn pinv_apply(&self, b: &DynMatrix<T>, rel_tol: T) -> Result<(DynMatrix<T>, usize)> {
        if b.nrows() != self.nrows() {
            return Err(Error::DimensionMismatch {
                expected: (self.nrows(), b.ncols()),
                got: b.shape(),
            });
        }
        Ok(self.pinv_columns(b, rel_tol))
    }

    /// Core of [`pinv_apply`](Self::pinv_apply); `b` must have `nrows()` rows.
    fn pinv_columns(&self, b: &DynMatrix<T>, rel_tol: T) -> (DynMatrix<T>, usize) {
        let (m, n) = (self.nrows(), self.ncols());
        debug_assert_eq!(b.nrows(), m);
        let cutoff = rel_tol * self.sigma_max();
        let kept = self.rank(rel_tol);

        let mut x = DynMatrix::zeros(n, b.ncols(), T::zero());
        for col in 0..b.ncols() {
            for (k, &s) in self.singular_values.iter().enumerate() {
                if !(s > cutoff) {
                    continue;
                }
                // (u_kᵀ · b) / σ_k
                let mut coef = T::zero();
                for i in 0..m {
                    coef = coef + self.u[(i, k)] * b[(i, col)];
                }
                coef = coef / s;
                for j in 0..n {
                    x[(j, col)] = x[(j, col)] + coef * self.vt[(k, j)];
                }
            }
        }
        (x, kept)
    }

    fn warn_if_floored(&self, kept: usize) {
        let full = self.singular_values.len();
        if kept < full {
            log::warn!(
                "svd solve: {} of {} singular values floored to zero, returning minimum-norm solution",
                full - kept,
                full
            );
        }
    }

    /// Minimum-norm least-squares solution of `A·x ≈ b`.
    pub fn solve(&self, b: &DynVector<T>) -> Result<DynVector<T>> {
        self.solve_with_tolerance(b, self.default_tolerance())
    }

    /// [`solve`](Self::solve) with an explicit relative cutoff.
    pub fn solve_with_tolerance(&self, b: &DynVector<T>, rel_tol: T) -> Result<DynVector<T>> {
        let x = self.solve_matrix_with_tolerance(&b.to_column(), rel_tol)?;
        Ok(x.col(0))
    }

    /// Like [`solve_with_tolerance`](Self::solve_with_tolerance), but a
    /// rank-deficient system is an error instead of being floored.
    pub fn solve_strict(&self, b: &DynVector<T>, rel_tol: T) -> Result<DynVector<T>> {
        let required = self.singular_values.len();
        let rank = self.rank(rel_tol);
        if rank < required {
            return Err(Error::RankDeficient { rank, required });
        }
        self.solve_with_tolerance(b, rel_tol)
    }

    /// Minimum-norm least-squares solution for every column of `b`.
    pub fn solve_matrix(&self, b: &DynMatrix<T>) -> Result<DynMatrix<T>> {
        self.solve_matrix_with_tolerance(b, self.default_tolerance())
    }

    /// [`solve_matrix`](Self::solve_matrix) with an explicit relative cutoff.
    pub fn solve_matrix_with_tolerance(&self, b: &DynMatrix<T>, rel_tol: T) -> Result<DynMatrix<T>> {
        let (x, kept) = self.pinv_apply(b, rel_tol)?;
        self.warn_if_floored(kept);
        Ok(x)
    }

    /// Moore-Penrose pseudo-inverse (N×M).
    pub fn pseudo_inverse(&self) -> DynMatrix<T> {
        let m = self.nrows();
        let id = DynMatrix::eye(m, T::zero());
        self.pinv_columns(&id, self.default_tolerance()).0
    }

    fn check_square(&self) -> Result<()> {
        if self.nrows() != self.ncols() {
            return Err(Error::DimensionMismatch {
                expected: (self.nrows(), self.nrows()),
                got: (self.nrows(), self.ncols()),
            });
        }
        Ok(())
    }

    /// Inverse of a square matrix. Fails with [`Error::SingularMatrix`]
    /// when any singular value falls under the default cutoff.
    pub fn inverse(&self) -> Result<DynMatrix<T>> {
        self.check_square()?;
        let tol = self.default_tolerance();
        if self.rank(tol) < self.ncols() {
            return Err(Error::SingularMatrix);
        }
        let id = DynMatrix::eye(self.nrows(), T::zero());
        Ok(self.pinv_apply(&id, tol)?.0)
    }

    /// Determinant of a square matrix: `det(U)·det(Vᵀ)·Πσ`.
    pub fn det(&self) -> Result<T> {
        self.check_square()?;
        let magnitude = self.singular_values.iter().fold(T::one(), |acc, &s| acc * s);
        if self.nrows() == 0 {
            return Ok(T::one());
        }
        let sign_u = Lu::new(&self.u)?.det().signum();
        let sign_v = Lu::new(&self.vt)?.det().signum();
        Ok(sign_u * sign_v * magnitude)
    }
}

impl<T: FloatScalar, const M: usize, const N: usize> Matrix<T, M, N> {
    /// Singular value decomposition, computed by the dynamic-size core.
    ///
    /// ```
    /// use geotrf::Matrix;
    /// let a = Matrix::new([[3.0_f64, 0.0], [0.0, 4.0], [0.0, 0.0]]);
    /// let svd = a.svd().unwrap();
    /// assert!((svd.singular_values()[0] - 4.0).abs() < 1e-12);
    /// assert!((svd.singular_values()[1] - 3.0).abs() < 1e-12);
    /// ```
    pub fn svd(&self) -> Result<Svd<T>> {
        Svd::new(&DynMatrix::from(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    fn reconstruct(svd: &Svd<f64>) -> DynMatrix<f64> {
        let (m, n) = (svd.nrows(), svd.ncols());
        let mut sigma = DynMatrix::zeros(m, n, 0.0);
        for (k, &s) in svd.singular_values().iter().enumerate() {
            sigma[(k, k)] = s;
        }
        let us = (svd.u() * &sigma).unwrap();
        (&us * svd.vt()).unwrap()
    }

    fn is_orthonormal(q: &DynMatrix<f64>) -> bool {
        let qtq = (&q.transpose() * q).unwrap();
        qtq.max_abs_diff(&DynMatrix::eye(q.nrows(), 0.0)).unwrap() < TOL
    }

    #[test]
    fn tall_reconstruct() {
        let a = DynMatrix::from_rows(
            4,
            3,
            &[2.0_f64, -1.0, 0.5, 1.0, 3.0, -2.0, 0.0, 1.0, 4.0, -1.5, 2.0, 1.0],
        );
        let svd = Svd::new(&a).unwrap();
        assert!(reconstruct(&svd).max_abs_diff(&a).unwrap() < TOL);
        assert!(is_orthonormal(svd.u()));
        assert!(is_orthonormal(svd.vt()));
        let s = svd.singular_values();
        assert!(s[0] >= s[1] && s[1] >= s[2] && s[2] >= 0.0);
    }

    #[test]
    fn wide_reconstruct() {
        let a = DynMatrix::from_rows(2, 3, &[3.0_f64, 2.0, 2.0, 2.0, 3.0, -2.0]);
        let svd = Svd::new(&a).unwrap();
        assert_eq!(svd.u().shape(), (2, 2));
        assert_eq!(svd.vt().shape(), (3, 3));
        assert!((svd.singular_values()[0] - 5.0).abs() < TOL);
        assert!((svd.singular_values()[1] - 3.0).abs() < TOL);
        assert!(reconstruct(&svd).max_abs_diff(&a).unwrap() < TOL);
    }

    #[test]
    fn inverse_and_det_match_lu() {
        let a = DynMatrix::from_rows(3, 3, &[6.0_f64, 1.0, 1.0, 4.0, -2.0, 5.0, 2.0, 8.0, 7.0]);
        let svd = Svd::new(&a).unwrap();
        let id = (&a * &svd.inverse().unwrap()).unwrap();
        assert!(id.max_abs_diff(&DynMatrix::eye(3, 0.0)).unwrap() < TOL);
        assert!((svd.det().unwrap() - (-306.0)).abs() < 1e-8);
    }

    #[test]
    fn tiny_scale_is_not_singular() {
        let a = DynMatrix::from_rows(2, 2, &[1e-20_f64, 1e-20, 0.0, 1e-20]);
        let svd = Svd::new(&a).unwrap();
        let golden = (1.0 + 5.0_f64.sqrt()) / 2.0;
        let s = svd.singular_values();
        assert!((s[0] * 1e20 - golden).abs() < 1e-12);
        assert!((s[1] * 1e20 - 1.0 / golden).abs() < 1e-12);
        assert_eq!(svd.rank(svd.default_tolerance()), 2);

        let id = (&a * &svd.inverse().unwrap()).unwrap();
        assert!(id.max_abs_diff(&DynMatrix::eye(2, 0.0)).unwrap() < TOL);
        let lu_id = (&a * &Lu::new(&a).unwrap().inverse()).unwrap();
        assert!(lu_id.max_abs_diff(&id).unwrap() < TOL);
    }

    #[test]
    fn rank_deficient_minimum_norm() {
        // Rank 1: every row is a multiple of (1, 1).
        let a = DynMatrix::from_rows(3, 2, &[1.0_f64, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let b = DynVector::from_slice(&[2.0_f64, 4.0, 6.0]);
        let svd = Svd::new(&a).unwrap();
        assert_eq!(svd.rank(svd.default_tolerance()), 1);

        // x0 + x1 = 2 with the smallest norm is (1, 1).
        let x = svd.solve(&b).unwrap();
        assert!((x[0] - 1.0).abs() < TOL);
        assert!((x[1] - 1.0).abs() < TOL);

        assert_eq!(
            svd.solve_strict(&b, svd.default_tolerance()).unwrap_err(),
            Error::RankDeficient {
                rank: 1,
                required: 2
            }
        );
        assert_eq!(svd.inverse().unwrap_err(), Error::DimensionMismatch {
            expected: (3, 3),
            got: (3, 2)
        });
        assert!(svd.condition_number() > 1e12);
    }

    #[test]
    fn singular_square_inverse_fails() {
        let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
        let svd = Svd::new(&a).unwrap();
        assert_eq!(svd.inverse().unwrap_err(), Error::SingularMatrix);
        assert!(svd.det().unwrap().abs() < 1e-12);
    }

    #[test]
    fn pseudo_inverse_of_tall() {
        let a = DynMatrix::from_rows(3, 2, &[1.0_f64, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let pinv = Svd::new(&a).unwrap().pseudo_inverse();
        assert_eq!(pinv.shape(), (2, 3));
        // A⁺·A = I for full column rank
        let id = (&pinv * &a).unwrap();
        assert!(id.max_abs_diff(&DynMatrix::eye(2, 0.0)).unwrap() < TOL);
    }

    #[test]
    fn solve_shape_error() {
        let svd = Svd::new(&DynMatrix::eye(3, 0.0_f64)).unwrap();
        assert!(matches!(
            svd.solve(&DynVector::zeros(2, 0.0)),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
