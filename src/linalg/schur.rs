use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::linalg::hessenberg::hessenberg;
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::DynMatrix;

#[inline]
fn g<T: Copy>(m: &impl MatrixRef<T>, i: usize, j: usize) -> T {
    *m.get(i, j)
}

/// Francis double-shift QR iteration on an upper Hessenberg matrix.
///
/// Transforms `h` to real Schur form (quasi-upper-triangular) in place and
/// accumulates the orthogonal similarity into `q`. Real eigenvalues end up
/// in 1×1 diagonal blocks or in 2×2 blocks that [`split_real_blocks`]
/// separates afterwards; complex conjugate pairs stay in 2×2 blocks.
/// Returns the number of sweeps performed.
pub fn francis_qr<T: FloatScalar>(
    h: &mut impl MatrixMut<T>,
    q: &mut impl MatrixMut<T>,
    max_iter: usize,
) -> Result<usize> {
    let n = h.nrows();
    if n <= 1 {
        return Ok(0);
    }

    let eps = T::epsilon();
    let mut iter = 0usize;
    let mut p = n; // active block is h[0..p, 0..p]

    while p > 2 {
        let tol = eps * (g(h, p - 2, p - 2).abs() + g(h, p - 1, p - 1).abs());
        if g(h, p - 1, p - 2).abs() <= tol {
            *h.get_mut(p - 1, p - 2) = T::zero();
            p -= 1;
            continue;
        }

        let tol2 = eps * (g(h, p - 3, p - 3).abs() + g(h, p - 2, p - 2).abs());
        if g(h, p - 2, p - 3).abs() <= tol2 {
            *h.get_mut(p - 2, p - 3) = T::zero();
            p -= 2;
            continue;
        }

        iter += 1;
        if iter > max_iter {
            return Err(Error::ConvergenceFailure);
        }

        // Start of the unreduced block
        let mut lo = p - 1;
        while lo > 0 {
            let tol_q = eps * (g(h, lo - 1, lo - 1).abs() + g(h, lo, lo).abs());
            if g(h, lo, lo - 1).abs() <= tol_q {
                *h.get_mut(lo, lo - 1) = T::zero();
                break;
            }
            lo -= 1;
        }

        // Exceptional shift every 10 sweeps, Francis double shift otherwise
        let (s, t) = if iter % 10 == 0 {
            let w = g(h, p - 1, p - 2).abs() + g(h, p - 2, p - 3).abs();
            (w + w, w * w)
        } else {
            let a11 = g(h, p - 2, p - 2);
            let a12 = g(h, p - 2, p - 1);
            let a21 = g(h, p - 1, p - 2);
            let a22 = g(h, p - 1, p - 1);
            (a11 + a22, a11 * a22 - a12 * a21)
        };

        // First column of H² − s·H + t·I
        let h00 = g(h, lo, lo);
        let h10 = g(h, lo + 1, lo);
        let h01 = g(h, lo, lo + 1);
        let h11 = g(h, lo + 1, lo + 1);

        let mut x = h00 * h00 + h01 * h10 - s * h00 + t;
        let mut y = h10 * (h00 + h11 - s);
        let mut z = if lo + 2 < p {
            h10 * g(h, lo + 2, lo + 1)
        } else {
            T::zero()
        };

        // Chase the bulge down the diagonal
        for k in lo..(p - 1) {
            let use3 = k + 2 < p;
            let (v1, v2, tau) = if use3 {
                householder3(x, y, z)
            } else {
                let (v1h, tau_h) = householder2(x, y);
                (v1h, T::zero(), tau_h)
            };

            let col_start = if k > lo { k - 1 } else { k };
            for j in col_start..n {
                let mut dot = g(h, k, j) + v1 * g(h, k + 1, j);
                if use3 {
                    dot = dot + v2 * g(h, k + 2, j);
                }
                dot = tau * dot;
                *h.get_mut(k, j) = g(h, k, j) - dot;
                *h.get_mut(k + 1, j) = g(h, k + 1, j) - dot * v1;
                if use3 {
                    *h.get_mut(k + 2, j) = g(h, k + 2, j) - dot * v2;
                }
            }

            let row_end = if use3 { (k + 4).min(p) } else { p };
            for i in 0..row_end {
                let mut dot = g(h, i, k) + v1 * g(h, i, k + 1);
                if use3 {
                    dot = dot + v2 * g(h, i, k + 2);
                }
                dot = tau * dot;
                *h.get_mut(i, k) = g(h, i, k) - dot;
                *h.get_mut(i, k + 1) = g(h, i, k + 1) - dot * v1;
                if use3 {
                    *h.get_mut(i, k + 2) = g(h, i, k + 2) - dot * v2;
                }
            }

            for i in 0..n {
                let mut dot = g(q, i, k) + v1 * g(q, i, k + 1);
                if use3 {
                    dot = dot + v2 * g(q, i, k + 2);
                }
                dot = tau * dot;
                *q.get_mut(i, k) = g(q, i, k) - dot;
                *q.get_mut(i, k + 1) = g(q, i, k + 1) - dot * v1;
                if use3 {
                    *q.get_mut(i, k + 2) = g(q, i, k + 2) - dot * v2;
                }
            }

            // Next bulge from the fill-in of column k
            if k + 2 < p - 1 {
                x = g(h, k + 1, k);
                y = g(h, k + 2, k);
                z = g(h, k + 3, k);
            } else if k + 1 < p - 1 {
                x = g(h, k + 1, k);
                y = g(h, k + 2, k);
                z = T::zero();
            }
        }

        // Clean up below the sub-diagonal
        for i in 0..n {
            for j in 0..i.saturating_sub(1) {
                if g(h, i, j).abs() < eps * (g(h, i, i).abs() + g(h, j, j).abs()) {
                    *h.get_mut(i, j) = T::zero();
                }
            }
        }
    }

    if p == 2 {
        let tol = eps * (g(h, 0, 0).abs() + g(h, 1, 1).abs());
        if g(h, 1, 0).abs() <= tol {
            *h.get_mut(1, 0) = T::zero();
        }
    }

    Ok(iter)
}

/// 3-element Householder reflector `(v1, v2, tau)` with `v0 = 1`.
#[inline]
fn householder3<T: FloatScalar>(x: T, y: T, z: T) -> (T, T, T) {
    let norm = (x * x + y * y + z * z).sqrt();
    if norm <= T::epsilon() {
        return (T::zero(), T::zero(), T::zero());
    }
    let u0 = x + norm.copysign(x);
    let v1 = y / u0;
    let v2 = z / u0;
    (v1, v2, T::lit(2.0) / (T::one() + v1 * v1 + v2 * v2))
}

/// 2-element Householder reflector `(v1, tau)` with `v0 = 1`.
#[inline]
fn householder2<T: FloatScalar>(x: T, y: T) -> (T, T) {
    let norm = x.hypot(y);
    if norm <= T::epsilon() {
        return (T::zero(), T::zero());
    }
    let u0 = x + norm.copysign(x);
    let v1 = y / u0;
    (v1, T::lit(2.0) / (T::one() + v1 * v1))
}

/// Rotate every 2×2 diagonal block of `s` whose eigenvalues are real into
/// upper-triangular form, updating `q` to keep `A = Q·S·Qᵀ`.
///
/// Afterwards the only remaining 2×2 blocks carry complex pairs.
pub fn split_real_blocks<T: FloatScalar>(s: &mut impl MatrixMut<T>, q: &mut impl MatrixMut<T>) {
    let n = s.nrows();
    let mut i = 0;
    while i + 1 < n {
        if g(s, i + 1, i) == T::zero() {
            i += 1;
            continue;
        }
        let (a, b, c, d) = (g(s, i, i), g(s, i, i + 1), g(s, i + 1, i), g(s, i + 1, i + 1));
        let half = T::lit(0.5);
        let tr = (a + d) * half;
        let disc = tr * tr - (a * d - b * c);
        if disc < T::zero() {
            i += 2;
            continue;
        }

        // Eigenvector (x0, x1) of the block for λ = tr ± √disc
        let lambda = tr + disc.sqrt().copysign(tr - a);
        let (mut x0, mut x1) = (b, lambda - a);
        if x0.hypot(x1) <= T::epsilon() * (a.abs() + d.abs() + b.abs() + c.abs()) {
            x0 = lambda - d;
            x1 = c;
        }
        let r = x0.hypot(x1);
        let (cs, sn) = if r == T::zero() {
            (T::one(), T::zero())
        } else {
            (x0 / r, x1 / r)
        };

        // S ← Gᵀ·S·G, Q ← Q·G with G = [[cs, −sn], [sn, cs]]
        for j in 0..n {
            let si = g(s, i, j);
            let si1 = g(s, i + 1, j);
            *s.get_mut(i, j) = cs * si + sn * si1;
            *s.get_mut(i + 1, j) = cs * si1 - sn * si;
        }
        for row in 0..n {
            let si = g(s, row, i);
            let si1 = g(s, row, i + 1);
            *s.get_mut(row, i) = cs * si + sn * si1;
            *s.get_mut(row, i + 1) = cs * si1 - sn * si;

            let qi = g(q, row, i);
            let qi1 = g(q, row, i + 1);
            *q.get_mut(row, i) = cs * qi + sn * qi1;
            *q.get_mut(row, i + 1) = cs * qi1 - sn * qi;
        }
        *s.get_mut(i + 1, i) = T::zero();
        i += 2;
    }
}

/// Real Schur decomposition `A = Q·S·Qᵀ` of a square matrix.
///
/// `S` is quasi-upper-triangular: 1×1 diagonal blocks hold the real
/// eigenvalues and 2×2 blocks hold complex conjugate pairs.
///
/// ```
/// use geotrf::DynMatrix;
/// use geotrf::linalg::Schur;
///
/// // 90° rotation: eigenvalues ±i
/// let a = DynMatrix::from_rows(2, 2, &[0.0_f64, -1.0, 1.0, 0.0]);
/// let (re, im) = Schur::new(&a).unwrap().eigenvalues();
/// assert!(re[0].abs() < 1e-12);
/// assert!((im[0].abs() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Schur<T> {
    s: DynMatrix<T>,
    q: DynMatrix<T>,
}

impl<T: FloatScalar> Schur<T> {
    pub fn new(a: &DynMatrix<T>) -> Result<Self> {
        a.check_square()?;
        let n = a.nrows();
        let mut s = a.clone();
        let mut q = DynMatrix::eye(n, T::zero());
        if n > 1 {
            hessenberg(&mut s, &mut q);
            let sweeps = francis_qr(&mut s, &mut q, 30 * n)?;
            log::trace!("schur {}x{}: {} QR sweeps", n, n, sweeps);
            split_real_blocks(&mut s, &mut q);
        }
        Ok(Self { s, q })
    }

    /// Quasi-upper-triangular Schur form S.
    pub fn schur_form(&self) -> &DynMatrix<T> {
        &self.s
    }

    /// Orthogonal Schur vectors Q.
    pub fn schur_vectors(&self) -> &DynMatrix<T> {
        &self.q
    }

    /// Eigenvalues as `(real_parts, imaginary_parts)`, in diagonal order.
    /// A conjugate pair is listed with the positive imaginary part first.
    pub fn eigenvalues(&self) -> (Vec<T>, Vec<T>) {
        let n = self.s.nrows();
        let mut re = alloc::vec![T::zero(); n];
        let mut im = alloc::vec![T::zero(); n];

        let mut i = 0;
        while i < n {
            if i + 1 < n && self.s[(i + 1, i)] != T::zero() {
                let a = self.s[(i, i)];
                let b = self.s[(i, i + 1)];
                let c = self.s[(i + 1, i)];
                let d = self.s[(i + 1, i + 1)];
                let tr = (a + d) * T::lit(0.5);
                let disc = tr * tr - (a * d - b * c);
                let sq = (-disc).max(T::zero()).sqrt();
                re[i] = tr;
                re[i + 1] = tr;
                im[i] = sq;
                im[i + 1] = -sq;
                i += 2;
            } else {
                re[i] = self.s[(i, i)];
                i += 1;
            }
        }

        (re, im)
    }

    pub(crate) fn into_parts(self) -> (DynMatrix<T>, DynMatrix<T>) {
        (self.s, self.q)
    }
}
