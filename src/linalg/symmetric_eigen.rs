use crate::error::{Error, Result};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::DynMatrix;

/// Householder tridiagonalization of a symmetric matrix.
///
/// On return `diag[0..n]` holds the diagonal and `off_diag[0..n-1]` the
/// sub-diagonal of `T`, and `q` holds the orthogonal `Q` with
/// `Qᵀ·A·Q = T`. Only the input's lower triangle needs to be meaningful
/// when it is exactly symmetric; `a` itself is not modified.
pub fn tridiagonalize<T: FloatScalar>(
    a: &impl MatrixRef<T>,
    diag: &mut [T],
    off_diag: &mut [T],
    q: &mut impl MatrixMut<T>,
) {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());

    let mut w = DynMatrix::from_fn(n, n, |i, j| *a.get(i, j));

    for i in 0..n {
        for j in 0..n {
            *q.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
        }
    }

    let two = T::lit(2.0);
    let tiny = T::epsilon() * T::epsilon();

    for k in 0..n.saturating_sub(2) {
        let norm_sq = ((k + 1)..n).fold(T::zero(), |acc, i| acc + w[(i, k)] * w[(i, k)]);
        if norm_sq <= tiny {
            off_diag[k] = T::zero();
            continue;
        }

        let wk1k = w[(k + 1, k)];
        let sigma = norm_sq.sqrt().copysign(wk1k);
        let v0 = wk1k + sigma;

        // Householder vector v = [v0, w[k+2.., k]]
        let sub_n = n - k - 1;
        let v: alloc::vec::Vec<T> = (0..sub_n)
            .map(|i| if i == 0 { v0 } else { w[(k + 1 + i, k)] })
            .collect();
        let v_norm_sq = v.iter().fold(T::zero(), |acc, &x| acc + x * x);
        let tau = two / v_norm_sq;

        // p = tau · A_sub · v
        let p: alloc::vec::Vec<T> = (0..sub_n)
            .map(|i| {
                let dot = (0..sub_n).fold(T::zero(), |acc, j| acc + w[(k + 1 + i, k + 1 + j)] * v[j]);
                tau * dot
            })
            .collect();

        // q = p − (tau/2)(vᵀp)·v, then A_sub −= v·qᵀ + q·vᵀ
        let vtp = v.iter().zip(&p).fold(T::zero(), |acc, (&a, &b)| acc + a * b);
        let half = tau / two * vtp;
        let qv: alloc::vec::Vec<T> = p.iter().zip(&v).map(|(&pi, &vi)| pi - half * vi).collect();
        for i in 0..sub_n {
            for j in 0..sub_n {
                let cell = &mut w[(k + 1 + i, k + 1 + j)];
                *cell = *cell - v[i] * qv[j] - qv[i] * v[j];
            }
        }

        off_diag[k] = -sigma;

        // Q = Q · (I − tau·v·vᵀ)
        for row in 0..n {
            let s = tau * (0..sub_n).fold(T::zero(), |acc, j| acc + *q.get(row, k + 1 + j) * v[j]);
            for j in 0..sub_n {
                *q.get_mut(row, k + 1 + j) = *q.get(row, k + 1 + j) - s * v[j];
            }
        }
    }

    for i in 0..n {
        diag[i] = w[(i, i)];
    }
    if n >= 2 {
        off_diag[n - 2] = w[(n - 1, n - 2)];
    }
}

/// Implicit QR iteration with Wilkinson shift on a symmetric tridiagonal
/// matrix, accumulating the Givens rotations into `q`.
///
/// `diag` is overwritten with the eigenvalues sorted ascending; `off_diag`
/// is destroyed. Returns the number of sweeps performed.
pub fn tridiagonal_qr_with_vecs<T: FloatScalar>(
    diag: &mut [T],
    off_diag: &mut [T],
    q: &mut impl MatrixMut<T>,
    max_iter: usize,
) -> Result<usize> {
    let n = diag.len();
    if n <= 1 {
        return Ok(0);
    }

    let eps = T::epsilon();
    let two = T::lit(2.0);
    let mut iter = 0usize;
    let mut hi = n - 1;

    while hi > 0 {
        let mut lo = hi;
        while lo > 0 {
            if off_diag[lo - 1].abs() <= eps * (diag[lo - 1].abs() + diag[lo].abs()) {
                off_diag[lo - 1] = T::zero();
                break;
            }
            lo -= 1;
        }

        if lo == hi {
            hi -= 1;
            continue;
        }

        iter += 1;
        if iter > max_iter {
            return Err(Error::ConvergenceFailure);
        }

        // Wilkinson shift
        let d = (diag[hi - 1] - diag[hi]) / two;
        let e = off_diag[hi - 1];
        let r = d.hypot(e);
        let shift = diag[hi] - e * e / (d + r.copysign(d));

        let mut x = diag[lo] - shift;
        let mut z = off_diag[lo];

        for k in lo..hi {
            let (c, s) = givens(x, z);
            if k > lo {
                off_diag[k - 1] = c * x + s * z;
            }

            // T' = G·T·Gᵀ on rows/cols k, k+1
            let d_k = diag[k];
            let d_k1 = diag[k + 1];
            let e_k = off_diag[k];
            diag[k] = c * c * d_k + two * c * s * e_k + s * s * d_k1;
            diag[k + 1] = s * s * d_k - two * c * s * e_k + c * c * d_k1;
            off_diag[k] = c * s * (d_k1 - d_k) + (c * c - s * s) * e_k;

            if k + 1 < hi {
                let e_next = off_diag[k + 1];
                x = off_diag[k];
                z = s * e_next;
                off_diag[k + 1] = c * e_next;
            }

            for i in 0..q.nrows() {
                let qik = *q.get(i, k);
                let qik1 = *q.get(i, k + 1);
                *q.get_mut(i, k) = c * qik + s * qik1;
                *q.get_mut(i, k + 1) = c * qik1 - s * qik;
            }
        }
    }

    // Ascending, with eigenvector columns following their eigenvalues
    for i in 0..n {
        let mut min_idx = i;
        for j in (i + 1)..n {
            if diag[j] < diag[min_idx] {
                min_idx = j;
            }
        }
        if min_idx != i {
            diag.swap(i, min_idx);
            for row in 0..q.nrows() {
                let tmp = *q.get(row, i);
                *q.get_mut(row, i) = *q.get(row, min_idx);
                *q.get_mut(row, min_idx) = tmp;
            }
        }
    }

    Ok(iter)
}

/// Givens rotation: `(c, s)` with `[c, s; −s, c]·[a; b] = [r; 0]`.
#[inline]
pub(crate) fn givens<T: FloatScalar>(a: T, b: T) -> (T, T) {
    if b == T::zero() {
        (T::one(), T::zero())
    } else if b.abs() > a.abs() {
        let t = a / b;
        let s = T::one() / (T::one() + t * t).sqrt();
        (s * t, s)
    } else {
        let t = b / a;
        let c = T::one() / (T::one() + t * t).sqrt();
        (c, c * t)
    }
}

/// Eigen-decomposition of a symmetric matrix: `values` ascending and the
/// orthonormal eigenvectors as the columns of `vectors`.
pub(crate) fn symmetric_eigen<T: FloatScalar>(
    a: &DynMatrix<T>,
) -> Result<(alloc::vec::Vec<T>, DynMatrix<T>)> {
    let n = a.nrows();
    let mut diag = alloc::vec![T::zero(); n];
    let mut off_diag = alloc::vec![T::zero(); n.saturating_sub(1)];
    let mut q = DynMatrix::zeros(n, n, T::zero());
    tridiagonalize(a, &mut diag, &mut off_diag, &mut q);
    let sweeps = tridiagonal_qr_with_vecs(&mut diag, &mut off_diag, &mut q, 30 * n.max(1))?;
    log::trace!("symmetric eigen {}x{}: {} QR sweeps", n, n, sweeps);
    Ok((diag, q))
}
