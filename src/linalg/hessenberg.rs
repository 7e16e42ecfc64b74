use crate::traits::{FloatScalar, MatrixMut};

/// Reduce a square matrix to upper Hessenberg form via Householder similarity
/// transforms: `Qᵀ·A·Q = H`.
///
/// On return `a` holds H and `q` the accumulated orthogonal Q.
pub fn hessenberg<T: FloatScalar>(a: &mut impl MatrixMut<T>, q: &mut impl MatrixMut<T>) {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());
    debug_assert_eq!((q.nrows(), q.ncols()), (n, n));

    for i in 0..n {
        for j in 0..n {
            *q.get_mut(i, j) = if i == j { T::one() } else { T::zero() };
        }
    }

    for k in 0..n.saturating_sub(2) {
        let norm_sq = a
            .col_as_slice(k, k + 1)
            .iter()
            .fold(T::zero(), |acc, &v| acc + v * v);
        if norm_sq <= T::epsilon() * T::epsilon() {
            continue;
        }

        let ak1k = *a.get(k + 1, k);
        let sigma = norm_sq.sqrt().copysign(ak1k);
        let v0 = ak1k + sigma;

        // Normalized reflector in a[k+2:n, k], v[0] = 1 implicit
        for x in a.col_as_mut_slice(k, k + 2).iter_mut() {
            *x = *x / v0;
        }
        let tau = v0 / sigma;

        // Left: A[k+1:n, k+1:n] = (I − tau·v·vᵀ)·A[k+1:n, k+1:n]
        for j in (k + 1)..n {
            let mut dot = *a.get(k + 1, j);
            for i in (k + 2)..n {
                dot = dot + *a.get(i, k) * *a.get(i, j);
            }
            dot = dot * tau;
            *a.get_mut(k + 1, j) = *a.get(k + 1, j) - dot;
            for i in (k + 2)..n {
                let vi = *a.get(i, k);
                *a.get_mut(i, j) = *a.get(i, j) - dot * vi;
            }
        }

        // Right: A[0:n, k+1:n] = A[0:n, k+1:n]·(I − tau·v·vᵀ)
        for i in 0..n {
            let mut dot = *a.get(i, k + 1);
            for jj in (k + 2)..n {
                dot = dot + *a.get(i, jj) * *a.get(jj, k);
            }
            dot = dot * tau;
            *a.get_mut(i, k + 1) = *a.get(i, k + 1) - dot;
            for jj in (k + 2)..n {
                let vj = *a.get(jj, k);
                *a.get_mut(i, jj) = *a.get(i, jj) - dot * vj;
            }
        }

        // Q = Q·(I − tau·v·vᵀ)
        for i in 0..n {
            let mut dot = *q.get(i, k + 1);
            for jj in (k + 2)..n {
                dot = dot + *q.get(i, jj) * *a.get(jj, k);
            }
            dot = dot * tau;
            *q.get_mut(i, k + 1) = *q.get(i, k + 1) - dot;
            for jj in (k + 2)..n {
                let vj = *a.get(jj, k);
                *q.get_mut(i, jj) = *q.get(i, jj) - dot * vj;
            }
        }

        *a.get_mut(k + 1, k) = -sigma;
        for i in (k + 2)..n {
            *a.get_mut(i, k) = T::zero();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Matrix;

    const TOL: f64 = 1e-10;

    fn check<const N: usize>(orig: Matrix<f64, N, N>) {
        let mut h = orig;
        let mut q = Matrix::<f64, N, N>::zeros();
        hessenberg(&mut h, &mut q);

        for i in 0..N {
            for j in 0..i.saturating_sub(1) {
                assert!(h[(i, j)].abs() < TOL, "H[({},{})] = {}", i, j, h[(i, j)]);
            }
        }
        let qtaq = q.transpose() * orig * q;
        assert!(qtaq.max_abs_diff(&h) < TOL);
        assert!(q.is_orthonormal(TOL));
    }

    #[test]
    fn hessenberg_3x3() {
        check(Matrix::new([[4.0, 1.0, -2.0], [1.0, 2.0, 0.0], [-2.0, 0.0, 3.0]]));
    }

    #[test]
    fn hessenberg_4x4() {
        check(Matrix::new([
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ]));
    }

    #[test]
    fn already_upper_triangular() {
        check(Matrix::new([[1.0, 2.0, 3.0], [0.0, 4.0, 5.0], [0.0, 0.0, 6.0]]));
    }
}
