use alloc::vec::Vec;

use num_complex::Complex;

use crate::error::{Error, Result};
use crate::linalg::schur::Schur;
use crate::linalg::symmetric_eigen::symmetric_eigen;
use crate::linalg::Lu;
use crate::traits::FloatScalar;
use crate::{DynMatrix, DynVector, Matrix};

/// Eigen-decomposition of a real square matrix.
///
/// Eigenvalues come as separate real and imaginary vectors. The eigenvector
/// matrix `V` satisfies `A·V = V·D`, where `D` is block diagonal:
///
/// - a real eigenvalue `λₖ` gives a 1×1 block, and column `k` of `V` is its
///   unit-norm eigenvector;
/// - a conjugate pair `a ± ib` (listed with `+b` first, at `k` and `k+1`)
///   gives the block `[[a, b], [−b, a]]`, and columns `k` and `k+1` are the
///   real and imaginary parts of the unit-norm complex eigenvector for
///   `a + ib`.
///
/// Symmetric inputs go through tridiagonal QR and come out with real,
/// ascending eigenvalues and orthonormal eigenvectors. General inputs go
/// through Hessenberg reduction, Francis QR and back-substitution on the
/// Schur form; their order follows the Schur diagonal and is not sorted.
/// Use [`Eigen::sorted_ascending`] when a stable order matters.
///
/// # Example
///
/// ```
/// use geotrf::DynMatrix;
/// use geotrf::linalg::Eigen;
///
/// let cov = DynMatrix::from_rows(2, 2, &[2.0_f64, 1.0, 1.0, 2.0]);
/// let eig = Eigen::new(&cov).unwrap();
/// assert!(eig.is_symmetric());
/// assert!((eig.eigenvalues_real()[0] - 1.0).abs() < 1e-12);
/// assert!((eig.eigenvalues_real()[1] - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Eigen<T> {
    re: Vec<T>,
    im: Vec<T>,
    vectors: DynMatrix<T>,
    symmetric: bool,
}

impl<T: FloatScalar> Eigen<T> {
    /// Decompose, choosing the symmetric path when `a` equals its transpose
    /// to within `n·ε` relative to its largest element.
    pub fn new(a: &DynMatrix<T>) -> Result<Self> {
        a.check_square()?;
        let tol = T::from_usize(a.nrows().max(1)) * T::epsilon();
        if a.is_symmetric(tol) {
            Self::symmetric(a)
        } else {
            Self::general(a)
        }
    }

    /// Symmetric path. Only meaningful for symmetric input; the strictly
    /// upper triangle is ignored.
    pub fn symmetric(a: &DynMatrix<T>) -> Result<Self> {
        a.check_square()?;
        let n = a.nrows();
        // Mirror the lower triangle so the reduction sees an exactly symmetric matrix.
        let sym = DynMatrix::from_fn(n, n, |i, j| if i >= j { a[(i, j)] } else { a[(j, i)] });
        let (re, vectors) = symmetric_eigen(&sym)?;
        Ok(Self {
            im: alloc::vec![T::zero(); n],
            re,
            vectors,
            symmetric: true,
        })
    }

    /// General (non-symmetric) path.
    pub fn general(a: &DynMatrix<T>) -> Result<Self> {
        let schur = Schur::new(a)?;
        let (re, im) = schur.eigenvalues();
        let (s, q) = schur.into_parts();
        let vectors = schur_eigenvectors(&s, &q, &re, &im);
        Ok(Self {
            re,
            im,
            vectors,
            symmetric: false,
        })
    }

    /// Whether the symmetric path was taken.
    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    pub fn dim(&self) -> usize {
        self.re.len()
    }

    /// Real parts of the eigenvalues.
    pub fn eigenvalues_real(&self) -> &[T] {
        &self.re
    }

    /// Imaginary parts of the eigenvalues.
    pub fn eigenvalues_imag(&self) -> &[T] {
        &self.im
    }

    /// Eigenvalue `k` as a complex number.
    pub fn eigenvalue(&self, k: usize) -> Complex<T> {
        Complex::new(self.re[k], self.im[k])
    }

    /// Real eigenvector matrix in the block layout described on [`Eigen`].
    pub fn eigenvectors(&self) -> &DynMatrix<T> {
        &self.vectors
    }

    /// Complex eigenvector for eigenvalue `k`, unit norm.
    pub fn eigenvector(&self, k: usize) -> Vec<Complex<T>> {
        let n = self.dim();
        let v = &self.vectors;
        if self.im[k] == T::zero() {
            (0..n).map(|i| Complex::new(v[(i, k)], T::zero())).collect()
        } else if self.im[k] > T::zero() {
            (0..n).map(|i| Complex::new(v[(i, k)], v[(i, k + 1)])).collect()
        } else {
            (0..n).map(|i| Complex::new(v[(i, k - 1)], -v[(i, k)])).collect()
        }
    }

    /// Eigenpairs sorted by real part, then imaginary part.
    pub fn sorted_ascending(&self) -> Vec<(Complex<T>, Vec<Complex<T>>)> {
        let mut pairs: Vec<_> = (0..self.dim())
            .map(|k| (self.eigenvalue(k), self.eigenvector(k)))
            .collect();
        pairs.sort_by(|a, b| {
            a.0.re
                .partial_cmp(&b.0.re)
                .unwrap_or(core::cmp::Ordering::Equal)
                .then(a.0.im.partial_cmp(&b.0.im).unwrap_or(core::cmp::Ordering::Equal))
        });
        pairs
    }

    /// Determinant: the product of the eigenvalues.
    pub fn det(&self) -> T {
        (0..self.dim())
            .fold(Complex::new(T::one(), T::zero()), |acc, k| acc * self.eigenvalue(k))
            .re
    }

    /// The block-diagonal `D` with `A·V = V·D`.
    fn block_diagonal(&self) -> DynMatrix<T> {
        let n = self.dim();
        let mut d = DynMatrix::zeros(n, n, T::zero());
        for k in 0..n {
            d[(k, k)] = self.re[k];
            if self.im[k] > T::zero() {
                d[(k, k + 1)] = self.im[k];
            } else if self.im[k] < T::zero() {
                d[(k, k - 1)] = self.im[k];
            }
        }
        d
    }

    /// Inverse `V·D⁻¹·V⁻¹`.
    ///
    /// Fails with [`Error::SingularMatrix`] when an eigenvalue is zero
    /// (relative to the largest magnitude) or when the eigenvectors do not
    /// span the space.
    pub fn inverse(&self) -> Result<DynMatrix<T>> {
        let n = self.dim();
        let mags: Vec<T> = (0..n).map(|k| self.re[k].hypot(self.im[k])).collect();
        let largest = mags.iter().fold(T::zero(), |m, &x| m.max(x));
        let cutoff = T::from_usize(n.max(1)) * T::epsilon() * largest;
        if mags.iter().any(|&m| !(m > cutoff)) {
            return Err(Error::SingularMatrix);
        }

        // D⁻¹, block by block
        let mut dinv = DynMatrix::zeros(n, n, T::zero());
        let mut k = 0;
        while k < n {
            if self.im[k] > T::zero() {
                let (a, b) = (self.re[k], self.im[k]);
                let den = a * a + b * b;
                dinv[(k, k)] = a / den;
                dinv[(k, k + 1)] = -b / den;
                dinv[(k + 1, k)] = b / den;
                dinv[(k + 1, k + 1)] = a / den;
                k += 2;
            } else {
                dinv[(k, k)] = T::one() / self.re[k];
                k += 1;
            }
        }

        let vinv = if self.symmetric {
            self.vectors.transpose()
        } else {
            Lu::new(&self.vectors)?.inverse()
        };
        &(&self.vectors * &dinv)? * &vinv
    }

    /// Solve `A·x = b` through [`inverse`](Self::inverse).
    pub fn solve(&self, b: &DynVector<T>) -> Result<DynVector<T>> {
        &self.inverse()? * b
    }

    /// Solve `A·X = B` through [`inverse`](Self::inverse).
    pub fn solve_matrix(&self, b: &DynMatrix<T>) -> Result<DynMatrix<T>> {
        &self.inverse()? * b
    }

    /// Reassemble `V·D·V⁻¹`.
    pub fn reconstruct(&self) -> Result<DynMatrix<T>> {
        let vinv = Lu::new(&self.vectors)?.inverse();
        &(&self.vectors * &self.block_diagonal())? * &vinv
    }
}

/// Eigenvectors of `A = Q·S·Qᵀ` from its real Schur form, by
/// back-substitution on `(S − λI)·y = 0` followed by `x = Q·y`.
fn schur_eigenvectors<T: FloatScalar>(
    s: &DynMatrix<T>,
    q: &DynMatrix<T>,
    re: &[T],
    im: &[T],
) -> DynMatrix<T> {
    let n = s.nrows();
    let zero = Complex::new(T::zero(), T::zero());
    let norm = s.max_abs().max(T::min_positive_value());
    let small = T::epsilon() * norm;
    let mut v = DynMatrix::zeros(n, n, T::zero());

    let mut k = 0;
    while k < n {
        let lambda = Complex::new(re[k], im[k]);
        let mut y = alloc::vec![zero; n];

        // Seed the diagonal block belonging to λ
        if im[k] > T::zero() {
            y[k] = Complex::new(s[(k, k + 1)], T::zero());
            y[k + 1] = lambda - s[(k, k)];
        } else {
            y[k] = Complex::new(T::one(), T::zero());
        }

        // Back-substitute the rows above the block
        let mut r = k;
        while r > 0 {
            let row = r - 1;
            let rhs = |i: usize| -> Complex<T> {
                let mut acc = zero;
                for j in (row + 1)..n {
                    if y[j] != zero {
                        acc = acc + y[j] * s[(i, j)];
                    }
                }
                acc
            };
            if row > 0 && s[(row, row - 1)] != T::zero() {
                // 2×2 block on rows (row−1, row)
                let i0 = row - 1;
                let r0 = -rhs(i0);
                let r1 = -rhs(row);
                let a00 = Complex::new(s[(i0, i0)], T::zero()) - lambda;
                let a01 = Complex::new(s[(i0, row)], T::zero());
                let a10 = Complex::new(s[(row, i0)], T::zero());
                let a11 = Complex::new(s[(row, row)], T::zero()) - lambda;
                let mut det = a00 * a11 - a01 * a10;
                if det.norm() < small * small {
                    det = Complex::new(small * small, T::zero());
                }
                y[i0] = (r0 * a11 - a01 * r1) / det;
                y[row] = (a00 * r1 - r0 * a10) / det;
                r -= 2;
            } else {
                let mut den = Complex::new(s[(row, row)], T::zero()) - lambda;
                if den.norm() < small {
                    den = Complex::new(small, T::zero());
                }
                y[row] = -rhs(row) / den;
                r -= 1;
            }
        }

        // x = Q·y, scaled to unit norm
        let mut x: Vec<Complex<T>> = (0..n)
            .map(|i| (0..n).fold(zero, |acc, j| acc + y[j] * q[(i, j)]))
            .collect();
        let len = x.iter().fold(T::zero(), |acc, c| acc + c.norm_sqr()).sqrt();
        if len > T::zero() {
            x.iter_mut().for_each(|c| *c = *c / len);
        }

        if im[k] > T::zero() {
            for i in 0..n {
                v[(i, k)] = x[i].re;
                v[(i, k + 1)] = x[i].im;
            }
            k += 2;
        } else {
            for i in 0..n {
                v[(i, k)] = x[i].re;
            }
            k += 1;
        }
    }

    v
}

impl<T: FloatScalar, const N: usize> Matrix<T, N, N> {
    /// Eigen-decomposition, computed by the dynamic-size core.
    ///
    /// ```
    /// use geotrf::Matrix;
    /// let a = Matrix::new([[2.0_f64, 0.0], [0.0, -1.0]]);
    /// let eig = a.eigen().unwrap();
    /// let mut vals = eig.eigenvalues_real().to_vec();
    /// vals.sort_by(|a, b| a.partial_cmp(b).unwrap());
    /// assert_eq!(vals, vec![-1.0, 2.0]);
    /// ```
    pub fn eigen(&self) -> Result<Eigen<T>> {
        Eigen::new(&DynMatrix::from(self))
    }
}
