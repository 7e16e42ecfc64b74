use crate::error::{Error, Result};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::{DynMatrix, DynVector, Matrix};

/// Cholesky decomposition in place: A = L·Lᵀ.
///
/// On return, the lower triangle of `a` (including diagonal) contains L.
/// The upper triangle is left unchanged.
///
/// Fails the first time a diagonal term would become non-positive.
pub fn cholesky_in_place<T: FloatScalar>(a: &mut impl MatrixMut<T>) -> Result<()> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());

    for j in 0..n {
        for k in 0..j {
            let ljk = *a.get(j, k);
            for i in j..n {
                let lik = *a.get(i, k);
                *a.get_mut(i, j) = *a.get(i, j) - ljk * lik;
            }
        }

        let diag = *a.get(j, j);
        if !(diag > T::zero()) {
            return Err(Error::NotPositiveDefinite);
        }
        let ljj = diag.sqrt();
        *a.get_mut(j, j) = ljj;

        let inv_ljj = T::one() / ljj;
        for x in a.col_as_mut_slice(j, j + 1).iter_mut() {
            *x = *x * inv_ljj;
        }
    }

    Ok(())
}

/// Solve L·x = b by forward substitution, where L is lower triangular.
pub fn forward_substitute<T: FloatScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum = sum - *l.get(i, j) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

/// Solve Lᵀ·x = b by back substitution, where L is lower triangular.
pub fn back_substitute_lt<T: FloatScalar>(l: &impl MatrixRef<T>, b: &[T], x: &mut [T]) {
    let n = l.nrows();
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum = sum - *l.get(j, i) * x[j];
        }
        x[i] = sum / *l.get(i, i);
    }
}

/// Cholesky decomposition of a symmetric positive-definite matrix.
///
/// Only the lower triangle of the input is read. About half the work of
/// [`Lu`](super::Lu), so it is the solver of choice for normal equations.
///
/// # Example
///
/// ```
/// use geotrf::{DynMatrix, DynVector};
/// use geotrf::linalg::Cholesky;
///
/// let a = DynMatrix::from_rows(2, 2, &[4.0_f64, 2.0, 2.0, 3.0]);
/// let chol = Cholesky::new(&a).unwrap();
/// assert!((chol.det() - 8.0).abs() < 1e-12);
///
/// let x = chol.solve(&DynVector::from_slice(&[8.0, 7.0])).unwrap();
/// assert!((x[0] - 1.25).abs() < 1e-12);
/// assert!((x[1] - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Cholesky<T> {
    l: DynMatrix<T>,
}

impl<T: FloatScalar> Cholesky<T> {
    /// Decompose a symmetric positive-definite matrix.
    pub fn new(a: &DynMatrix<T>) -> Result<Self> {
        a.check_square()?;
        let mut l = a.clone();
        cholesky_in_place(&mut l)?;
        let n = l.nrows();
        for j in 1..n {
            for i in 0..j {
                l[(i, j)] = T::zero();
            }
        }
        Ok(Self { l })
    }

    /// Lower-triangular factor L with `A = L·Lᵀ`.
    pub fn lower(&self) -> &DynMatrix<T> {
        &self.l
    }

    pub fn dim(&self) -> usize {
        self.l.nrows()
    }

    fn solve_slice(&self, b: &[T], x: &mut [T]) {
        let mut y = alloc::vec![T::zero(); self.dim()];
        forward_substitute(&self.l, b, &mut y);
        back_substitute_lt(&self.l, &y, x);
    }

    /// Solve `A·x = b` by two triangular solves.
    pub fn solve(&self, b: &DynVector<T>) -> Result<DynVector<T>> {
        let n = self.dim();
        if b.len() != n {
            return Err(Error::DimensionMismatch {
                expected: (n, 1),
                got: (b.len(), 1),
            });
        }
        let mut x = DynVector::zeros(n, T::zero());
        self.solve_slice(b.as_slice(), x.as_mut_slice());
        Ok(x)
    }

    /// Solve `A·X = B` column by column.
    pub fn solve_matrix(&self, b: &DynMatrix<T>) -> Result<DynMatrix<T>> {
        let n = self.dim();
        if b.nrows() != n {
            return Err(Error::DimensionMismatch {
                expected: (n, b.ncols()),
                got: b.shape(),
            });
        }
        let mut x = DynMatrix::zeros(n, b.ncols(), T::zero());
        let mut col = alloc::vec![T::zero(); n];
        for j in 0..b.ncols() {
            self.solve_slice(b.col_as_slice(j, 0), &mut col);
            x.set_col(j, &col);
        }
        Ok(x)
    }

    /// Inverse of the factored matrix.
    pub fn inverse(&self) -> DynMatrix<T> {
        let n = self.dim();
        let mut inv = DynMatrix::zeros(n, n, T::zero());
        let mut e = alloc::vec![T::zero(); n];
        let mut col = alloc::vec![T::zero(); n];
        for j in 0..n {
            e.iter_mut().for_each(|v| *v = T::zero());
            e[j] = T::one();
            self.solve_slice(&e, &mut col);
            inv.set_col(j, &col);
        }
        inv
    }

    /// Determinant, the squared product of L's diagonal.
    pub fn det(&self) -> T {
        let p = (0..self.dim()).fold(T::one(), |acc, i| acc * self.l[(i, i)]);
        p * p
    }

    /// Natural log of the determinant, without overflow for large matrices.
    pub fn ln_det(&self) -> T {
        let two = T::one() + T::one();
        two * (0..self.dim()).fold(T::zero(), |acc, i| acc + self.l[(i, i)].ln())
    }
}

impl<T: FloatScalar, const N: usize> Matrix<T, N, N> {
    /// Cholesky decomposition of a symmetric positive-definite matrix.
    ///
    /// ```
    /// use geotrf::{Error, Matrix};
    /// let not_pd = Matrix::new([[1.0_f64, 5.0], [5.0, 1.0]]);
    /// assert_eq!(not_pd.cholesky().unwrap_err(), Error::NotPositiveDefinite);
    /// ```
    pub fn cholesky(&self) -> Result<Cholesky<T>> {
        Cholesky::new(&DynMatrix::from(self))
    }
}
