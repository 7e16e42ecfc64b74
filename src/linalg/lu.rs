use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::matrix::vector::Vector;
use crate::traits::{FloatScalar, MatrixMut, MatrixRef};
use crate::{DynMatrix, DynVector, Matrix};

/// Perform LU decomposition with partial pivoting, in place.
///
/// On return, `a` contains both L and U packed together:
/// - Upper triangle (including diagonal): U
/// - Lower triangle (excluding diagonal): L (diagonal of L is implicitly 1)
///
/// `perm` is filled with the row permutation indices, so that row `i` of
/// `L·U` is row `perm[i]` of the input. A pivot whose magnitude is at or
/// below `threshold` is treated as zero.
/// Returns `true` if the number of row swaps was even.
pub fn lu_in_place<T: FloatScalar>(
    a: &mut impl MatrixMut<T>,
    perm: &mut [usize],
    threshold: T,
) -> Result<bool> {
    let n = a.nrows();
    debug_assert_eq!(n, a.ncols());
    debug_assert_eq!(n, perm.len());

    for (i, p) in perm.iter_mut().enumerate() {
        *p = i;
    }

    let mut even = true;

    for col in 0..n {
        // Partial pivoting: largest magnitude in the active column
        let mut max_row = col;
        let mut max_val = a.get(col, col).abs();
        for row in (col + 1)..n {
            let val = a.get(row, col).abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }

        if !(max_val > threshold) {
            return Err(Error::SingularMatrix);
        }

        if max_row != col {
            perm.swap(col, max_row);
            for j in 0..n {
                let tmp = *a.get(col, j);
                *a.get_mut(col, j) = *a.get(max_row, j);
                *a.get_mut(max_row, j) = tmp;
            }
            even = !even;
        }

        let inv_pivot = T::one() / *a.get(col, col);
        for x in a.col_as_mut_slice(col, col + 1).iter_mut() {
            *x = *x * inv_pivot;
        }

        // Rank-1 update: a[col+1:n, j] -= a[col, j] * a[col+1:n, col]
        for j in (col + 1)..n {
            let factor = *a.get(col, j);
            if factor == T::zero() {
                continue;
            }
            for i in (col + 1)..n {
                let l = *a.get(i, col);
                *a.get_mut(i, j) = *a.get(i, j) - factor * l;
            }
        }
    }

    Ok(even)
}

/// Solve Ax = b given the packed LU decomposition and permutation.
///
/// `b` (input) and `x` (output) are separate slices of length n.
pub fn lu_solve<T: FloatScalar>(lu: &impl MatrixRef<T>, perm: &[usize], b: &[T], x: &mut [T]) {
    let n = lu.nrows();

    // Forward substitution: L·y = P·b
    for i in 0..n {
        let mut sum = b[perm[i]];
        for j in 0..i {
            sum = sum - *lu.get(i, j) * x[j];
        }
        x[i] = sum;
    }

    // Back substitution: U·x = y
    for i in (0..n).rev() {
        let mut sum = x[i];
        for j in (i + 1)..n {
            sum = sum - *lu.get(i, j) * x[j];
        }
        x[i] = sum / *lu.get(i, i);
    }
}

/// LU decomposition with partial pivoting of a square matrix.
///
/// The factors are a snapshot of the input taken at construction; build a
/// new `Lu` if the matrix changes.
///
/// The default pivot cutoff is relative: a pivot is zero when its magnitude
/// is at most `n·ε·max|aᵢⱼ|`. Use [`Lu::with_tolerance`] to pick another
/// relative cutoff.
///
/// # Example
///
/// ```
/// use geotrf::{DynMatrix, DynVector};
/// use geotrf::linalg::Lu;
///
/// let a = DynMatrix::from_rows(3, 3, &[2.0_f64, 1.0, -1.0, -3.0, -1.0, 2.0, -2.0, 1.0, 2.0]);
/// let lu = Lu::new(&a).unwrap();
/// let x = lu.solve(&DynVector::from_slice(&[8.0, -11.0, -3.0])).unwrap();
/// assert!((x[0] - 2.0).abs() < 1e-12);
/// assert!((x[1] - 3.0).abs() < 1e-12);
/// assert!((x[2] + 1.0).abs() < 1e-12);
/// assert!((lu.det() - (-1.0)).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Lu<T> {
    lu: DynMatrix<T>,
    perm: Vec<usize>,
    even: bool,
}

impl<T: FloatScalar> Lu<T> {
    /// Decompose a square matrix with the default pivot tolerance.
    pub fn new(a: &DynMatrix<T>) -> Result<Self> {
        let n = a.nrows().max(1);
        Self::with_tolerance(a, T::from_usize(n) * T::epsilon())
    }

    /// Decompose with an explicit relative pivot tolerance.
    pub fn with_tolerance(a: &DynMatrix<T>, rel_tol: T) -> Result<Self> {
        a.check_square()?;
        let n = a.nrows();
        let mut lu = a.clone();
        let mut perm = alloc::vec![0usize; n];
        let threshold = rel_tol * a.max_abs();
        let even = lu_in_place(&mut lu, &mut perm, threshold)?;
        Ok(Self { lu, perm, even })
    }

    /// Order of the factored matrix.
    pub fn dim(&self) -> usize {
        self.lu.nrows()
    }

    /// Solve `A·x = b`.
    pub fn solve(&self, b: &DynVector<T>) -> Result<DynVector<T>> {
        let n = self.dim();
        if b.len() != n {
            return Err(Error::DimensionMismatch {
                expected: (n, 1),
                got: (b.len(), 1),
            });
        }
        let mut x = DynVector::zeros(n, T::zero());
        lu_solve(&self.lu, &self.perm, b.as_slice(), x.as_mut_slice());
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
            lu_solve(&self.lu, &self.perm, b.col_as_slice(j, 0), &mut col);
            x.set_col(j, &col);
        }
        Ok(x)
    }

    /// Inverse, by solving against each identity column.
    pub fn inverse(&self) -> DynMatrix<T> {
        let n = self.dim();
        let mut inv = DynMatrix::zeros(n, n, T::zero());
        let mut e = alloc::vec![T::zero(); n];
        let mut col = alloc::vec![T::zero(); n];
        for j in 0..n {
            e.iter_mut().for_each(|v| *v = T::zero());
            e[j] = T::one();
            lu_solve(&self.lu, &self.perm, &e, &mut col);
            inv.set_col(j, &col);
        }
        inv
    }

    /// Determinant: product of U's diagonal times the permutation sign.
    pub fn det(&self) -> T {
        let d = (0..self.dim()).fold(T::one(), |acc, i| acc * self.lu[(i, i)]);
        if self.even {
            d
        } else {
            -d
        }
    }

    /// Unit lower-triangular factor L.
    pub fn lower(&self) -> DynMatrix<T> {
        let n = self.dim();
        DynMatrix::from_fn(n, n, |i, j| match i.cmp(&j) {
            core::cmp::Ordering::Greater => self.lu[(i, j)],
            core::cmp::Ordering::Equal => T::one(),
            core::cmp::Ordering::Less => T::zero(),
        })
    }

    /// Upper-triangular factor U.
    pub fn upper(&self) -> DynMatrix<T> {
        let n = self.dim();
        DynMatrix::from_fn(n, n, |i, j| if i <= j { self.lu[(i, j)] } else { T::zero() })
    }

    /// Row permutation indices: row `i` of `L·U` is row `perm[i]` of `A`.
    pub fn perm(&self) -> &[usize] {
        &self.perm
    }

    /// Permutation matrix `P` with `P·A = L·U`, i.e. `A = Pᵀ·L·U`.
    pub fn permutation(&self) -> DynMatrix<T> {
        let n = self.dim();
        DynMatrix::from_fn(n, n, |i, j| {
            if self.perm[i] == j {
                T::one()
            } else {
                T::zero()
            }
        })
    }
}

/// Convenience methods on square matrices.
impl<T: FloatScalar, const N: usize> Matrix<T, N, N> {
    /// LU decomposition with partial pivoting.
    pub fn lu(&self) -> Result<Lu<T>> {
        Lu::new(&DynMatrix::from(self))
    }

    /// Solve `A·x = b` for `x` via LU decomposition.
    ///
    /// ```
    /// use geotrf::{Matrix, Vector};
    /// let a = Matrix::new([[3.0_f64, 2.0], [1.0, 4.0]]);
    /// let x = a.solve(&Vector::from_array([7.0, 9.0])).unwrap();
    /// assert!((x[0] - 1.0).abs() < 1e-12);
    /// assert!((x[1] - 2.0).abs() < 1e-12);
    /// ```
    pub fn solve(&self, b: &Vector<T, N>) -> Result<Vector<T, N>> {
        let x = self.lu()?.solve(&DynVector::from(*b))?;
        Ok(Vector::from_array(core::array::from_fn(|i| x[i])))
    }

    /// Matrix inverse via LU decomposition.
    ///
    /// ```
    /// use geotrf::Matrix;
    /// let a = Matrix::new([[4.0_f64, 7.0], [2.0, 6.0]]);
    /// let id = a * a.inverse().unwrap();
    /// assert!((id[(0, 0)] - 1.0).abs() < 1e-12);
    /// assert!(id[(0, 1)].abs() < 1e-12);
    /// ```
    pub fn inverse(&self) -> Result<Self> {
        Matrix::try_from(&self.lu()?.inverse())
    }

    /// Determinant via LU. Zero when the matrix is singular.
    pub fn det(&self) -> T {
        match self.lu() {
            Ok(lu) => lu.det(),
            Err(_) => T::zero(),
        }
    }
}
