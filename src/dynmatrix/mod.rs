mod ops;
mod vector;

pub use vector::DynVector;

use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::error::{Error, Result};
use crate::traits::{FloatScalar, MatrixMut, MatrixRef, Scalar};
use crate::Matrix;

/// Dynamically-sized heap-allocated matrix.
///
/// Column-major `Vec<T>` storage, matching the layout of fixed-size [`Matrix`].
/// Dimensions are set at runtime, so binary operators return
/// [`Result`](crate::Result) and fail with
/// [`Error::DimensionMismatch`](crate::Error::DimensionMismatch) instead of
/// panicking. This is the representation every decomposition in
/// [`linalg`](crate::linalg) works on.
///
/// # Examples
///
/// ```
/// use geotrf::DynMatrix;
///
/// let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
/// assert_eq!(a[(0, 1)], 2.0);
///
/// let b = DynMatrix::eye(2, 0.0_f64);
/// let c = (&a * &b).unwrap();
/// assert_eq!(c, a);
///
/// let bad = DynMatrix::zeros(3, 1, 0.0_f64);
/// assert!((&a + &bad).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynMatrix<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
}

// ── Constructors ────────────────────────────────────────────────────

impl<T: Scalar> DynMatrix<T> {
    /// Create an `nrows x ncols` matrix of zeros.
    ///
    /// The `_zero` parameter is only used for type inference.
    pub fn zeros(nrows: usize, ncols: usize, _zero: T) -> Self {
        Self {
            data: vec![T::zero(); nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Create an `n x n` identity matrix.
    pub fn eye(n: usize, _zero: T) -> Self {
        let mut m = Self::zeros(n, n, T::zero());
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        m
    }

    /// Create a matrix from a flat slice in column-major order.
    ///
    /// Panics if `slice.len() != nrows * ncols`.
    pub fn from_slice(nrows: usize, ncols: usize, slice: &[T]) -> Self {
        assert_eq!(
            slice.len(),
            nrows * ncols,
            "slice length {} does not match {}x{} matrix",
            slice.len(),
            nrows,
            ncols,
        );
        Self {
            data: slice.to_vec(),
            nrows,
            ncols,
        }
    }

    /// Create a matrix from a flat slice in row-major order.
    ///
    /// Panics if `row_major.len() != nrows * ncols`; use
    /// [`try_from_rows`](Self::try_from_rows) for untrusted input.
    ///
    /// ```
    /// use geotrf::DynMatrix;
    /// let m = DynMatrix::from_rows(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    /// assert_eq!(m[(0, 2)], 3.0);
    /// assert_eq!(m[(1, 0)], 4.0);
    /// ```
    pub fn from_rows(nrows: usize, ncols: usize, row_major: &[T]) -> Self {
        assert_eq!(
            row_major.len(),
            nrows * ncols,
            "slice length {} does not match {}x{} matrix",
            row_major.len(),
            nrows,
            ncols,
        );
        Self::from_fn(nrows, ncols, |i, j| row_major[i * ncols + j])
    }

    /// Fallible [`from_rows`](Self::from_rows).
    pub fn try_from_rows(nrows: usize, ncols: usize, row_major: &[T]) -> Result<Self> {
        if row_major.len() != nrows * ncols {
            return Err(Error::DimensionMismatch {
                expected: (nrows, ncols),
                got: (1, row_major.len()),
            });
        }
        Ok(Self::from_rows(nrows, ncols, row_major))
    }

    /// Create a matrix from an owned `Vec<T>` in column-major order.
    ///
    /// Panics if `data.len() != nrows * ncols`.
    pub fn from_vec(nrows: usize, ncols: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            nrows * ncols,
            "vec length {} does not match {}x{} matrix",
            data.len(),
            nrows,
            ncols,
        );
        Self { data, nrows, ncols }
    }

    /// Transpose.
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.ncols, self.nrows, |i, j| self[(j, i)])
    }

    /// Copy of column `j`.
    pub fn col(&self, j: usize) -> DynVector<T> {
        DynVector::from_slice(self.col_as_slice(j, 0))
    }

    /// Overwrite column `j` with `values`.
    pub(crate) fn set_col(&mut self, j: usize, values: &[T]) {
        self.col_as_mut_slice(j, 0).copy_from_slice(values);
    }

    /// Sum of the diagonal.
    pub fn trace(&self) -> T {
        let n = self.nrows.min(self.ncols);
        (0..n).fold(T::zero(), |acc, i| acc + self[(i, i)])
    }
}

impl<T> DynMatrix<T> {
    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// `(nrows, ncols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Whether the matrix is square.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Column-major view of the elements.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Create a matrix by calling `f(row, col)` for each element.
    ///
    /// ```
    /// use geotrf::DynMatrix;
    /// let m = DynMatrix::from_fn(3, 3, |i, j| if i == j { 1.0_f64 } else { 0.0 });
    /// assert_eq!(m[(0, 0)], 1.0);
    /// assert_eq!(m[(0, 1)], 0.0);
    /// ```
    pub fn from_fn(nrows: usize, ncols: usize, f: impl Fn(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                data.push(f(i, j));
            }
        }
        Self { data, nrows, ncols }
    }

    /// `Ok(())` when `self` has shape `expected`.
    pub(crate) fn check_shape(&self, expected: (usize, usize)) -> Result<()> {
        if self.shape() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                got: self.shape(),
            });
        }
        Ok(())
    }

    /// `Ok(())` when `self` is square.
    pub(crate) fn check_square(&self) -> Result<()> {
        self.check_shape((self.nrows, self.nrows))
    }
}

impl<T: FloatScalar> DynMatrix<T> {
    /// Largest absolute element.
    pub fn max_abs(&self) -> T {
        self.data.iter().fold(T::zero(), |m, &x| m.max(x.abs()))
    }

    /// Largest absolute element-wise difference, or `None` on shape mismatch.
    pub fn max_abs_diff(&self, other: &Self) -> Option<T> {
        if self.shape() != other.shape() {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(&other.data)
                .fold(T::zero(), |m, (&a, &b)| m.max((a - b).abs())),
        )
    }

    /// Whether `self` equals its transpose within `tol` (relative to the
    /// largest element).
    pub fn is_symmetric(&self, tol: T) -> bool {
        if !self.is_square() {
            return false;
        }
        let scale = self.max_abs().max(T::one());
        for j in 0..self.ncols {
            for i in (j + 1)..self.nrows {
                if (self[(i, j)] - self[(j, i)]).abs() > tol * scale {
                    return false;
                }
            }
        }
        true
    }
}

// ── MatrixRef / MatrixMut ───────────────────────────────────────────

impl<T> MatrixRef<T> for DynMatrix<T> {
    #[inline]
    fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        &self.data[col * self.nrows + row]
    }

    #[inline]
    fn col_as_slice(&self, col: usize, row_start: usize) -> &[T] {
        let start = col * self.nrows + row_start;
        let end = col * self.nrows + self.nrows;
        &self.data[start..end]
    }
}

impl<T> MatrixMut<T> for DynMatrix<T> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self.data[col * self.nrows + row]
    }

    #[inline]
    fn col_as_mut_slice(&mut self, col: usize, row_start: usize) -> &mut [T] {
        let start = col * self.nrows + row_start;
        let end = col * self.nrows + self.nrows;
        &mut self.data[start..end]
    }
}

// ── Index ───────────────────────────────────────────────────────────

impl<T> Index<(usize, usize)> for DynMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[col * self.nrows + row]
    }
}

impl<T> IndexMut<(usize, usize)> for DynMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[col * self.nrows + row]
    }
}

// ── Conversions: Matrix ↔ DynMatrix ─────────────────────────────────

impl<T: Scalar, const M: usize, const N: usize> From<Matrix<T, M, N>> for DynMatrix<T> {
    fn from(m: Matrix<T, M, N>) -> Self {
        Self::from(&m)
    }
}

impl<T: Scalar, const M: usize, const N: usize> From<&Matrix<T, M, N>> for DynMatrix<T> {
    /// ```
    /// use geotrf::{DynMatrix, Matrix};
    /// let m = Matrix::new([[1.0, 2.0], [3.0, 4.0]]);
    /// let d: DynMatrix<f64> = (&m).into();
    /// assert_eq!(d[(1, 0)], 3.0);
    /// ```
    fn from(m: &Matrix<T, M, N>) -> Self {
        let mut data = Vec::with_capacity(M * N);
        for col in &m.data {
            data.extend_from_slice(col);
        }
        Self {
            data,
            nrows: M,
            ncols: N,
        }
    }
}

impl<T: Scalar, const M: usize, const N: usize> TryFrom<&DynMatrix<T>> for Matrix<T, M, N> {
    type Error = Error;

    /// Fails with [`Error::DimensionMismatch`] if the runtime shape is not `M x N`.
    fn try_from(d: &DynMatrix<T>) -> Result<Self> {
        d.check_shape((M, N))?;
        Ok(Matrix::from_col_major(&d.data))
    }
}

impl<T: Scalar, const M: usize, const N: usize> TryFrom<DynMatrix<T>> for Matrix<T, M, N> {
    type Error = Error;

    fn try_from(d: DynMatrix<T>) -> Result<Self> {
        Self::try_from(&d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_and_zeros() {
        let m = DynMatrix::eye(3, 0.0_f64);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_eq!(m[(i, j)], expected);
            }
        }
        let z = DynMatrix::zeros(2, 4, 0.0_f64);
        assert_eq!(z.shape(), (2, 4));
        assert_eq!(z.trace(), 0.0);
    }

    #[test]
    fn from_rows_is_row_major() {
        let m = DynMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(m.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "slice length")]
    fn from_rows_wrong_length() {
        let _ = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0]);
    }

    #[test]
    fn try_from_rows_wrong_length() {
        let err = DynMatrix::try_from_rows(2, 2, &[1.0_f64, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: (2, 2),
                got: (1, 3)
            }
        );
    }

    #[test]
    fn transpose_and_col() {
        let m = DynMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = m.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t[(2, 1)], 6.0);
        assert_eq!(m.col(1).as_slice(), &[2.0, 5.0]);
    }

    #[test]
    fn symmetry_check() {
        let s = DynMatrix::from_rows(2, 2, &[2.0_f64, 1.0, 1.0, 3.0]);
        assert!(s.is_symmetric(1e-12));
        let a = DynMatrix::from_rows(2, 2, &[2.0_f64, 1.0, 0.0, 3.0]);
        assert!(!a.is_symmetric(1e-12));
        assert!(!DynMatrix::zeros(2, 3, 0.0).is_symmetric(1e-12));
    }

    #[test]
    fn fixed_roundtrip() {
        let m = Matrix::new([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let d: DynMatrix<f64> = m.into();
        assert_eq!(d[(1, 2)], 6.0);
        let back: Matrix<f64, 2, 3> = (&d).try_into().unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn try_into_wrong_dims() {
        let d = DynMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let result: Result<Matrix<f64, 2, 2>> = (&d).try_into();
        assert_eq!(
            result.unwrap_err(),
            Error::DimensionMismatch {
                expected: (2, 2),
                got: (2, 3)
            }
        );
    }

    #[test]
    fn matrix_ref_trait() {
        let m = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
        fn trace<T: Scalar>(m: &impl MatrixRef<T>) -> T {
            let n = m.nrows().min(m.ncols());
            (0..n).fold(T::zero(), |acc, i| acc + *m.get(i, i))
        }
        assert_eq!(trace(&m), 5.0);
        assert_eq!(m.col_as_slice(1, 1), &[4.0]);
    }
}
