pub mod aliases;
mod ops;
pub mod vector;

use core::ops::{Index, IndexMut};

use crate::traits::{FloatScalar, MatrixMut, MatrixRef, Scalar};

/// Fixed-size matrix with `M` rows and `N` columns.
///
/// Storage is column-major: `data[col][row]`. Construction and indexing use
/// row-major semantics. Shapes are checked at compile time, so arithmetic on
/// `Matrix` is infallible; the decompositions forward to the dynamic-size
/// core in [`linalg`](crate::linalg).
///
/// # Examples
///
/// ```
/// use geotrf::Matrix;
///
/// let a = Matrix::new([[1.0, 2.0], [3.0, 4.0]]);
/// assert_eq!(a[(0, 1)], 2.0);
/// assert_eq!(a.nrows(), 2);
///
/// let b: Matrix<f64, 3, 3> = Matrix::eye();
/// assert_eq!(b[(1, 1)], 1.0);
/// assert_eq!(b[(0, 1)], 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix<T, const M: usize, const N: usize> {
    pub(crate) data: [[T; M]; N],
}

impl<T, const M: usize, const N: usize> Matrix<T, M, N> {
    /// Create a matrix from a row-major 2D array.
    ///
    /// The input is `[[row0], [row1], ...]` (M arrays of N elements each).
    #[inline]
    pub fn new(rows: [[T; N]; M]) -> Self
    where
        T: Copy,
    {
        Self {
            data: core::array::from_fn(|col| core::array::from_fn(|row| rows[row][col])),
        }
    }

    /// Create a matrix by calling `f(row, col)` for each element.
    ///
    /// ```
    /// use geotrf::Matrix;
    /// let m: Matrix<f64, 2, 3> = Matrix::from_fn(|i, j| (i * 3 + j) as f64);
    /// assert_eq!(m[(1, 2)], 5.0);
    /// ```
    pub fn from_fn(f: impl Fn(usize, usize) -> T) -> Self {
        Self {
            data: core::array::from_fn(|col| core::array::from_fn(|row| f(row, col))),
        }
    }

    /// Number of rows.
    #[inline]
    pub const fn nrows(&self) -> usize {
        M
    }

    /// Number of columns.
    #[inline]
    pub const fn ncols(&self) -> usize {
        N
    }
}

impl<T: Scalar, const M: usize, const N: usize> Matrix<T, M, N> {
    /// Create a matrix filled with zeros.
    pub fn zeros() -> Self {
        Self {
            data: [[T::zero(); M]; N],
        }
    }

    /// Create a matrix from a column-major slice of length `M * N`.
    pub(crate) fn from_col_major(slice: &[T]) -> Self {
        debug_assert_eq!(slice.len(), M * N);
        Self::from_fn(|row, col| slice[col * M + row])
    }

    /// Transpose.
    ///
    /// ```
    /// use geotrf::Matrix;
    /// let a = Matrix::new([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    /// let t = a.transpose();
    /// assert_eq!(t[(2, 1)], 6.0);
    /// ```
    pub fn transpose(&self) -> Matrix<T, N, M> {
        Matrix::from_fn(|i, j| self[(j, i)])
    }

    /// Row-major copy of the elements.
    pub fn to_rows(&self) -> [[T; N]; M] {
        core::array::from_fn(|row| core::array::from_fn(|col| self[(row, col)]))
    }
}

impl<T: Scalar, const N: usize> Matrix<T, N, N> {
    /// Create an identity matrix.
    pub fn eye() -> Self {
        let mut m = Self::zeros();
        for i in 0..N {
            m.data[i][i] = T::one();
        }
        m
    }

    /// Sum of the diagonal.
    pub fn trace(&self) -> T {
        (0..N).fold(T::zero(), |acc, i| acc + self.data[i][i])
    }
}

impl<T: FloatScalar, const M: usize, const N: usize> Matrix<T, M, N> {
    /// Largest absolute difference against `other`.
    pub fn max_abs_diff(&self, other: &Self) -> T {
        let mut m = T::zero();
        for col in 0..N {
            for row in 0..M {
                m = m.max((self.data[col][row] - other.data[col][row]).abs());
            }
        }
        m
    }
}

impl<T: FloatScalar, const N: usize> Matrix<T, N, N> {
    /// Whether `Mᵀ·M ≈ I` within `tol` element-wise.
    ///
    /// ```
    /// use geotrf::Matrix;
    /// let (s, c) = 0.3_f64.sin_cos();
    /// let r = Matrix::new([[c, -s], [s, c]]);
    /// assert!(r.is_orthonormal(1e-12));
    /// ```
    pub fn is_orthonormal(&self, tol: T) -> bool {
        (self.transpose() * *self).max_abs_diff(&Self::eye()) <= tol
    }
}

impl<T, const M: usize, const N: usize> MatrixRef<T> for Matrix<T, M, N> {
    #[inline]
    fn nrows(&self) -> usize {
        M
    }

    #[inline]
    fn ncols(&self) -> usize {
        N
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> &T {
        &self.data[col][row]
    }

    #[inline]
    fn col_as_slice(&self, col: usize, row_start: usize) -> &[T] {
        &self.data[col][row_start..]
    }
}

impl<T, const M: usize, const N: usize> MatrixMut<T> for Matrix<T, M, N> {
    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        &mut self.data[col][row]
    }

    #[inline]
    fn col_as_mut_slice(&mut self, col: usize, row_start: usize) -> &mut [T] {
        &mut self.data[col][row_start..]
    }
}

impl<T, const M: usize, const N: usize> Index<(usize, usize)> for Matrix<T, M, N> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[col][row]
    }
}

impl<T, const M: usize, const N: usize> IndexMut<(usize, usize)> for Matrix<T, M, N> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[col][row]
    }
}

#[cfg(feature = "serde")]
impl<T, const M: usize, const N: usize> serde::Serialize for Matrix<T, M, N>
where
    T: Scalar + serde::Serialize,
{
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(M))?;
        for row in 0..M {
            let r: serde_rows::Row<'_, T, M, N> = serde_rows::Row { m: self, row };
            seq.serialize_element(&r)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
impl<'de, T, const M: usize, const N: usize> serde::Deserialize<'de> for Matrix<T, M, N>
where
    T: Scalar + serde::Deserialize<'de>,
{
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows: alloc::vec::Vec<alloc::vec::Vec<T>> = serde::Deserialize::deserialize(deserializer)?;
        if rows.len() != M || rows.iter().any(|r| r.len() != N) {
            return Err(serde::de::Error::custom(format_args!(
                "expected a {}x{} matrix",
                M, N
            )));
        }
        Ok(Self::from_fn(|i, j| rows[i][j]))
    }
}

#[cfg(feature = "serde")]
mod serde_rows {
    use super::Matrix;
    use crate::traits::Scalar;

    /// One row of a matrix, serialized as a sequence.
    pub(super) struct Row<'a, T, const M: usize, const N: usize> {
        pub(super) m: &'a Matrix<T, M, N>,
        pub(super) row: usize,
    }

    impl<T: Scalar + serde::Serialize, const M: usize, const N: usize> serde::Serialize
        for Row<'_, T, M, N>
    {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            use serde::ser::SerializeSeq;
            let mut seq = serializer.serialize_seq(Some(N))?;
            for col in 0..N {
                seq.serialize_element(&self.m[(self.row, col)])?;
            }
            seq.end()
        }
    }
}

pub use aliases::*;
