use core::ops::{Index, IndexMut};

use crate::traits::{FloatScalar, Scalar};
use crate::Matrix;

/// A row vector (1×N matrix).
///
/// # Examples
///
/// ```
/// use geotrf::Vector;
///
/// let v = Vector::from_array([3.0_f64, 4.0]);
/// assert_eq!(v[0], 3.0);
/// assert_eq!(v.dot(&v), 25.0);
/// assert!((v.norm() - 5.0).abs() < 1e-12);
/// ```
pub type Vector<T, const N: usize> = Matrix<T, 1, N>;

/// A column vector (N×1 matrix), the right operand of `Matrix * v`.
///
/// ```
/// use geotrf::{ColumnVector, Matrix};
///
/// let r = Matrix::new([[0.0, -1.0], [1.0, 0.0]]);
/// let v = ColumnVector::from_column([1.0, 0.0]);
/// let w = r * v;
/// assert_eq!(w[(1, 0)], 1.0);
/// ```
pub type ColumnVector<T, const N: usize> = Matrix<T, N, 1>;

impl<T: Scalar, const N: usize> Vector<T, N> {
    /// Create a vector from a 1D array.
    #[inline]
    pub fn from_array(data: [T; N]) -> Self {
        Self::new([data])
    }

    /// Number of elements.
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    /// Whether the vector has no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(&self, rhs: &Self) -> T {
        let mut sum = T::zero();
        for i in 0..N {
            sum = sum + self[i] * rhs[i];
        }
        sum
    }

    /// Copy out as a plain array.
    #[inline]
    pub fn to_array(&self) -> [T; N] {
        core::array::from_fn(|i| self[i])
    }
}

impl<T: FloatScalar, const N: usize> Vector<T, N> {
    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> T {
        self.dot(self).sqrt()
    }
}

impl<T: Scalar> Vector<T, 3> {
    /// Cross product of two 3-vectors.
    ///
    /// ```
    /// use geotrf::Vector3;
    /// let x = Vector3::from_array([1.0, 0.0, 0.0]);
    /// let y = Vector3::from_array([0.0, 1.0, 0.0]);
    /// assert_eq!(x.cross(&y)[2], 1.0);
    /// ```
    #[inline]
    pub fn cross(&self, rhs: &Self) -> Self {
        Self::from_array([
            self[1] * rhs[2] - self[2] * rhs[1],
            self[2] * rhs[0] - self[0] * rhs[2],
            self[0] * rhs[1] - self[1] * rhs[0],
        ])
    }
}

impl<T: Scalar, const N: usize> ColumnVector<T, N> {
    /// Create a column vector from a 1D array.
    #[inline]
    pub fn from_column(data: [T; N]) -> Self {
        Self { data: [data] }
    }

    /// Copy out as a plain array.
    #[inline]
    pub fn to_column(&self) -> [T; N] {
        self.data[0]
    }
}

impl<T, const N: usize> Index<usize> for Matrix<T, 1, N> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i][0]
    }
}

impl<T, const N: usize> IndexMut<usize> for Matrix<T, 1, N> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i][0]
    }
}
