use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::matrix::vector::Vector;
use crate::traits::{FloatScalar, Scalar};

use super::DynMatrix;

/// Dynamically-sized vector, the right-hand side of the `solve` family.
///
/// # Examples
///
/// ```
/// use geotrf::DynVector;
///
/// let v = DynVector::from_slice(&[1.0_f64, 2.0, 2.0]);
/// assert_eq!(v[0], 1.0);
/// assert_eq!(v.len(), 3);
/// assert_eq!(v.norm(), 3.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynVector<T> {
    data: Vec<T>,
}

impl<T: Scalar> DynVector<T> {
    /// Create a vector from a flat slice.
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Create a vector from an owned `Vec`.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Create a zero vector of length `n`.
    pub fn zeros(n: usize, _zero: T) -> Self {
        Self {
            data: alloc::vec![T::zero(); n],
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the vector has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Dot product, or `None` when the lengths differ.
    pub fn dot(&self, rhs: &Self) -> Option<T> {
        if self.len() != rhs.len() {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(&rhs.data)
                .fold(T::zero(), |acc, (&a, &b)| acc + a * b),
        )
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume into the underlying `Vec`.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// View as an `n x 1` column matrix.
    pub fn to_column(&self) -> DynMatrix<T> {
        DynMatrix::from_slice(self.len(), 1, &self.data)
    }
}

impl<T: FloatScalar> DynVector<T> {
    /// Euclidean norm.
    pub fn norm(&self) -> T {
        self.data
            .iter()
            .fold(T::zero(), |acc, &x| acc + x * x)
            .sqrt()
    }
}

impl<T> Index<usize> for DynVector<T> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> IndexMut<usize> for DynVector<T> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

impl<T: Scalar, const N: usize> From<Vector<T, N>> for DynVector<T> {
    fn from(v: Vector<T, N>) -> Self {
        Self::from_slice(&v.to_array())
    }
}

impl<T: Scalar, const N: usize> From<[T; N]> for DynVector<T> {
    fn from(v: [T; N]) -> Self {
        Self::from_slice(&v)
    }
}
