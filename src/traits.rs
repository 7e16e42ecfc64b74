use core::fmt::Debug;
use num_traits::{Float, FloatConst, Num, NumCast, One, Zero};

/// Trait for types that can be stored in a [`Matrix`](crate::Matrix) or
/// [`DynMatrix`](crate::DynMatrix).
///
/// Blanket-implemented for all types satisfying the bounds, which covers
/// `f32`, `f64`, the integer types and `Complex<T>`.
pub trait Scalar: Copy + PartialEq + Debug + Zero + One + Num {}

impl<T: Copy + PartialEq + Debug + Zero + One + Num> Scalar for T {}

/// Trait for real floating-point elements.
///
/// Required by everything that needs `sqrt`, `atan2`, `abs` and friends:
/// the decompositions, the transforms and the geodetic helpers.
pub trait FloatScalar: Scalar + Float + FloatConst + NumCast {
    /// Convert an `f64` literal into `Self`.
    ///
    /// Lossy for `f32`, which is the intent for constants such as
    /// ellipsoid parameters.
    #[inline]
    fn lit(v: f64) -> Self {
        <Self as NumCast>::from(v).unwrap_or_else(Self::nan)
    }

    /// Convert a count into `Self`.
    #[inline]
    fn from_usize(n: usize) -> Self {
        <Self as NumCast>::from(n).unwrap_or_else(Self::infinity)
    }
}

impl<T: Scalar + Float + FloatConst + NumCast> FloatScalar for T {}

/// Read-only access to a matrix-like type.
///
/// Algorithms in [`linalg`](crate::linalg) are written against this trait,
/// so they run on [`DynMatrix`](crate::DynMatrix) and on fixed-size
/// [`Matrix`](crate::Matrix) alike.
pub trait MatrixRef<T> {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn get(&self, row: usize, col: usize) -> &T;

    /// Contiguous slice of column `col` starting at `row_start`.
    fn col_as_slice(&self, col: usize, row_start: usize) -> &[T];
}

/// Mutable access to a matrix-like type.
pub trait MatrixMut<T>: MatrixRef<T> {
    fn get_mut(&mut self, row: usize, col: usize) -> &mut T;

    /// Mutable contiguous slice of column `col` starting at `row_start`.
    fn col_as_mut_slice(&mut self, col: usize, row_start: usize) -> &mut [T];
}
