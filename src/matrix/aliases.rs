//! Type aliases for the sizes the transform layer works with.

use crate::matrix::vector::{ColumnVector, Vector};
use crate::Matrix;

// ── Square matrix aliases ──────────────────────────────────────────

/// 2×2 matrix.
pub type Matrix2<T> = Matrix<T, 2, 2>;
/// 3×3 matrix.
pub type Matrix3<T> = Matrix<T, 3, 3>;
/// 4×4 matrix.
pub type Matrix4<T> = Matrix<T, 4, 4>;

// ── Rectangular matrix aliases ─────────────────────────────────────

/// 2×3 matrix, the linear part plus translation of a 2D affine map.
pub type Matrix2x3<T> = Matrix<T, 2, 3>;
/// 3×4 matrix, the linear part plus translation of a 3D affine map.
pub type Matrix3x4<T> = Matrix<T, 3, 4>;

// ── Vector aliases ─────────────────────────────────────────────────

/// 2-element row vector.
pub type Vector2<T> = Vector<T, 2>;
/// 3-element row vector.
pub type Vector3<T> = Vector<T, 3>;

/// 2-element column vector.
pub type ColumnVector2<T> = ColumnVector<T, 2>;
/// 3-element column vector.
pub type ColumnVector3<T> = ColumnVector<T, 3>;
