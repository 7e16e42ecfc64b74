use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::matrix::vector::ColumnVector;
use crate::traits::Scalar;
use crate::Matrix;

// ── Element-wise addition and subtraction ───────────────────────────

macro_rules! impl_elementwise {
    ($Trait:ident, $method:ident, $AssignTrait:ident, $assign:ident, $op:tt) => {
        impl<T: Scalar, const M: usize, const N: usize> $Trait for Matrix<T, M, N> {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self::from_fn(|i, j| self[(i, j)] $op rhs[(i, j)])
            }
        }

        impl<T: Scalar, const M: usize, const N: usize> $Trait<&Matrix<T, M, N>> for &Matrix<T, M, N> {
            type Output = Matrix<T, M, N>;

            fn $method(self, rhs: &Matrix<T, M, N>) -> Matrix<T, M, N> {
                (*self).$method(*rhs)
            }
        }

        impl<T: Scalar, const M: usize, const N: usize> $AssignTrait for Matrix<T, M, N> {
            fn $assign(&mut self, rhs: Self) {
                for j in 0..N {
                    for i in 0..M {
                        self[(i, j)] = self[(i, j)] $op rhs[(i, j)];
                    }
                }
            }
        }
    };
}

impl_elementwise!(Add, add, AddAssign, add_assign, +);
impl_elementwise!(Sub, sub, SubAssign, sub_assign, -);

// ── Negation ────────────────────────────────────────────────────────

impl<T: Scalar, const M: usize, const N: usize> Neg for Matrix<T, M, N> {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_fn(|i, j| T::zero() - self[(i, j)])
    }
}

// ── Matrix multiplication: (M×N) * (N×P) → (M×P) ──────────────────

impl<T: Scalar, const M: usize, const N: usize, const P: usize> Mul<Matrix<T, N, P>>
    for Matrix<T, M, N>
{
    type Output = Matrix<T, M, P>;

    fn mul(self, rhs: Matrix<T, N, P>) -> Matrix<T, M, P> {
        let mut out = Matrix::<T, M, P>::zeros();
        for j in 0..P {
            for k in 0..N {
                let b = rhs[(k, j)];
                for i in 0..M {
                    out[(i, j)] = out[(i, j)] + self[(i, k)] * b;
                }
            }
        }
        out
    }
}

impl<T: Scalar, const M: usize, const N: usize, const P: usize> Mul<&Matrix<T, N, P>>
    for &Matrix<T, M, N>
{
    type Output = Matrix<T, M, P>;

    fn mul(self, rhs: &Matrix<T, N, P>) -> Matrix<T, M, P> {
        (*self) * (*rhs)
    }
}

// ── Scalar multiplication ───────────────────────────────────────────

impl<T: Scalar, const M: usize, const N: usize> Mul<T> for Matrix<T, M, N> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self::from_fn(|i, j| self[(i, j)] * rhs)
    }
}

impl<T: Scalar, const M: usize, const N: usize> MulAssign<T> for Matrix<T, M, N> {
    fn mul_assign(&mut self, rhs: T) {
        *self = *self * rhs;
    }
}

// scalar * matrix needs concrete impls (orphan rules)
macro_rules! impl_scalar_lhs_mul {
    ($($t:ty),*) => {
        $(
            impl<const M: usize, const N: usize> Mul<Matrix<$t, M, N>> for $t {
                type Output = Matrix<$t, M, N>;

                #[inline]
                fn mul(self, rhs: Matrix<$t, M, N>) -> Matrix<$t, M, N> {
                    rhs * self
                }
            }
        )*
    };
}

impl_scalar_lhs_mul!(f32, f64);

// ── Matrix-vector product ───────────────────────────────────────────

impl<T: Scalar, const M: usize, const N: usize> Matrix<T, M, N> {
    /// Multiply by a plain array treated as a column vector.
    ///
    /// ```
    /// use geotrf::Matrix;
    /// let a = Matrix::new([[1.0, 2.0], [3.0, 4.0]]);
    /// assert_eq!(a.mul_array(&[1.0, 1.0]), [3.0, 7.0]);
    /// ```
    pub fn mul_array(&self, v: &[T; N]) -> [T; M] {
        (*self * ColumnVector::from_column(*v)).to_column()
    }
}
