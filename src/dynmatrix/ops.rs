use core::ops::{Add, Mul, Neg, Sub};

use crate::error::{Error, Result};
use crate::traits::Scalar;

use super::{DynMatrix, DynVector};

// ── Element-wise addition and subtraction ───────────────────────────
//
// Shapes are only known at runtime, so every binary operator yields a
// `Result` rather than panicking on mismatch.

fn zip_with<T: Scalar>(
    lhs: &DynMatrix<T>,
    rhs: &DynMatrix<T>,
    f: impl Fn(T, T) -> T,
) -> Result<DynMatrix<T>> {
    rhs.check_shape(lhs.shape())?;
    let data = lhs
        .data
        .iter()
        .zip(rhs.data.iter())
        .map(|(&a, &b)| f(a, b))
        .collect();
    Ok(DynMatrix {
        data,
        nrows: lhs.nrows,
        ncols: lhs.ncols,
    })
}

impl<T: Scalar> Add<&DynMatrix<T>> for &DynMatrix<T> {
    type Output = Result<DynMatrix<T>>;

    fn add(self, rhs: &DynMatrix<T>) -> Result<DynMatrix<T>> {
        zip_with(self, rhs, |a, b| a + b)
    }
}

impl<T: Scalar> Sub<&DynMatrix<T>> for &DynMatrix<T> {
    type Output = Result<DynMatrix<T>>;

    fn sub(self, rhs: &DynMatrix<T>) -> Result<DynMatrix<T>> {
        zip_with(self, rhs, |a, b| a - b)
    }
}

// ── Negation ────────────────────────────────────────────────────────

impl<T: Scalar> Neg for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn neg(self) -> DynMatrix<T> {
        self * (T::zero() - T::one())
    }
}

// ── Matrix multiplication: (M×N) * (N×P) → (M×P) ──────────────────

impl<T: Scalar> Mul<&DynMatrix<T>> for &DynMatrix<T> {
    type Output = Result<DynMatrix<T>>;

    fn mul(self, rhs: &DynMatrix<T>) -> Result<DynMatrix<T>> {
        if self.ncols != rhs.nrows {
            return Err(Error::DimensionMismatch {
                expected: (self.ncols, rhs.ncols),
                got: rhs.shape(),
            });
        }
        let m = self.nrows;
        let mut out = DynMatrix::zeros(m, rhs.ncols, T::zero());
        for j in 0..rhs.ncols {
            for k in 0..self.ncols {
                let b = rhs[(k, j)];
                let a_col = &self.data[k * m..(k + 1) * m];
                let o_col = &mut out.data[j * m..(j + 1) * m];
                for (o, &a) in o_col.iter_mut().zip(a_col) {
                    *o = *o + a * b;
                }
            }
        }
        Ok(out)
    }
}

impl<T: Scalar> Mul<&DynVector<T>> for &DynMatrix<T> {
    type Output = Result<DynVector<T>>;

    /// Matrix times column vector.
    fn mul(self, rhs: &DynVector<T>) -> Result<DynVector<T>> {
        if self.ncols != rhs.len() {
            return Err(Error::DimensionMismatch {
                expected: (self.ncols, 1),
                got: (rhs.len(), 1),
            });
        }
        let mut out = alloc::vec![T::zero(); self.nrows];
        for k in 0..self.ncols {
            let b = rhs[k];
            for (o, &a) in out.iter_mut().zip(&self.data[k * self.nrows..]) {
                *o = *o + a * b;
            }
        }
        Ok(DynVector::from_vec(out))
    }
}

// ── Scalar multiplication ───────────────────────────────────────────

impl<T: Scalar> Mul<T> for &DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn mul(self, rhs: T) -> DynMatrix<T> {
        DynMatrix {
            data: self.data.iter().map(|&a| a * rhs).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: Scalar> Mul<T> for DynMatrix<T> {
    type Output = DynMatrix<T>;

    fn mul(self, rhs: T) -> DynMatrix<T> {
        &self * rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub() {
        let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
        let b = DynMatrix::from_rows(2, 2, &[4.0_f64, 3.0, 2.0, 1.0]);
        let c = (&a + &b).unwrap();
        assert_eq!(c, DynMatrix::from_rows(2, 2, &[5.0; 4]));
        let d = (&c - &b).unwrap();
        assert_eq!(d, a);
    }

    #[test]
    fn add_shape_mismatch() {
        let a = DynMatrix::zeros(2, 2, 0.0_f64);
        let b = DynMatrix::zeros(2, 3, 0.0_f64);
        assert_eq!(
            (&a + &b).unwrap_err(),
            Error::DimensionMismatch {
                expected: (2, 2),
                got: (2, 3)
            }
        );
    }

    #[test]
    fn matmul() {
        let a = DynMatrix::from_rows(2, 3, &[1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = DynMatrix::from_rows(3, 2, &[7.0_f64, 8.0, 9.0, 10.0, 11.0, 12.0]);
        let c = (&a * &b).unwrap();
        assert_eq!(c, DynMatrix::from_rows(2, 2, &[58.0_f64, 64.0, 139.0, 154.0]));
        assert!((&a * &a).is_err());
    }

    #[test]
    fn mat_vec() {
        let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 3.0, 4.0]);
        let v = DynVector::from_slice(&[1.0_f64, -1.0]);
        let w = (&a * &v).unwrap();
        assert_eq!(w.as_slice(), &[-1.0, -1.0]);
        assert!((&a * &DynVector::from_slice(&[1.0_f64])).is_err());
    }

    #[test]
    fn scalar_and_neg() {
        let a = DynMatrix::from_rows(1, 2, &[1.0_f64, -2.0]);
        assert_eq!(&a * 3.0, DynMatrix::from_rows(1, 2, &[3.0_f64, -6.0]));
        assert_eq!(-&a, DynMatrix::from_rows(1, 2, &[-1.0_f64, 2.0]));
    }
}
