use super::fit::{check_counts, procrustes, report};
use super::helmert3d::{frame_angles, frame_rotation};
use super::{FitReport, FitSettings, FitStrategy, Order, Transform, TransformKind};
use crate::error::{Error, Result};
use crate::geometry::Point3;
use crate::matrix::Matrix3;
use crate::traits::FloatScalar;
use crate::Matrix;

/// `m` must satisfy `‖mᵀm − I‖∞ ≤ tol` and `det m > 0`.
pub(crate) fn check_rotation<T: FloatScalar>(m: &Matrix3<T>, tol: T) -> Result<()> {
    if !m.is_orthonormal(tol) || !(m.det() > T::zero()) {
        return Err(Error::DegenerateConfiguration("not a proper rotation matrix"));
    }
    Ok(())
}

/// Spatial rotation about the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "T: crate::traits::Scalar + serde::Serialize",
        deserialize = "T: crate::traits::Scalar + serde::Deserialize<'de>"
    ))
)]
pub struct Rotation3D<T> {
    rotation: Matrix3<T>,
}

impl<T: FloatScalar> Default for Rotation3D<T> {
    fn default() -> Self {
        Self {
            rotation: Matrix::eye(),
        }
    }
}

impl<T: FloatScalar> Rotation3D<T> {
    /// From the ω/φ/κ angles (radians), see [`frame_rotation`].
    pub fn new(omega: T, phi: T, kappa: T) -> Self {
        Self {
            rotation: frame_rotation(omega, phi, kappa),
        }
    }

    /// From a rotation matrix, which must be orthonormal to within `tol`
    /// with determinant +1.
    pub fn from_matrix(rotation: Matrix3<T>, tol: T) -> Result<Self> {
        check_rotation(&rotation, tol)?;
        Ok(Self { rotation })
    }

    pub fn matrix(&self) -> &Matrix3<T> {
        &self.rotation
    }

    /// `(ω, φ, κ)` in radians.
    pub fn angles(&self) -> (T, T, T) {
        frame_angles(&self.rotation)
    }

    #[inline]
    pub fn apply(&self, p: Point3<T>) -> Point3<T> {
        p.rotated(&self.rotation)
    }

    #[inline]
    pub fn apply_inverse(&self, p: Point3<T>) -> Point3<T> {
        p.rotated(&self.rotation.transpose())
    }

    pub fn inverse(&self) -> Result<Self> {
        Ok(Self {
            rotation: self.rotation.transpose(),
        })
    }
}

impl<T: FloatScalar> Transform<T> for Rotation3D<T> {
    type Point = Point3<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::Rotation3D
    }

    /// Orthogonal Procrustes about the origin.
    fn compute_with(
        &mut self,
        src: &[Point3<T>],
        dst: &[Point3<T>],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        let kind = self.kind();
        check_counts(kind, src, dst)?;
        let fit = procrustes(
            src,
            dst,
            false,
            settings,
            "points are collinear with the origin",
        )?;
        self.rotation = fit.rotation;

        Ok(report(kind, src, dst, FitStrategy::ClosedForm, |p| self.apply(p)))
    }

    fn transform(&self, p: Point3<T>, order: Order) -> Result<Point3<T>> {
        Ok(match order {
            Order::Direct => self.apply(p),
            Order::Inverse => self.apply_inverse(p),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinates;
    use alloc::vec::Vec;

    #[test]
    fn fit_from_two_points() {
        let truth = Rotation3D::new(0.3_f64, -0.1, 1.1);
        let src = [Point3::new(1.0, 2.0, 3.0), Point3::new(-4.0, 0.5, 2.0)];
        let dst: Vec<_> = src.iter().map(|&p| truth.apply(p)).collect();
        let mut r = Rotation3D::default();
        let rep = r.compute(&src, &dst).unwrap();
        assert_eq!(rep.strategy, FitStrategy::ClosedForm);
        assert!(r.matrix().max_abs_diff(truth.matrix()) < 1e-10);
        let (o, p, k) = r.angles();
        assert!((o - 0.3).abs() < 1e-10 && (p + 0.1).abs() < 1e-10 && (k - 1.1).abs() < 1e-10);
    }

    #[test]
    fn rejects_reflection() {
        let m = Matrix::new([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]]);
        assert!(Rotation3D::from_matrix(m, 1e-9).is_err());
        assert!(Rotation3D::from_matrix(Matrix::<f64, 3, 3>::eye(), 1e-9).is_ok());
    }

    #[test]
    fn from_matrix_tolerance() {
        let mut m = *Rotation3D::new(0.2_f64, 0.1, -0.4).matrix();
        m[(0, 0)] += 1e-7;
        assert!(Rotation3D::from_matrix(m, 1e-9).is_err());
        assert!(Rotation3D::from_matrix(m, 1e-6).is_ok());
        let stretched = Matrix::new([[2.0_f64, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(
            Rotation3D::from_matrix(stretched, 1e-6).unwrap_err(),
            Error::DegenerateConfiguration("not a proper rotation matrix")
        );
    }

    #[test]
    fn round_trip() {
        let r = Rotation3D::new(-0.6, 0.2, 2.5);
        let p = Point3::new(10.0, -3.0, 7.0);
        let back = r.transform(r.transform(p, Order::Direct).unwrap(), Order::Inverse).unwrap();
        assert!(back.distance(&p) < 1e-12);
    }
}
