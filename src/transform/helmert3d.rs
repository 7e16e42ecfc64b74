use super::fit::{check_counts, procrustes, report};
use super::rotation3d::check_rotation;
use super::{
    check_invertible, FitReport, FitSettings, FitStrategy, Order, Transform, TransformKind,
};
use crate::error::Result;
use crate::geometry::Point3;
use crate::matrix::Matrix3;
use crate::traits::FloatScalar;
use crate::Matrix;

/// Frame rotation for the angles ω, φ, κ (radians) about x, y and z.
///
/// Returns `(Rx(ω)·Ry(φ)·Rz(κ))ᵀ`, the coordinate-frame convention used
/// for datum shifts. For small angles it reduces to
/// `X' ≈ X + X × (ω, φ, κ)`.
///
/// ```
/// use geotrf::transform::frame_rotation;
/// let r = frame_rotation(0.0, 0.0, core::f64::consts::FRAC_PI_2);
/// // the frame turns by +90° about z, so a point on x lands on −y
/// assert!((r[(1, 0)] + 1.0).abs() < 1e-15);
/// ```
pub fn frame_rotation<T: FloatScalar>(omega: T, phi: T, kappa: T) -> Matrix3<T> {
    let (so, co) = omega.sin_cos();
    let (sp, cp) = phi.sin_cos();
    let (sk, ck) = kappa.sin_cos();
    let z = T::zero();
    let one = T::one();
    let rx = Matrix::new([[one, z, z], [z, co, -so], [z, so, co]]);
    let ry = Matrix::new([[cp, z, sp], [z, one, z], [-sp, z, cp]]);
    let rz = Matrix::new([[ck, -sk, z], [sk, ck, z], [z, z, one]]);
    (rx * ry * rz).transpose()
}

/// Inverse of [`frame_rotation`]: `(ω, φ, κ)` with φ in `[−π/2, π/2]`.
pub(crate) fn frame_angles<T: FloatScalar>(r: &Matrix3<T>) -> (T, T, T) {
    // r = Mᵀ with M = Rx·Ry·Rz
    let m02 = r[(2, 0)].max(-T::one()).min(T::one());
    let omega = (-r[(2, 1)]).atan2(r[(2, 2)]);
    let phi = m02.asin();
    let kappa = (-r[(1, 0)]).atan2(r[(0, 0)]);
    (omega, phi, kappa)
}

/// Seven-parameter spatial similarity: `X' = s·R·X + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "T: crate::traits::Scalar + serde::Serialize",
        deserialize = "T: crate::traits::Scalar + serde::Deserialize<'de>"
    ))
)]
pub struct Helmert3D<T> {
    pub tx: T,
    pub ty: T,
    pub tz: T,
    pub scale: T,
    rotation: Matrix3<T>,
}

impl<T: FloatScalar> Default for Helmert3D<T> {
    fn default() -> Self {
        Self::from_parts(T::zero(), T::zero(), T::zero(), T::one(), Matrix::eye())
    }
}

impl<T: FloatScalar> Helmert3D<T> {
    /// From translation, scale and the frame angles in radians.
    pub fn new(tx: T, ty: T, tz: T, scale: T, omega: T, phi: T, kappa: T) -> Self {
        Self::from_parts(tx, ty, tz, scale, frame_rotation(omega, phi, kappa))
    }

    /// From translation, scale and an already built rotation matrix, which
    /// must be orthonormal to within `tol` with determinant +1.
    pub fn from_rotation(
        tx: T,
        ty: T,
        tz: T,
        scale: T,
        rotation: Matrix3<T>,
        tol: T,
    ) -> Result<Self> {
        check_rotation(&rotation, tol)?;
        Ok(Self::from_parts(tx, ty, tz, scale, rotation))
    }

    pub(crate) fn from_parts(tx: T, ty: T, tz: T, scale: T, rotation: Matrix3<T>) -> Self {
        Self {
            tx,
            ty,
            tz,
            scale,
            rotation,
        }
    }

    pub fn rotation_matrix(&self) -> &Matrix3<T> {
        &self.rotation
    }

    pub fn translation(&self) -> Point3<T> {
        Point3::new(self.tx, self.ty, self.tz)
    }

    pub fn omega(&self) -> T {
        frame_angles(&self.rotation).0
    }

    pub fn phi(&self) -> T {
        frame_angles(&self.rotation).1
    }

    pub fn kappa(&self) -> T {
        frame_angles(&self.rotation).2
    }

    /// Scale difference from unity in parts per million.
    pub fn scale_ppm(&self) -> T {
        (self.scale - T::one()) * T::lit(1e6)
    }

    pub fn set_parameters(&mut self, tx: T, ty: T, tz: T, scale: T, omega: T, phi: T, kappa: T) {
        *self = Self::new(tx, ty, tz, scale, omega, phi, kappa);
    }

    #[inline]
    pub fn apply(&self, p: Point3<T>) -> Point3<T> {
        let q = p.rotated(&self.rotation);
        Point3::new(
            self.scale * q.x + self.tx,
            self.scale * q.y + self.ty,
            self.scale * q.z + self.tz,
        )
    }

    pub fn apply_inverse(&self, p: Point3<T>) -> Result<Point3<T>> {
        Ok(self.inverse()?.apply(p))
    }

    /// `X = Rᵀ·(X' − t)/s`.
    pub fn inverse(&self) -> Result<Self> {
        let s3 = self.scale * self.scale * self.scale;
        check_invertible(s3, self.scale, 3, "zero scale has no inverse")?;
        let rt = self.rotation.transpose();
        let s = T::one() / self.scale;
        let t = self.translation().rotated(&rt);
        Ok(Self::from_parts(-s * t.x, -s * t.y, -s * t.z, s, rt))
    }
}

impl<T: FloatScalar> Transform<T> for Helmert3D<T> {
    type Point = Point3<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::Helmert3D
    }

    /// Umeyama: Procrustes on centered points, then `t = d̄ − s·R·s̄`.
    fn compute_with(
        &mut self,
        src: &[Point3<T>],
        dst: &[Point3<T>],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        let kind = self.kind();
        check_counts(kind, src, dst)?;
        let fit = procrustes(src, dst, true, settings, "points are collinear")?;

        let m = fit.src_mean.rotated(&fit.rotation);
        *self = Self::from_parts(
            fit.dst_mean.x - fit.scale * m.x,
            fit.dst_mean.y - fit.scale * m.y,
            fit.dst_mean.z - fit.scale * m.z,
            fit.scale,
            fit.rotation,
        );

        Ok(report(kind, src, dst, FitStrategy::ClosedForm, |p| self.apply(p)))
    }

    fn transform(&self, p: Point3<T>, order: Order) -> Result<Point3<T>> {
        match order {
            Order::Direct => Ok(self.apply(p)),
            Order::Inverse => self.apply_inverse(p),
        }
    }

    fn transform_batch(
        &self,
        points: &[Point3<T>],
        order: Order,
    ) -> Result<alloc::vec::Vec<Point3<T>>> {
        let t = match order {
            Order::Direct => *self,
            Order::Inverse => self.inverse()?,
        };
        Ok(points.iter().map(|&p| t.apply(p)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::geometry::Coordinates;
    use alloc::vec::Vec;

    const TOL: f64 = 1e-9;

    #[test]
    fn angles_round_trip() {
        for &(o, p, k) in &[(0.1_f64, -0.2_f64, 0.3_f64), (-2.0, 1.2, 3.0), (0.0, 0.0, -1.0)] {
            let r = frame_rotation(o, p, k);
            assert!(r.is_orthonormal(1e-14));
            let (o2, p2, k2) = frame_angles(&r);
            assert!((o - o2).abs() < 1e-12 && (p - p2).abs() < 1e-12 && (k - k2).abs() < 1e-12);
        }
    }

    #[test]
    fn small_angle_form() {
        let e = [1e-6, -2e-6, 3e-6];
        let r = frame_rotation(e[0], e[1], e[2]);
        let x = Point3::new(4.0e6, 1.0e6, 4.7e6);
        let exact = x.rotated(&r);
        // X + X × ε
        let cross = Point3::new(
            x.y * e[2] - x.z * e[1],
            x.z * e[0] - x.x * e[2],
            x.x * e[1] - x.y * e[0],
        );
        assert!(exact.distance(&(x + cross)) < 1e-3);
    }

    #[test]
    fn exact_fit_recovers_parameters() {
        let truth = Helmert3D::new(-420.0, -99.0, -591.0, 1.0 + 2e-6, 4e-6, 9e-6, -3.8e-5);
        let src = [
            Point3::new(4157222.5, 664789.3, 4774952.1),
            Point3::new(4149043.3, 688836.4, 4778632.2),
            Point3::new(4172803.5, 690340.1, 4758129.7),
            Point3::new(4177148.4, 642997.6, 4760764.8),
        ];
        let dst: Vec<_> = src.iter().map(|&p| truth.apply(p)).collect();
        let mut h = Helmert3D::<f64>::default();
        let rep = h.compute(&src, &dst).unwrap();
        assert_eq!(rep.strategy, FitStrategy::ClosedForm);
        assert!(rep.max_residual() < 1e-6);
        assert!((h.scale_ppm() - 2.0).abs() < 1e-4);
        assert!((h.kappa() + 3.8e-5).abs() < 1e-10);
        assert!((h.tx + 420.0).abs() < 1e-2);
    }

    #[test]
    fn inverse_round_trip() {
        let h = Helmert3D::new(10.0, -3.0, 7.0, 1.5, 0.2, -0.1, 0.4);
        let p = Point3::new(1.0, 2.0, 3.0);
        let q = h.transform(p, Order::Direct).unwrap();
        assert!(h.transform(q, Order::Inverse).unwrap().distance(&p) < TOL);
        let inv = h.inverse().unwrap();
        assert!((inv.scale - 1.0 / 1.5).abs() < TOL);
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let src = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(2.0, 4.0, 6.0),
        ];
        let mut h = Helmert3D::<f64>::default();
        assert_eq!(
            h.compute(&src, &src).unwrap_err(),
            Error::DegenerateConfiguration("points are collinear")
        );
    }

    #[test]
    fn from_rotation_validates() {
        let r = frame_rotation(0.1_f64, -0.2, 0.3);
        let h = Helmert3D::from_rotation(1.0, 2.0, 3.0, 1.5, r, 1e-12).unwrap();
        assert_eq!(h, Helmert3D::new(1.0, 2.0, 3.0, 1.5, 0.1, -0.2, 0.3));

        let stretched = Matrix::new([[2.0_f64, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(
            Helmert3D::from_rotation(0.0, 0.0, 0.0, 1.0, stretched, 1e-6).unwrap_err(),
            Error::DegenerateConfiguration("not a proper rotation matrix")
        );
        let mirror = Matrix::new([[1.0_f64, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]]);
        assert!(Helmert3D::from_rotation(0.0, 0.0, 0.0, 1.0, mirror, 1e-6).is_err());

        let mut nudged = r;
        nudged[(2, 1)] += 1e-8;
        assert!(Helmert3D::from_rotation(0.0, 0.0, 0.0, 1.0, nudged, 1e-10).is_err());
        assert!(Helmert3D::from_rotation(0.0, 0.0, 0.0, 1.0, nudged, 1e-6).is_ok());
    }

    #[test]
    fn tiny_scale_inverts() {
        let h = Helmert3D::new(5.0_f64, -2.0, 1.0, 1e-9, 0.1, 0.2, 0.3);
        let p = Point3::new(4.0, 5.0, 6.0);
        let back = h.apply_inverse(h.apply(p)).unwrap();
        assert!(back.distance(&p) < 1e-6);
        let zero = Helmert3D::<f64>::new(5.0, -2.0, 1.0, 0.0, 0.1, 0.2, 0.3);
        assert_eq!(
            zero.inverse().unwrap_err(),
            Error::DegenerateConfiguration("zero scale has no inverse")
        );
    }
}
