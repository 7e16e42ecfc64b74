use alloc::vec::Vec;

use super::Ellipsoid;
use crate::error::{Error, Result};
use crate::geometry::{Coordinates, Point3};
use crate::matrix::Matrix3;
use crate::traits::FloatScalar;
use crate::transform::check_rotation;
use crate::transform::{FitReport, FitSettings, Order, Transform, TransformKind};
use crate::Matrix;

/// Distance from the origin, in metres, beyond which a local frame is
/// reported as stretched.
pub const DEFAULT_VALIDITY_RADIUS: f64 = 10_000.0;

/// Rotation taking geocentric offsets to East-North-Up at the given
/// geodetic longitude and latitude (degrees).
///
/// ```
/// use geotrf::geodesy::enu_rotation;
/// let r = enu_rotation(0.0_f64, 0.0);
/// // at (0°, 0°) up is +X and east is +Y
/// assert_eq!(r[(2, 0)], 1.0);
/// assert_eq!(r[(0, 1)], 1.0);
/// ```
pub fn enu_rotation<T: FloatScalar>(longitude: T, latitude: T) -> Matrix3<T> {
    let (sl, cl) = longitude.to_radians().sin_cos();
    let (sp, cp) = latitude.to_radians().sin_cos();
    Matrix::new([
        [-sl, cl, T::zero()],
        [-sp * cl, -sp * sl, cp],
        [cp * cl, cp * sl, sp],
    ])
}

/// Rigid geocentric to local East-North-Up frame.
///
/// The rotation is fixed at construction: the frame is the tangent plane
/// at `center` and is not re-derived per point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcefToEnu<T> {
    center: Point3<T>,
    rotation: Matrix3<T>,
    validity_radius: T,
}

impl<T: FloatScalar> EcefToEnu<T> {
    /// From a geocentric origin and an explicit rotation, which must be
    /// orthonormal to within `tol` with determinant +1.
    pub fn new(center: Point3<T>, rotation: Matrix3<T>, tol: T) -> Result<Self> {
        check_rotation(&rotation, tol)?;
        Ok(Self::from_parts(center, rotation))
    }

    /// Tangent frame at a geocentric origin whose geodetic longitude and
    /// latitude (degrees) are already known.
    pub fn from_geodetic(center: Point3<T>, longitude: T, latitude: T) -> Self {
        Self::from_parts(center, enu_rotation(longitude, latitude))
    }

    /// Tangent frame at a geocentric origin; the latitude and longitude of
    /// the origin come from `ellipsoid`.
    pub fn from_geocentric_center(center: Point3<T>, ellipsoid: &Ellipsoid<T>) -> Result<Self> {
        let geo = ellipsoid.geocentric_to_geodetic(center)?;
        Ok(Self::from_geodetic(center, geo.x, geo.y))
    }

    fn from_parts(center: Point3<T>, rotation: Matrix3<T>) -> Self {
        Self {
            center,
            rotation,
            validity_radius: T::lit(DEFAULT_VALIDITY_RADIUS),
        }
    }

    pub fn with_validity_radius(mut self, radius: T) -> Self {
        self.validity_radius = radius;
        self
    }

    pub fn center(&self) -> Point3<T> {
        self.center
    }

    pub fn rotation(&self) -> &Matrix3<T> {
        &self.rotation
    }

    pub fn validity_radius(&self) -> T {
        self.validity_radius
    }

    fn check_radius(&self, offset: T) {
        if offset > self.validity_radius {
            log::warn!(
                "point {:?} m from the ENU origin, beyond the {:?} m validity radius",
                offset,
                self.validity_radius
            );
        }
    }

    /// `R·(p − center)`.
    pub fn direct(&self, ecef: Point3<T>) -> Point3<T> {
        let d = ecef - self.center;
        self.check_radius(d.norm());
        d.rotated(&self.rotation)
    }

    /// `Rᵀ·enu + center`.
    pub fn inverse(&self, enu: Point3<T>) -> Point3<T> {
        self.check_radius(enu.norm());
        enu.rotated(&self.rotation.transpose()) + self.center
    }

    pub fn direct_batch(&self, points: &[Point3<T>]) -> Vec<Point3<T>> {
        points.iter().map(|&p| self.direct(p)).collect()
    }

    pub fn inverse_batch(&self, points: &[Point3<T>]) -> Vec<Point3<T>> {
        let rt = self.rotation.transpose();
        points
            .iter()
            .map(|&p| {
                self.check_radius(p.norm());
                p.rotated(&rt) + self.center
            })
            .collect()
    }

    /// Offset of `ecef` from the origin.
    pub fn range(&self, ecef: Point3<T>) -> T {
        ecef.distance(&self.center)
    }
}

impl<T: FloatScalar> Transform<T> for EcefToEnu<T> {
    type Point = Point3<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::EcefToEnu
    }

    fn compute_with(
        &mut self,
        _src: &[Point3<T>],
        _dst: &[Point3<T>],
        _settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        Err(Error::UnsupportedOperation(
            "an ENU frame is defined by its origin, not fitted",
        ))
    }

    fn transform(&self, p: Point3<T>, order: Order) -> Result<Point3<T>> {
        Ok(match order {
            Order::Direct => self.direct(p),
            Order::Inverse => self.inverse(p),
        })
    }

    fn transform_batch(&self, points: &[Point3<T>], order: Order) -> Result<Vec<Point3<T>>> {
        Ok(match order {
            Order::Direct => self.direct_batch(points),
            Order::Inverse => self.inverse_batch(points),
        })
    }
}
