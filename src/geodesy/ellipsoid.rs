use alloc::borrow::Cow;

use crate::error::{Error, Result};
use crate::geometry::Point3;
use crate::traits::FloatScalar;

const MAX_ITERATIONS: usize = 64;

/// Reference ellipsoid of revolution.
///
/// Geographic points are `(longitude°, latitude°, ellipsoidal height)`.
///
/// ```
/// use geotrf::geodesy::Ellipsoid;
/// use geotrf::geometry::Point3;
///
/// let wgs84 = Ellipsoid::<f64>::wgs84();
/// let ecef = wgs84.geodetic_to_geocentric(Point3::new(0.0, 0.0, 0.0));
/// assert!((ecef.x - 6378137.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ellipsoid<T> {
    pub name: Cow<'static, str>,
    /// Semi-major axis in metres.
    pub a: T,
    /// Flattening.
    pub f: T,
}

impl<T: FloatScalar> Ellipsoid<T> {
    pub fn new(name: impl Into<Cow<'static, str>>, a: T, f: T) -> Self {
        Self {
            name: name.into(),
            a,
            f,
        }
    }

    pub fn from_inverse_flattening(name: impl Into<Cow<'static, str>>, a: T, rf: T) -> Self {
        Self::new(name, a, T::one() / rf)
    }

    pub fn wgs84() -> Self {
        Self::from_inverse_flattening("WGS 84", T::lit(6378137.0), T::lit(298.257223563))
    }

    pub fn grs80() -> Self {
        Self::from_inverse_flattening("GRS 1980", T::lit(6378137.0), T::lit(298.257222101))
    }

    /// Semi-minor axis.
    pub fn b(&self) -> T {
        self.a * (T::one() - self.f)
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> T {
        self.f * (T::lit(2.0) - self.f)
    }

    /// Second eccentricity squared.
    pub fn second_e2(&self) -> T {
        let e2 = self.e2();
        e2 / (T::one() - e2)
    }

    /// Prime-vertical radius of curvature at `latitude` (radians).
    pub fn prime_vertical_radius(&self, latitude: T) -> T {
        let s = latitude.sin();
        self.a / (T::one() - self.e2() * s * s).sqrt()
    }

    pub fn geodetic_to_geocentric(&self, p: Point3<T>) -> Point3<T> {
        let lon = p.x.to_radians();
        let lat = p.y.to_radians();
        let h = p.z;
        let n = self.prime_vertical_radius(lat);
        let (sl, cl) = lon.sin_cos();
        let (sp, cp) = lat.sin_cos();
        Point3::new(
            (n + h) * cp * cl,
            (n + h) * cp * sl,
            (n * (T::one() - self.e2()) + h) * sp,
        )
    }

    /// Iterates the latitude from the Bowring start value until it moves by
    /// less than `1e-12` rad.
    pub fn geocentric_to_geodetic(&self, p: Point3<T>) -> Result<Point3<T>> {
        let e2 = self.e2();
        let r = p.x.hypot(p.y);
        let lon = p.y.atan2(p.x);
        let tol = T::lit(1e-12).max(T::lit(4.0) * T::epsilon());

        let height = |lat: T| {
            let n = self.prime_vertical_radius(lat);
            if r > p.z.abs() {
                r / lat.cos() - n
            } else {
                p.z / lat.sin() - n * (T::one() - e2)
            }
        };

        // Bowring's parametric start
        let u = (p.z * self.a).atan2(r * self.b());
        let (su, cu) = u.sin_cos();
        let ep2 = self.second_e2();
        let mut lat = (p.z + ep2 * self.b() * su * su * su).atan2(r - e2 * self.a * cu * cu * cu);

        for iter in 0..MAX_ITERATIONS {
            let n = self.prime_vertical_radius(lat);
            let h = height(lat);
            let next = p.z.atan2(r * (T::one() - e2 * n / (n + h)));
            let step = (next - lat).abs();
            lat = next;
            if step < tol {
                log::trace!("geodetic latitude converged in {} iterations", iter + 1);
                return Ok(Point3::new(lon.to_degrees(), lat.to_degrees(), height(lat)));
            }
        }
        Err(Error::ConvergenceFailure)
    }
}
