//! Coordinate reference systems behind a pluggable delegate.
//!
//! The projection mathematics live in the delegate. This module only fixes
//! the point-in/point-out contract around it and composes it with the
//! local ENU frame.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use super::{EcefToEnu, Ellipsoid};
use crate::error::{Error, Result};
use crate::geometry::Point3;
use crate::traits::FloatScalar;
use crate::transform::{FitReport, FitSettings, Order, Transform, TransformKind};

/// Resolves CRS definitions and converts points between them.
pub trait CrsDelegate {
    type Scalar: FloatScalar;
    /// Resolved reference system.
    type Handle: Clone + PartialEq + fmt::Debug;

    /// Resolve a definition such as `"EPSG:4326"`.
    fn resolve(&self, definition: &str) -> Result<Self::Handle>;

    fn convert(
        &self,
        from: &Self::Handle,
        to: &Self::Handle,
        point: Point3<Self::Scalar>,
    ) -> Result<Point3<Self::Scalar>>;

    /// Geocentric system on the same datum as `handle`.
    fn geocentric(&self, handle: &Self::Handle) -> Result<Self::Handle>;

    /// Geographic 3D system on the same datum as `handle`.
    fn geographic(&self, handle: &Self::Handle) -> Result<Self::Handle>;
}

// ── Built-in ellipsoidal delegate ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrsKind {
    /// `(longitude°, latitude°, ellipsoidal height)`.
    Geographic,
    /// Earth-centred, Earth-fixed `(X, Y, Z)`.
    Geocentric,
}

/// A resolved reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct Crs<T> {
    pub code: u32,
    pub kind: CrsKind,
    pub ellipsoid: Ellipsoid<T>,
}

impl<T: FloatScalar> Crs<T> {
    pub fn epsg_code(&self) -> u32 {
        self.code
    }

    pub fn is_geographic(&self) -> bool {
        self.kind == CrsKind::Geographic
    }

    pub fn is_geocentric(&self) -> bool {
        self.kind == CrsKind::Geocentric
    }

    pub fn definition(&self) -> String {
        alloc::format!("EPSG:{}", self.code)
    }

    fn native_to_ecef(&self, p: Point3<T>) -> Point3<T> {
        match self.kind {
            CrsKind::Geographic => self.ellipsoid.geodetic_to_geocentric(p),
            CrsKind::Geocentric => p,
        }
    }

    fn ecef_to_native(&self, p: Point3<T>) -> Result<Point3<T>> {
        match self.kind {
            CrsKind::Geographic => self.ellipsoid.geocentric_to_geodetic(p),
            CrsKind::Geocentric => Ok(p),
        }
    }
}

/// Geographic and geocentric systems of WGS 84 and ETRS89.
///
/// Every conversion goes through geocentric coordinates. No datum shift is
/// applied between systems.
///
/// ```
/// use geotrf::geodesy::{CrsDelegate, EllipsoidalDelegate};
/// use geotrf::geometry::Point3;
///
/// let d = EllipsoidalDelegate::<f64>::new();
/// let geo = d.resolve("EPSG:4979").unwrap();
/// let ecef = d.resolve("EPSG:4978").unwrap();
/// let x = d.convert(&geo, &ecef, Point3::new(0.0, 0.0, 0.0)).unwrap();
/// assert!((x.x - 6378137.0).abs() < 1e-6);
/// assert!(d.resolve("EPSG:25830").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct EllipsoidalDelegate<T> {
    known: Vec<Crs<T>>,
}

impl<T: FloatScalar> Default for EllipsoidalDelegate<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FloatScalar> EllipsoidalDelegate<T> {
    pub fn new() -> Self {
        let wgs84 = Ellipsoid::wgs84();
        let grs80 = Ellipsoid::grs80();
        let crs = |code, kind, ellipsoid: &Ellipsoid<T>| Crs {
            code,
            kind,
            ellipsoid: ellipsoid.clone(),
        };
        Self {
            known: alloc::vec![
                crs(4326, CrsKind::Geographic, &wgs84),
                crs(4979, CrsKind::Geographic, &wgs84),
                crs(4978, CrsKind::Geocentric, &wgs84),
                crs(4258, CrsKind::Geographic, &grs80),
                crs(4937, CrsKind::Geographic, &grs80),
                crs(4936, CrsKind::Geocentric, &grs80),
            ],
        }
    }

    /// Make another system resolvable. A code already known is replaced.
    pub fn register(&mut self, crs: Crs<T>) {
        self.known.retain(|c| c.code != crs.code);
        self.known.push(crs);
    }

    fn by_code(&self, code: u32) -> Option<&Crs<T>> {
        self.known.iter().find(|c| c.code == code)
    }

    fn sibling(&self, handle: &Crs<T>, kind: CrsKind) -> Result<Crs<T>> {
        if handle.kind == kind {
            return Ok(handle.clone());
        }
        self.known
            .iter()
            .find(|c| c.kind == kind && c.ellipsoid == handle.ellipsoid)
            .cloned()
            .ok_or_else(|| Error::InvalidCrsDefinition(handle.definition()))
    }
}

/// `EPSG:<code>`, authority case-insensitive.
fn parse_epsg(definition: &str) -> Option<u32> {
    let (authority, code) = definition.trim().split_once(':')?;
    if !authority.trim().eq_ignore_ascii_case("epsg") {
        return None;
    }
    code.trim().parse().ok()
}

impl<T: FloatScalar> CrsDelegate for EllipsoidalDelegate<T> {
    type Scalar = T;
    type Handle = Crs<T>;

    fn resolve(&self, definition: &str) -> Result<Crs<T>> {
        parse_epsg(definition)
            .and_then(|code| self.by_code(code))
            .cloned()
            .ok_or_else(|| Error::InvalidCrsDefinition(definition.to_string()))
    }

    fn convert(&self, from: &Crs<T>, to: &Crs<T>, point: Point3<T>) -> Result<Point3<T>> {
        if from.kind == to.kind && from.ellipsoid == to.ellipsoid {
            return Ok(point);
        }
        to.ecef_to_native(from.native_to_ecef(point))
    }

    fn geocentric(&self, handle: &Crs<T>) -> Result<Crs<T>> {
        self.sibling(handle, CrsKind::Geocentric)
    }

    fn geographic(&self, handle: &Crs<T>) -> Result<Crs<T>> {
        self.sibling(handle, CrsKind::Geographic)
    }
}

// ── Cache ───────────────────────────────────────────────────────────

/// Memoises resolved handles by definition string.
pub struct CrsCache<D: CrsDelegate> {
    delegate: Arc<D>,
    handles: BTreeMap<String, D::Handle>,
}

impl<D: CrsDelegate> CrsCache<D> {
    pub fn new(delegate: Arc<D>) -> Self {
        Self {
            delegate,
            handles: BTreeMap::new(),
        }
    }

    pub fn delegate(&self) -> &Arc<D> {
        &self.delegate
    }

    /// The handle for `definition`, resolving it on first use. Failed
    /// resolutions are not cached.
    pub fn get(&mut self, definition: &str) -> Result<D::Handle> {
        if let Some(h) = self.handles.get(definition) {
            return Ok(h.clone());
        }
        let h = self.delegate.resolve(definition)?;
        log::debug!("resolved CRS `{}`", definition);
        self.handles.insert(definition.to_string(), h.clone());
        Ok(h)
    }

    /// A transform between two definitions, resolved through the cache.
    pub fn transform(&mut self, source: &str, target: &str) -> Result<CrsTransform<D>> {
        let s = self.get(source)?;
        let t = self.get(target)?;
        Ok(CrsTransform::from_handles(self.delegate.clone(), s, t))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

// ── Transforms ──────────────────────────────────────────────────────

/// Point conversion between two resolved reference systems.
///
/// `Order::Direct` maps source to target, `Order::Inverse` target to
/// source. Delegate errors pass through unchanged.
pub struct CrsTransform<D: CrsDelegate> {
    delegate: Arc<D>,
    source: D::Handle,
    target: D::Handle,
}

impl<D: CrsDelegate> Clone for CrsTransform<D> {
    fn clone(&self) -> Self {
        Self {
            delegate: self.delegate.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }
}

impl<D: CrsDelegate> fmt::Debug for CrsTransform<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrsTransform")
            .field("source", &self.source)
            .field("target", &self.target)
            .finish()
    }
}

impl<D: CrsDelegate> CrsTransform<D> {
    pub fn new(delegate: Arc<D>, source: &str, target: &str) -> Result<Self> {
        let s = delegate.resolve(source)?;
        let t = delegate.resolve(target)?;
        Ok(Self::from_handles(delegate, s, t))
    }

    pub fn from_handles(delegate: Arc<D>, source: D::Handle, target: D::Handle) -> Self {
        Self {
            delegate,
            source,
            target,
        }
    }

    pub fn source(&self) -> &D::Handle {
        &self.source
    }

    pub fn target(&self) -> &D::Handle {
        &self.target
    }

    /// The same pair of systems, swapped.
    pub fn reversed(&self) -> Self {
        Self::from_handles(self.delegate.clone(), self.target.clone(), self.source.clone())
    }

    pub fn direct(&self, p: Point3<D::Scalar>) -> Result<Point3<D::Scalar>> {
        self.delegate.convert(&self.source, &self.target, p)
    }

    pub fn inverse(&self, p: Point3<D::Scalar>) -> Result<Point3<D::Scalar>> {
        self.delegate.convert(&self.target, &self.source, p)
    }
}

impl<D: CrsDelegate> Transform<D::Scalar> for CrsTransform<D> {
    type Point = Point3<D::Scalar>;

    fn kind(&self) -> TransformKind {
        TransformKind::Crs
    }

    fn compute_with(
        &mut self,
        _src: &[Self::Point],
        _dst: &[Self::Point],
        _settings: &FitSettings<D::Scalar>,
    ) -> Result<FitReport<D::Scalar>> {
        Err(Error::UnsupportedOperation(
            "a CRS transform is defined by its systems, not fitted",
        ))
    }

    fn transform(&self, p: Self::Point, order: Order) -> Result<Self::Point> {
        match order {
            Order::Direct => self.direct(p),
            Order::Inverse => self.inverse(p),
        }
    }
}

/// Local East-North-Up frame for points given in any system the delegate
/// knows.
///
/// Composes the conversion to the geocentric system of the same datum with
/// an [`EcefToEnu`] anchored at `origin`.
pub struct EnuFrame<D: CrsDelegate> {
    to_geocentric: CrsTransform<D>,
    enu: EcefToEnu<D::Scalar>,
}

impl<D: CrsDelegate> EnuFrame<D> {
    /// `origin` is expressed in the `source` system.
    pub fn new(delegate: Arc<D>, source: &str, origin: Point3<D::Scalar>) -> Result<Self> {
        let src = delegate.resolve(source)?;
        let geocentric = delegate.geocentric(&src)?;
        let geographic = delegate.geographic(&src)?;
        let center = delegate.convert(&src, &geocentric, origin)?;
        let geo = delegate.convert(&src, &geographic, origin)?;
        let enu = EcefToEnu::from_geodetic(center, geo.x, geo.y);
        log::debug!(
            "ENU frame at lon {:?}, lat {:?}, h {:?}",
            geo.x,
            geo.y,
            geo.z
        );
        Ok(Self {
            to_geocentric: CrsTransform::from_handles(delegate, src, geocentric),
            enu,
        })
    }

    pub fn ecef_to_enu(&self) -> &EcefToEnu<D::Scalar> {
        &self.enu
    }

    pub fn direct(&self, p: Point3<D::Scalar>) -> Result<Point3<D::Scalar>> {
        Ok(self.enu.direct(self.to_geocentric.direct(p)?))
    }

    pub fn inverse(&self, enu: Point3<D::Scalar>) -> Result<Point3<D::Scalar>> {
        self.to_geocentric.inverse(self.enu.inverse(enu))
    }
}

impl<D: CrsDelegate> Transform<D::Scalar> for EnuFrame<D> {
    type Point = Point3<D::Scalar>;

    fn kind(&self) -> TransformKind {
        TransformKind::EcefToEnu
    }

    fn compute_with(
        &mut self,
        _src: &[Self::Point],
        _dst: &[Self::Point],
        _settings: &FitSettings<D::Scalar>,
    ) -> Result<FitReport<D::Scalar>> {
        Err(Error::UnsupportedOperation(
            "an ENU frame is defined by its origin, not fitted",
        ))
    }

    fn transform(&self, p: Self::Point, order: Order) -> Result<Self::Point> {
        match order {
            Order::Direct => self.direct(p),
            Order::Inverse => self.inverse(p),
        }
    }
}
