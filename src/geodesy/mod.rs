//! Geodetic support for the transform layer: reference ellipsoids, the
//! local East-North-Up frame and CRS conversion through a delegate.
//!
//! | Item | Role |
//! |------|------|
//! | [`Ellipsoid`] | WGS 84 / GRS 1980 constants, geodetic ↔ geocentric |
//! | [`enu_rotation`], [`EcefToEnu`] | Rigid geocentric ↔ ENU frame at an origin |
//! | [`CrsDelegate`] | Resolves definitions and converts points |
//! | [`EllipsoidalDelegate`] | Built-in delegate for geographic and geocentric systems |
//! | [`CrsCache`] | Memoised definition → handle lookup |
//! | [`CrsTransform`] | Source ↔ target conversion as a [`Transform`](crate::transform::Transform) |
//! | [`EnuFrame`] | Any known system ↔ local ENU |

mod crs;
mod ellipsoid;
mod enu;

pub use crs::{Crs, CrsCache, CrsDelegate, CrsKind, CrsTransform, EllipsoidalDelegate, EnuFrame};
pub use ellipsoid::Ellipsoid;
pub use enu::{enu_rotation, EcefToEnu, DEFAULT_VALIDITY_RADIUS};
