//! Geometric coordinate transforms and their estimation from point
//! correspondences.
//!
//! Every transform implements [`Transform`]: it reports its
//! [`TransformKind`], fits its parameters with [`compute`](Transform::compute)
//! and maps points in either [`Order`].
//!
//! Kinds form a lattice ordered by generality:
//!
//! ```text
//! Translation ─┐                      Translation3D ─┐
//! Rotation    ─┼─ Helmert2D ─ Affine2D  Rotation3D ─┼─ Helmert3D ─ Affine3D
//! Scaling     ─┘                      Scaling3D   ─┘
//! ```
//!
//! [`Transform2D`] and [`Transform3D`] are the tagged variants over each
//! column, with the name factory and the `generalize` / `specialize`
//! conversions.
//!
//! # Example
//!
//! ```
//! use geotrf::geometry::Point2;
//! use geotrf::transform::{Helmert2D, Order, Transform};
//!
//! let truth = Helmert2D::new(10.0_f64, -5.0, 2.0, 0.3);
//! let src = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
//! let dst: Vec<_> = src.iter().map(|&p| truth.transform(p, Order::Direct).unwrap()).collect();
//!
//! let mut fitted = Helmert2D::default();
//! let report = fitted.compute(&src, &dst).unwrap();
//! assert!(report.rmse < 1e-9);
//! assert!((fitted.scale() - 2.0).abs() < 1e-12);
//! ```

use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};
use crate::geometry::Coordinates;
use crate::traits::FloatScalar;

mod affine2d;
mod affine3d;
mod chain;
pub(crate) mod fit;
mod helmert2d;
mod helmert3d;
mod lattice;
mod rotation;
mod rotation3d;
mod scaling;
mod scaling3d;
mod translation;
mod translation3d;

pub use affine2d::Affine2D;
pub use affine3d::Affine3D;
pub use chain::TransformChain;
pub use helmert2d::Helmert2D;
pub use helmert3d::{frame_rotation, Helmert3D};
pub use lattice::{Transform2D, Transform3D};
pub use rotation::Rotation;
pub(crate) use rotation3d::check_rotation;
pub use rotation3d::Rotation3D;
pub use scaling::Scaling;
pub use scaling3d::Scaling3D;
pub use translation::Translation;
pub use translation3d::Translation3D;

/// A linear part is singular when `|det| ≤ ε·mⁿ`, with `m` its largest
/// coefficient magnitude and `n` the dimension. Shared by every inverse so
/// that all kinds agree on what "no inverse" means.
pub(crate) fn check_invertible<T: FloatScalar>(
    det: T,
    largest: T,
    dim: i32,
    what: &'static str,
) -> Result<()> {
    if !(det.abs() > T::epsilon() * largest.abs().powi(dim)) || !det.is_finite() {
        return Err(Error::DegenerateConfiguration(what));
    }
    Ok(())
}

// ── Kinds ───────────────────────────────────────────────────────────

/// The closed set of transform kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransformKind {
    Translation,
    Rotation,
    Scaling,
    Helmert2D,
    Affine2D,
    Translation3D,
    Rotation3D,
    Scaling3D,
    Helmert3D,
    Affine3D,
    /// An ordered composition of 2D transforms.
    Chain,
    /// Conversion between two coordinate reference systems.
    Crs,
    /// Geocentric to local East-North-Up.
    EcefToEnu,
}

impl TransformKind {
    /// Every kind, in declaration order.
    pub const ALL: [TransformKind; 13] = [
        TransformKind::Translation,
        TransformKind::Rotation,
        TransformKind::Scaling,
        TransformKind::Helmert2D,
        TransformKind::Affine2D,
        TransformKind::Translation3D,
        TransformKind::Rotation3D,
        TransformKind::Scaling3D,
        TransformKind::Helmert3D,
        TransformKind::Affine3D,
        TransformKind::Chain,
        TransformKind::Crs,
        TransformKind::EcefToEnu,
    ];

    /// Fewest correspondences that determine the parameters. Zero for
    /// kinds that cannot be fitted.
    pub const fn min_points(self) -> usize {
        match self {
            TransformKind::Translation
            | TransformKind::Rotation
            | TransformKind::Scaling
            | TransformKind::Translation3D
            | TransformKind::Scaling3D => 1,
            TransformKind::Helmert2D | TransformKind::Rotation3D => 2,
            TransformKind::Affine2D | TransformKind::Helmert3D => 3,
            TransformKind::Affine3D => 4,
            TransformKind::Chain | TransformKind::Crs | TransformKind::EcefToEnu => 0,
        }
    }

    /// Number of free parameters.
    pub const fn parameter_count(self) -> usize {
        match self {
            TransformKind::Rotation | TransformKind::Scaling | TransformKind::Scaling3D => 1,
            TransformKind::Translation => 2,
            TransformKind::Translation3D | TransformKind::Rotation3D => 3,
            TransformKind::Helmert2D => 4,
            TransformKind::Affine2D => 6,
            TransformKind::Helmert3D => 7,
            TransformKind::Affine3D => 12,
            TransformKind::Chain | TransformKind::Crs | TransformKind::EcefToEnu => 0,
        }
    }

    /// Point dimension the kind operates on.
    pub const fn dimension(self) -> usize {
        match self {
            TransformKind::Translation
            | TransformKind::Rotation
            | TransformKind::Scaling
            | TransformKind::Helmert2D
            | TransformKind::Affine2D
            | TransformKind::Chain => 2,
            _ => 3,
        }
    }

    /// The next more general kind in the lattice.
    pub const fn parent(self) -> Option<TransformKind> {
        match self {
            TransformKind::Translation | TransformKind::Rotation | TransformKind::Scaling => {
                Some(TransformKind::Helmert2D)
            }
            TransformKind::Helmert2D => Some(TransformKind::Affine2D),
            TransformKind::Translation3D | TransformKind::Rotation3D | TransformKind::Scaling3D => {
                Some(TransformKind::Helmert3D)
            }
            TransformKind::Helmert3D => Some(TransformKind::Affine3D),
            _ => None,
        }
    }

    /// Whether `self` can be generalized into `other` (reflexive).
    pub fn generalizes_to(self, other: TransformKind) -> bool {
        let mut k = Some(self);
        while let Some(kind) = k {
            if kind == other {
                return true;
            }
            k = kind.parent();
        }
        false
    }

    fn name(self) -> &'static str {
        match self {
            TransformKind::Translation => "Translation",
            TransformKind::Rotation => "Rotation",
            TransformKind::Scaling => "Scaling",
            TransformKind::Helmert2D => "Helmert2D",
            TransformKind::Affine2D => "Affine2D",
            TransformKind::Translation3D => "Translation3D",
            TransformKind::Rotation3D => "Rotation3D",
            TransformKind::Scaling3D => "Scaling3D",
            TransformKind::Helmert3D => "Helmert3D",
            TransformKind::Affine3D => "Affine3D",
            TransformKind::Chain => "Chain",
            TransformKind::Crs => "Crs",
            TransformKind::EcefToEnu => "EcefToEnu",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformKind {
    type Err = Error;

    /// Case-insensitive; `_`, `-` and spaces are ignored.
    ///
    /// ```
    /// use geotrf::transform::TransformKind;
    /// assert_eq!("similarity".parse::<TransformKind>().unwrap(), TransformKind::Helmert2D);
    /// assert_eq!("Helmert_3D".parse::<TransformKind>().unwrap(), TransformKind::Helmert3D);
    /// assert!("projective".parse::<TransformKind>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let key: alloc::string::String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        let kind = match key.as_str() {
            "translation" | "translation2d" | "shift" => TransformKind::Translation,
            "rotation" | "rotation2d" => TransformKind::Rotation,
            "scaling" | "scale" | "scaling2d" => TransformKind::Scaling,
            "helmert2d" | "helmert" | "similarity" | "similarity2d" => TransformKind::Helmert2D,
            "affine" | "affine2d" => TransformKind::Affine2D,
            "translation3d" => TransformKind::Translation3D,
            "rotation3d" => TransformKind::Rotation3D,
            "scaling3d" | "scale3d" => TransformKind::Scaling3D,
            "helmert3d" | "similarity3d" | "sevenparameter" => TransformKind::Helmert3D,
            "affine3d" => TransformKind::Affine3D,
            "chain" | "multiple" => TransformKind::Chain,
            "crs" => TransformKind::Crs,
            "eceftoenu" | "enu" => TransformKind::EcefToEnu,
            _ => return Err(Error::UnknownTransformKind(s.into())),
        };
        Ok(kind)
    }
}

// ── Settings and reports ────────────────────────────────────────────

/// Mapping direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Order {
    /// Source to destination.
    #[default]
    Direct,
    /// Destination to source.
    Inverse,
}

impl Order {
    pub fn reversed(self) -> Self {
        match self {
            Order::Direct => Order::Inverse,
            Order::Inverse => Order::Direct,
        }
    }
}

/// Numerical settings for fitting and for `specialize`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSettings<T> {
    /// Design-matrix rank cutoff, relative to the largest singular value
    /// (or the largest entry, for exactly determined systems).
    pub rank_tolerance: T,
    /// Absolute tolerance for "parameter is at identity".
    pub identity_tolerance: T,
}

impl<T: FloatScalar> Default for FitSettings<T> {
    fn default() -> Self {
        Self {
            rank_tolerance: T::lit(4096.0) * T::epsilon(),
            identity_tolerance: T::epsilon().sqrt(),
        }
    }
}

/// How a fit was solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitStrategy {
    /// Square system at the minimum point count, solved by LU.
    Exact,
    /// Over-determined system, solved by SVD.
    LeastSquares,
    /// SVD-based orthogonal Procrustes / Umeyama.
    ClosedForm,
}

/// Outcome of a fit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitReport<T> {
    /// Distance between `transform(srcᵢ)` and `dstᵢ`, per point.
    pub residuals: Vec<T>,
    /// Root-mean-square error corrected for the degrees of freedom.
    pub rmse: T,
    pub strategy: FitStrategy,
}

impl<T: FloatScalar> FitReport<T> {
    pub fn max_residual(&self) -> T {
        self.residuals.iter().fold(T::zero(), |m, &r| m.max(r))
    }
}

// ── The capability ──────────────────────────────────────────────────

/// A coordinate transform that can be fitted and applied.
///
/// `compute` mutates the parameters and `transform` reads them, so an
/// instance being fitted must not be shared. Clone it instead.
pub trait Transform<T: FloatScalar> {
    type Point: Coordinates<T>;

    fn kind(&self) -> TransformKind;

    fn min_points(&self) -> usize {
        self.kind().min_points()
    }

    /// Fit the parameters to `src → dst` with explicit settings.
    ///
    /// Fails with [`Error::InsufficientPoints`] below
    /// [`min_points`](Self::min_points) and with
    /// [`Error::DegenerateConfiguration`] when the correspondences do not
    /// determine the parameters.
    fn compute_with(
        &mut self,
        src: &[Self::Point],
        dst: &[Self::Point],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>>;

    /// Fit with [`FitSettings::default`].
    fn compute(&mut self, src: &[Self::Point], dst: &[Self::Point]) -> Result<FitReport<T>> {
        self.compute_with(src, dst, &FitSettings::default())
    }

    /// Map one point.
    fn transform(&self, point: Self::Point, order: Order) -> Result<Self::Point>;

    /// Map a sequence of points, preserving order.
    fn transform_batch(&self, points: &[Self::Point], order: Order) -> Result<Vec<Self::Point>> {
        points.iter().map(|&p| self.transform(p, order)).collect()
    }

    /// Map a sequence of points into `out`, which is cleared first.
    fn transform_into(
        &self,
        points: &[Self::Point],
        out: &mut Vec<Self::Point>,
        order: Order,
    ) -> Result<()> {
        out.clear();
        out.reserve(points.len());
        for &p in points {
            out.push(self.transform(p, order)?);
        }
        Ok(())
    }
}
