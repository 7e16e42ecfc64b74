//! Tagged variants over each column of the kind lattice, and the
//! conversions along its edges.

use alloc::vec::Vec;

use super::{
    Affine2D, Affine3D, FitReport, FitSettings, Helmert2D, Helmert3D, Order, Rotation, Rotation3D,
    Scaling, Scaling3D, Transform, TransformKind, Translation, Translation3D,
};
use crate::error::{Error, Result};
use crate::geometry::{Point2, Point3};
use crate::traits::FloatScalar;
use crate::Matrix;

// ── Generalizing edges ──────────────────────────────────────────────

impl<T: FloatScalar> From<Translation<T>> for Helmert2D<T> {
    fn from(t: Translation<T>) -> Self {
        Helmert2D::from_coefficients(T::one(), T::zero(), t.tx, t.ty)
    }
}

impl<T: FloatScalar> From<Rotation<T>> for Helmert2D<T> {
    fn from(r: Rotation<T>) -> Self {
        Helmert2D::new(T::zero(), T::zero(), T::one(), r.angle)
    }
}

impl<T: FloatScalar> From<Scaling<T>> for Helmert2D<T> {
    fn from(s: Scaling<T>) -> Self {
        Helmert2D::from_coefficients(s.scale, T::zero(), T::zero(), T::zero())
    }
}

impl<T: FloatScalar> From<Helmert2D<T>> for Affine2D<T> {
    fn from(h: Helmert2D<T>) -> Self {
        Affine2D {
            a: h.a(),
            b: -h.b(),
            c: h.b(),
            d: h.a(),
            tx: h.tx,
            ty: h.ty,
        }
    }
}

impl<T: FloatScalar> From<Translation3D<T>> for Helmert3D<T> {
    fn from(t: Translation3D<T>) -> Self {
        Helmert3D::from_parts(t.tx, t.ty, t.tz, T::one(), Matrix::eye())
    }
}

impl<T: FloatScalar> From<Rotation3D<T>> for Helmert3D<T> {
    fn from(r: Rotation3D<T>) -> Self {
        Helmert3D::from_parts(T::zero(), T::zero(), T::zero(), T::one(), *r.matrix())
    }
}

impl<T: FloatScalar> From<Scaling3D<T>> for Helmert3D<T> {
    fn from(s: Scaling3D<T>) -> Self {
        Helmert3D::from_parts(T::zero(), T::zero(), T::zero(), s.scale, Matrix::eye())
    }
}

impl<T: FloatScalar> From<Helmert3D<T>> for Affine3D<T> {
    fn from(h: Helmert3D<T>) -> Self {
        let r = h.rotation_matrix();
        Affine3D::new(Matrix::from_fn(|i, j| h.scale * r[(i, j)]), h.tx, h.ty, h.tz)
    }
}

/// `parameter` of a `from → to` specialization must be within `tol` of its
/// identity value.
fn at_identity<T: FloatScalar>(
    from: TransformKind,
    to: TransformKind,
    parameter: &'static str,
    deviation: T,
    tol: T,
) -> Result<()> {
    if deviation.abs() <= tol {
        Ok(())
    } else {
        Err(Error::NotSpecializable {
            from,
            to,
            parameter,
        })
    }
}

/// Kinds from `to` up to and including `from`, most general last.
fn lattice_path(from: TransformKind, to: TransformKind) -> Result<Vec<TransformKind>> {
    if !to.generalizes_to(from) {
        return Err(Error::InvalidConversion { from, to });
    }
    let mut path = Vec::new();
    let mut k = Some(to);
    while let Some(kind) = k {
        path.push(kind);
        if kind == from {
            break;
        }
        k = kind.parent();
    }
    Ok(path)
}

macro_rules! dispatch {
    ($enum:ident { $($variant:ident),* }, $value:expr, $t:ident => $body:expr) => {
        match $value {
            $($enum::$variant($t) => $body,)*
        }
    };
}

// ── 2D ──────────────────────────────────────────────────────────────

/// Any planar transform kind.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transform2D<T> {
    Translation(Translation<T>),
    Rotation(Rotation<T>),
    Scaling(Scaling<T>),
    Helmert2D(Helmert2D<T>),
    Affine2D(Affine2D<T>),
}

macro_rules! each_2d {
    ($value:expr, $t:ident => $body:expr) => {
        dispatch!(Transform2D { Translation, Rotation, Scaling, Helmert2D, Affine2D }, $value, $t => $body)
    };
}

impl<T: FloatScalar> Transform2D<T> {
    /// Identity-parameter transform of a planar `kind`.
    pub fn identity(kind: TransformKind) -> Result<Self> {
        Ok(match kind {
            TransformKind::Translation => Translation::default().into(),
            TransformKind::Rotation => Rotation::default().into(),
            TransformKind::Scaling => Scaling::default().into(),
            TransformKind::Helmert2D => Helmert2D::default().into(),
            TransformKind::Affine2D => Affine2D::default().into(),
            _ => return Err(Error::UnsupportedOperation("not a planar transform kind")),
        })
    }

    /// Identity transform for a kind name such as `"similarity"`.
    ///
    /// ```
    /// use geotrf::transform::{Transform, Transform2D, TransformKind};
    /// let t = Transform2D::<f64>::from_name("Affine").unwrap();
    /// assert_eq!(t.kind(), TransformKind::Affine2D);
    /// ```
    pub fn from_name(name: &str) -> Result<Self> {
        Self::identity(name.parse()?)
    }

    pub fn inverse(&self) -> Result<Self> {
        each_2d!(self, t => Ok(t.inverse()?.into()))
    }

    fn generalize_step(self) -> Option<Self> {
        match self {
            Transform2D::Translation(t) => Some(Helmert2D::from(t).into()),
            Transform2D::Rotation(t) => Some(Helmert2D::from(t).into()),
            Transform2D::Scaling(t) => Some(Helmert2D::from(t).into()),
            Transform2D::Helmert2D(t) => Some(Affine2D::from(t).into()),
            Transform2D::Affine2D(_) => None,
        }
    }

    /// Lift into the more general kind `to`, filling the added parameters
    /// with identity values.
    pub fn generalize(&self, to: TransformKind) -> Result<Self> {
        let from = self.kind();
        if !from.generalizes_to(to) {
            return Err(Error::InvalidConversion { from, to });
        }
        let mut t = *self;
        while t.kind() != to {
            t = t
                .generalize_step()
                .ok_or(Error::InvalidConversion { from, to })?;
        }
        Ok(t)
    }

    /// Narrow into the more specific kind `to`. Every parameter dropped on
    /// the way must be within `tol` of identity.
    pub fn specialize(&self, to: TransformKind, tol: T) -> Result<Self> {
        let path = lattice_path(self.kind(), to)?;
        let mut t = *self;
        for &next in path.iter().rev().skip(1) {
            t = t.specialize_step(next, tol)?;
        }
        Ok(t)
    }

    fn specialize_step(&self, to: TransformKind, tol: T) -> Result<Self> {
        let from = self.kind();
        let check = |parameter, deviation| at_identity(from, to, parameter, deviation, tol);
        match (*self, to) {
            (Transform2D::Affine2D(a), TransformKind::Helmert2D) => {
                check("scale_y", a.a - a.d)?;
                check("skew", a.b + a.c)?;
                let two = T::lit(2.0);
                Ok(Helmert2D::from_coefficients((a.a + a.d) / two, (a.c - a.b) / two, a.tx, a.ty)
                    .into())
            }
            (Transform2D::Helmert2D(h), TransformKind::Translation) => {
                check("scale", h.scale() - T::one())?;
                check("rotation", h.rotation())?;
                Ok(Translation::new(h.tx, h.ty).into())
            }
            (Transform2D::Helmert2D(h), TransformKind::Rotation) => {
                check("scale", h.scale() - T::one())?;
                check("tx", h.tx)?;
                check("ty", h.ty)?;
                Ok(Rotation::new(h.rotation()).into())
            }
            (Transform2D::Helmert2D(h), TransformKind::Scaling) => {
                check("rotation", h.b())?;
                check("tx", h.tx)?;
                check("ty", h.ty)?;
                Ok(Scaling::new(h.a()).into())
            }
            _ => Err(Error::InvalidConversion { from, to }),
        }
    }
}

impl<T: FloatScalar> Transform<T> for Transform2D<T> {
    type Point = Point2<T>;

    fn kind(&self) -> TransformKind {
        each_2d!(self, t => t.kind())
    }

    fn compute_with(
        &mut self,
        src: &[Point2<T>],
        dst: &[Point2<T>],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        each_2d!(self, t => t.compute_with(src, dst, settings))
    }

    fn transform(&self, p: Point2<T>, order: Order) -> Result<Point2<T>> {
        each_2d!(self, t => t.transform(p, order))
    }

    fn transform_batch(&self, points: &[Point2<T>], order: Order) -> Result<Vec<Point2<T>>> {
        each_2d!(self, t => t.transform_batch(points, order))
    }
}

// ── 3D ──────────────────────────────────────────────────────────────

/// Any spatial transform kind.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "T: crate::traits::Scalar + serde::Serialize",
        deserialize = "T: crate::traits::Scalar + serde::Deserialize<'de>"
    ))
)]
pub enum Transform3D<T> {
    Translation3D(Translation3D<T>),
    Rotation3D(Rotation3D<T>),
    Scaling3D(Scaling3D<T>),
    Helmert3D(Helmert3D<T>),
    Affine3D(Affine3D<T>),
}

macro_rules! each_3d {
    ($value:expr, $t:ident => $body:expr) => {
        dispatch!(Transform3D { Translation3D, Rotation3D, Scaling3D, Helmert3D, Affine3D }, $value, $t => $body)
    };
}

impl<T: FloatScalar> Transform3D<T> {
    /// Identity-parameter transform of a spatial `kind`.
    pub fn identity(kind: TransformKind) -> Result<Self> {
        Ok(match kind {
            TransformKind::Translation3D => Translation3D::default().into(),
            TransformKind::Rotation3D => Rotation3D::default().into(),
            TransformKind::Scaling3D => Scaling3D::default().into(),
            TransformKind::Helmert3D => Helmert3D::default().into(),
            TransformKind::Affine3D => Affine3D::default().into(),
            _ => return Err(Error::UnsupportedOperation("not a spatial transform kind")),
        })
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::identity(name.parse()?)
    }

    pub fn inverse(&self) -> Result<Self> {
        each_3d!(self, t => Ok(t.inverse()?.into()))
    }

    fn generalize_step(self) -> Option<Self> {
        match self {
            Transform3D::Translation3D(t) => Some(Helmert3D::from(t).into()),
            Transform3D::Rotation3D(t) => Some(Helmert3D::from(t).into()),
            Transform3D::Scaling3D(t) => Some(Helmert3D::from(t).into()),
            Transform3D::Helmert3D(t) => Some(Affine3D::from(t).into()),
            Transform3D::Affine3D(_) => None,
        }
    }

    pub fn generalize(&self, to: TransformKind) -> Result<Self> {
        let from = self.kind();
        if !from.generalizes_to(to) {
            return Err(Error::InvalidConversion { from, to });
        }
        let mut t = *self;
        while t.kind() != to {
            t = t
                .generalize_step()
                .ok_or(Error::InvalidConversion { from, to })?;
        }
        Ok(t)
    }

    pub fn specialize(&self, to: TransformKind, tol: T) -> Result<Self> {
        let path = lattice_path(self.kind(), to)?;
        let mut t = *self;
        for &next in path.iter().rev().skip(1) {
            t = t.specialize_step(next, tol)?;
        }
        Ok(t)
    }

    fn specialize_step(&self, to: TransformKind, tol: T) -> Result<Self> {
        let from = self.kind();
        let check = |parameter, deviation| at_identity(from, to, parameter, deviation, tol);
        match (*self, to) {
            (Transform3D::Affine3D(a), TransformKind::Helmert3D) => {
                // A = s·R with s = ∛det A
                let det = a.det();
                if !(det > T::zero()) {
                    return Err(Error::NotSpecializable {
                        from,
                        to,
                        parameter: "scale",
                    });
                }
                let s = det.cbrt();
                let r = Matrix::from_fn(|i, j| a.linear[(i, j)] / s);
                check("shear", (r.transpose() * r).max_abs_diff(&Matrix::eye()))?;
                Ok(Helmert3D::from_parts(a.tx, a.ty, a.tz, s, r).into())
            }
            (Transform3D::Helmert3D(h), TransformKind::Translation3D) => {
                check("scale", h.scale - T::one())?;
                check("rotation", h.rotation_matrix().max_abs_diff(&Matrix::eye()))?;
                Ok(Translation3D::new(h.tx, h.ty, h.tz).into())
            }
            (Transform3D::Helmert3D(h), TransformKind::Rotation3D) => {
                check("scale", h.scale - T::one())?;
                check("tx", h.tx)?;
                check("ty", h.ty)?;
                check("tz", h.tz)?;
                let r = Rotation3D::from_matrix(*h.rotation_matrix(), tol).map_err(|_| {
                    Error::NotSpecializable {
                        from,
                        to,
                        parameter: "rotation",
                    }
                })?;
                Ok(r.into())
            }
            (Transform3D::Helmert3D(h), TransformKind::Scaling3D) => {
                check("rotation", h.rotation_matrix().max_abs_diff(&Matrix::eye()))?;
                check("tx", h.tx)?;
                check("ty", h.ty)?;
                check("tz", h.tz)?;
                Ok(Scaling3D::new(h.scale).into())
            }
            _ => Err(Error::InvalidConversion { from, to }),
        }
    }
}

impl<T: FloatScalar> Transform<T> for Transform3D<T> {
    type Point = Point3<T>;

    fn kind(&self) -> TransformKind {
        each_3d!(self, t => t.kind())
    }

    fn compute_with(
        &mut self,
        src: &[Point3<T>],
        dst: &[Point3<T>],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        each_3d!(self, t => t.compute_with(src, dst, settings))
    }

    fn transform(&self, p: Point3<T>, order: Order) -> Result<Point3<T>> {
        each_3d!(self, t => t.transform(p, order))
    }

    fn transform_batch(&self, points: &[Point3<T>], order: Order) -> Result<Vec<Point3<T>>> {
        each_3d!(self, t => t.transform_batch(points, order))
    }
}

macro_rules! impl_into_variant {
    ($enum:ident: $($variant:ident),*) => {
        $(
            impl<T> From<$variant<T>> for $enum<T> {
                fn from(t: $variant<T>) -> Self {
                    $enum::$variant(t)
                }
            }
        )*
    };
}

impl_into_variant!(Transform2D: Translation, Rotation, Scaling, Helmert2D, Affine2D);
impl_into_variant!(Transform3D: Translation3D, Rotation3D, Scaling3D, Helmert3D, Affine3D);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinates;

    const TOL: f64 = 1e-12;

    #[test]
    fn identity_by_name() {
        for name in ["translation", "rotation", "scaling", "similarity", "affine"] {
            let t = Transform2D::<f64>::from_name(name).unwrap();
            let p = Point2::new(3.0, -7.0);
            assert!(t.transform(p, Order::Direct).unwrap().distance(&p) < TOL);
        }
        assert!(Transform2D::<f64>::identity(TransformKind::Helmert3D).is_err());
        assert!(matches!(
            Transform3D::<f64>::from_name("warp"),
            Err(Error::UnknownTransformKind(_))
        ));
    }

    #[test]
    fn generalize_preserves_mapping() {
        let p = Point2::new(12.0, -4.0);
        let parts: [Transform2D<f64>; 3] = [
            Translation::new(3.0, 1.0).into(),
            Rotation::new(0.7).into(),
            Scaling::new(2.5).into(),
        ];
        for t in parts {
            let g = t.generalize(TransformKind::Affine2D).unwrap();
            assert_eq!(g.kind(), TransformKind::Affine2D);
            let a = t.transform(p, Order::Direct).unwrap();
            let b = g.transform(p, Order::Direct).unwrap();
            assert!(a.distance(&b) < 1e-12);
        }
        let r: Transform2D<f64> = Rotation::new(0.7).into();
        assert_eq!(
            r.generalize(TransformKind::Translation).unwrap_err(),
            Error::InvalidConversion {
                from: TransformKind::Rotation,
                to: TransformKind::Translation
            }
        );
    }

    #[test]
    fn generalize_fills_identity_parameters() {
        let theta = 0.7_f64;
        let h = Helmert2D::from(Rotation::new(theta));
        assert!((h.scale() - 1.0).abs() < TOL);
        assert_eq!((h.tx, h.ty), (0.0, 0.0));
        assert!((h.rotation() - theta).abs() < TOL);
        let a = Affine2D::from(h);
        assert!((a.scale_x() - 1.0).abs() < TOL && (a.scale_y() - 1.0).abs() < TOL);
        assert!((a.rotation() - theta).abs() < TOL);
        assert_eq!((a.tx, a.ty), (0.0, 0.0));

        let h = Helmert2D::from(Translation::new(3.0_f64, -1.0));
        assert_eq!((h.tx, h.ty, h.scale(), h.rotation()), (3.0, -1.0, 1.0, 0.0));
        let h = Helmert2D::from(Scaling::new(2.5_f64));
        assert_eq!((h.tx, h.ty, h.scale(), h.rotation()), (0.0, 0.0, 2.5, 0.0));

        let h = Helmert3D::from(Rotation3D::new(0.1_f64, -0.2, 0.3));
        assert_eq!(h.scale, 1.0);
        assert_eq!((h.tx, h.ty, h.tz), (0.0, 0.0, 0.0));
        assert!((h.omega() - 0.1).abs() < TOL);
        assert!((h.phi() + 0.2).abs() < TOL);
        assert!((h.kappa() - 0.3).abs() < TOL);
        for s in Affine3D::from(h).scale() {
            assert!((s - 1.0).abs() < TOL);
        }
    }

    #[test]
    fn inverse_verdict_survives_generalizing() {
        for scale in [0.0_f64, 1e-9, 1.0, 2.0e3] {
            let s = Scaling3D::new(scale);
            let h = Helmert3D::from(s);
            let a = Affine3D::from(h);
            assert_eq!(s.inverse().is_ok(), h.inverse().is_ok(), "scale {}", scale);
            assert_eq!(h.inverse().is_ok(), a.inverse().is_ok(), "scale {}", scale);
            let r = Helmert3D::new(1.0, 2.0, 3.0, scale, 0.1, 0.2, 0.3);
            assert_eq!(r.inverse().is_ok(), Affine3D::from(r).inverse().is_ok());
            assert_eq!(r.inverse().is_ok(), scale != 0.0);
        }
    }

    #[test]
    fn specialize_checks_discarded_parameters() {
        let h: Transform2D<f64> = Helmert2D::new(0.0, 0.0, 1.0, 0.4).into();
        let a = h.generalize(TransformKind::Affine2D).unwrap();
        let r = a.specialize(TransformKind::Rotation, 1e-9).unwrap();
        assert!(matches!(r, Transform2D::Rotation(rot) if (rot.angle - 0.4).abs() < 1e-12));

        assert_eq!(
            a.specialize(TransformKind::Translation, 1e-9).unwrap_err(),
            Error::NotSpecializable {
                from: TransformKind::Helmert2D,
                to: TransformKind::Translation,
                parameter: "rotation"
            }
        );

        let skewed: Transform2D<f64> = Affine2D::new(0.0, 0.0, 1.0, 2.0, 0.0).into();
        assert_eq!(
            skewed.specialize(TransformKind::Helmert2D, 1e-9).unwrap_err(),
            Error::NotSpecializable {
                from: TransformKind::Affine2D,
                to: TransformKind::Helmert2D,
                parameter: "scale_y"
            }
        );
    }

    #[test]
    fn spatial_lattice() {
        let r: Transform3D<f64> = Rotation3D::new(0.1, 0.2, -0.3).into();
        let a = r.generalize(TransformKind::Affine3D).unwrap();
        let p = Point3::new(1.0, -2.0, 5.0);
        let q = a.transform(p, Order::Direct).unwrap();
        assert!(q.distance(&r.transform(p, Order::Direct).unwrap()) < 1e-12);

        let back = a.specialize(TransformKind::Rotation3D, 1e-9).unwrap();
        assert_eq!(back.kind(), TransformKind::Rotation3D);
        assert!(back.transform(p, Order::Direct).unwrap().distance(&q) < 1e-12);

        let scaled: Transform3D<f64> = Helmert3D::new(1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0).into();
        assert_eq!(
            scaled.specialize(TransformKind::Scaling3D, 1e-9).unwrap_err(),
            Error::NotSpecializable {
                from: TransformKind::Helmert3D,
                to: TransformKind::Scaling3D,
                parameter: "tx"
            }
        );

        let sheared: Transform3D<f64> = Affine3D::new(
            Matrix::new([[1.0, 0.5, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]),
            0.0,
            0.0,
            0.0,
        )
        .into();
        assert!(matches!(
            sheared.specialize(TransformKind::Helmert3D, 1e-9),
            Err(Error::NotSpecializable { parameter: "shear", .. })
        ));
    }

    #[test]
    fn fit_through_variant() {
        let mut t = Transform2D::<f64>::identity(TransformKind::Helmert2D).unwrap();
        let src = [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        let dst = [Point2::new(1.0, 1.0), Point2::new(1.0, 3.0)];
        t.compute(&src, &dst).unwrap();
        let inv = t.inverse().unwrap();
        assert!(inv.transform(dst[1], Order::Direct).unwrap().distance(&src[1]) < 1e-12);
    }
}
