use super::fit::{check_counts, report, solve_design};
use super::{check_invertible, FitReport, FitSettings, Order, Transform, TransformKind};
use crate::error::{Error, Result};
use crate::geometry::Point2;
use crate::matrix::Matrix2x3;
use crate::traits::FloatScalar;
use crate::{DynMatrix, Matrix};

/// General planar affine map.
///
/// ```text
/// x' = a·x + b·y + tx
/// y' = c·x + d·y + ty
/// ```
///
/// Built from parameters, the linear part is `R(θ)·diag(sx, sy)`:
/// `a = sx·cos θ`, `b = −sy·sin θ`, `c = sx·sin θ`, `d = sy·cos θ`.
///
/// ```
/// use geotrf::geometry::Point2;
/// use geotrf::transform::Affine2D;
///
/// let t = Affine2D::new(150.0, 75.0, 0.25, 0.30, 35f64.to_radians());
/// let p = t.apply(Point2::new(4157222.543, 664789.307));
/// assert!((p.x - 737107.092).abs() / 737107.092 < 1e-4);
/// assert!((p.y - 759565.279).abs() / 759565.279 < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Affine2D<T> {
    pub a: T,
    pub b: T,
    pub c: T,
    pub d: T,
    pub tx: T,
    pub ty: T,
}

impl<T: FloatScalar> Default for Affine2D<T> {
    fn default() -> Self {
        Self::from_matrix(&Matrix::new([
            [T::one(), T::zero(), T::zero()],
            [T::zero(), T::one(), T::zero()],
        ]))
    }
}

impl<T: FloatScalar> Affine2D<T> {
    /// From translation, per-axis scale and rotation (radians).
    pub fn new(tx: T, ty: T, scale_x: T, scale_y: T, rotation: T) -> Self {
        let (s, c) = rotation.sin_cos();
        Self {
            a: scale_x * c,
            b: -scale_y * s,
            c: scale_x * s,
            d: scale_y * c,
            tx,
            ty,
        }
    }

    /// From `[[a, b, tx], [c, d, ty]]`.
    pub fn from_matrix(m: &Matrix2x3<T>) -> Self {
        Self {
            a: m[(0, 0)],
            b: m[(0, 1)],
            tx: m[(0, 2)],
            c: m[(1, 0)],
            d: m[(1, 1)],
            ty: m[(1, 2)],
        }
    }

    pub fn matrix(&self) -> Matrix2x3<T> {
        Matrix::new([[self.a, self.b, self.tx], [self.c, self.d, self.ty]])
    }

    pub fn scale_x(&self) -> T {
        self.a.hypot(self.c)
    }

    pub fn scale_y(&self) -> T {
        self.b.hypot(self.d)
    }

    /// Mean of the angles of the two image axes.
    pub fn rotation(&self) -> T {
        (self.c.atan2(self.a) + (-self.b).atan2(self.d)) / T::lit(2.0)
    }

    pub fn set_parameters(&mut self, tx: T, ty: T, scale_x: T, scale_y: T, rotation: T) {
        *self = Self::new(tx, ty, scale_x, scale_y, rotation);
    }

    pub fn det(&self) -> T {
        self.a * self.d - self.b * self.c
    }

    #[inline]
    pub fn apply(&self, p: Point2<T>) -> Point2<T> {
        Point2::new(
            self.a * p.x + self.b * p.y + self.tx,
            self.c * p.x + self.d * p.y + self.ty,
        )
    }

    pub fn apply_inverse(&self, p: Point2<T>) -> Result<Point2<T>> {
        Ok(self.inverse()?.apply(p))
    }

    /// Exact inverse of the linear part; fails on a singular one.
    pub fn inverse(&self) -> Result<Self> {
        let det = self.det();
        let scale = self.a.abs().max(self.b.abs()).max(self.c.abs()).max(self.d.abs());
        check_invertible(det, scale, 2, "singular affine map has no inverse")?;
        let (a, b, c, d) = (self.d / det, -self.b / det, -self.c / det, self.a / det);
        Ok(Self {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + b * self.ty),
            ty: -(c * self.tx + d * self.ty),
        })
    }
}

impl<T: FloatScalar> Transform<T> for Affine2D<T> {
    type Point = Point2<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::Affine2D
    }

    /// Design `[x, y, 1]` on centered coordinates, one right-hand side per
    /// output axis.
    fn compute_with(
        &mut self,
        src: &[Point2<T>],
        dst: &[Point2<T>],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        let kind = self.kind();
        check_counts(kind, src, dst)?;
        let why = "points are collinear";
        let sc = Point2::centroid(src).ok_or(Error::DegenerateConfiguration(why))?;
        let dc = Point2::centroid(dst).ok_or(Error::DegenerateConfiguration(why))?;

        let n = src.len();
        let mut a = DynMatrix::zeros(n, 3, T::zero());
        let mut b = DynMatrix::zeros(n, 2, T::zero());
        for (i, (&s, &d)) in src.iter().zip(dst).enumerate() {
            let s = s - sc;
            let d = d - dc;
            a[(i, 0)] = s.x;
            a[(i, 1)] = s.y;
            a[(i, 2)] = T::one();
            b[(i, 0)] = d.x;
            b[(i, 1)] = d.y;
        }
        let (x, strategy) = solve_design(&a, &b, settings, why)?;

        self.a = x[(0, 0)];
        self.b = x[(1, 0)];
        self.c = x[(0, 1)];
        self.d = x[(1, 1)];
        self.tx = dc.x + x[(2, 0)] - (self.a * sc.x + self.b * sc.y);
        self.ty = dc.y + x[(2, 1)] - (self.c * sc.x + self.d * sc.y);

        Ok(report(kind, src, dst, strategy, |p| self.apply(p)))
    }

    fn transform(&self, p: Point2<T>, order: Order) -> Result<Point2<T>> {
        match order {
            Order::Direct => Ok(self.apply(p)),
            Order::Inverse => self.apply_inverse(p),
        }
    }

    fn transform_batch(
        &self,
        points: &[Point2<T>],
        order: Order,
    ) -> Result<alloc::vec::Vec<Point2<T>>> {
        let t = match order {
            Order::Direct => *self,
            Order::Inverse => self.inverse()?,
        };
        Ok(points.iter().map(|&p| t.apply(p)).collect())
    }
}
