use super::fit::{check_counts, report, solve_design};
use super::{FitReport, FitSettings, Order, Transform, TransformKind};
use crate::error::Result;
use crate::geometry::Point2;
use crate::traits::FloatScalar;
use crate::DynMatrix;

/// Planar rotation about the origin, counter-clockwise by `angle` radians.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotation<T> {
    pub angle: T,
}

impl<T: FloatScalar> Default for Rotation<T> {
    fn default() -> Self {
        Self::new(T::zero())
    }
}

impl<T: FloatScalar> Rotation<T> {
    pub fn new(angle: T) -> Self {
        Self { angle }
    }

    #[inline]
    pub fn apply(&self, p: Point2<T>) -> Point2<T> {
        let (s, c) = self.angle.sin_cos();
        Point2::new(c * p.x - s * p.y, s * p.x + c * p.y)
    }

    #[inline]
    pub fn apply_inverse(&self, p: Point2<T>) -> Point2<T> {
        let (s, c) = self.angle.sin_cos();
        Point2::new(c * p.x + s * p.y, -s * p.x + c * p.y)
    }

    pub fn inverse(&self) -> Result<Self> {
        Ok(Self::new(-self.angle))
    }
}

impl<T: FloatScalar> Transform<T> for Rotation<T> {
    type Point = Point2<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::Rotation
    }

    /// Solves for `(cos θ, sin θ)` without a unit-norm constraint, then
    /// keeps only the angle.
    fn compute_with(
        &mut self,
        src: &[Point2<T>],
        dst: &[Point2<T>],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        let kind = self.kind();
        check_counts(kind, src, dst)?;

        let n = src.len();
        let mut a = DynMatrix::zeros(2 * n, 2, T::zero());
        let mut b = DynMatrix::zeros(2 * n, 1, T::zero());
        for (i, (s, d)) in src.iter().zip(dst).enumerate() {
            a[(2 * i, 0)] = s.x;
            a[(2 * i, 1)] = -s.y;
            a[(2 * i + 1, 0)] = s.y;
            a[(2 * i + 1, 1)] = s.x;
            b[(2 * i, 0)] = d.x;
            b[(2 * i + 1, 0)] = d.y;
        }
        let (x, strategy) =
            solve_design(&a, &b, settings, "rotation needs a point away from the origin")?;
        self.angle = x[(1, 0)].atan2(x[(0, 0)]);

        Ok(report(kind, src, dst, strategy, |p| self.apply(p)))
    }

    fn transform(&self, p: Point2<T>, order: Order) -> Result<Point2<T>> {
        Ok(match order {
            Order::Direct => self.apply(p),
            Order::Inverse => self.apply_inverse(p),
        })
    }
}
