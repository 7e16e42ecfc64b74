use super::fit::{check_counts, report, solve_design};
use super::{check_invertible, FitReport, FitSettings, Order, Transform, TransformKind};
use crate::error::Result;
use crate::geometry::Point2;
use crate::traits::FloatScalar;
use crate::DynMatrix;

/// Uniform planar scaling about the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scaling<T> {
    pub scale: T,
}

impl<T: FloatScalar> Default for Scaling<T> {
    fn default() -> Self {
        Self::new(T::one())
    }
}

impl<T: FloatScalar> Scaling<T> {
    pub fn new(scale: T) -> Self {
        Self { scale }
    }

    #[inline]
    pub fn apply(&self, p: Point2<T>) -> Point2<T> {
        Point2::new(p.x * self.scale, p.y * self.scale)
    }

    pub fn apply_inverse(&self, p: Point2<T>) -> Result<Point2<T>> {
        check_invertible(self.scale.powi(2), self.scale, 2, "zero scale has no inverse")?;
        Ok(Point2::new(p.x / self.scale, p.y / self.scale))
    }

    pub fn inverse(&self) -> Result<Self> {
        check_invertible(self.scale.powi(2), self.scale, 2, "zero scale has no inverse")?;
        Ok(Self::new(T::one() / self.scale))
    }
}

impl<T: FloatScalar> Transform<T> for Scaling<T> {
    type Point = Point2<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::Scaling
    }

    /// One unknown shared by both axes: rows `[x]→x'` and `[y]→y'`.
    fn compute_with(
        &mut self,
        src: &[Point2<T>],
        dst: &[Point2<T>],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        let kind = self.kind();
        check_counts(kind, src, dst)?;

        let n = src.len();
        let mut a = DynMatrix::zeros(2 * n, 1, T::zero());
        let mut b = DynMatrix::zeros(2 * n, 1, T::zero());
        for (i, (s, d)) in src.iter().zip(dst).enumerate() {
            a[(2 * i, 0)] = s.x;
            a[(2 * i + 1, 0)] = s.y;
            b[(2 * i, 0)] = d.x;
            b[(2 * i + 1, 0)] = d.y;
        }
        let (x, strategy) =
            solve_design(&a, &b, settings, "scaling needs a point away from the origin")?;
        self.scale = x[(0, 0)];

        Ok(report(kind, src, dst, strategy, |p| self.apply(p)))
    }

    fn transform(&self, p: Point2<T>, order: Order) -> Result<Point2<T>> {
        match order {
            Order::Direct => Ok(self.apply(p)),
            Order::Inverse => self.apply_inverse(p),
        }
    }
}
