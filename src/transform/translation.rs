use alloc::vec::Vec;

use super::fit::{check_counts, report, solve_design};
use super::{FitReport, FitSettings, Order, Transform, TransformKind};
use crate::error::Result;
use crate::geometry::Point2;
use crate::traits::FloatScalar;
use crate::DynMatrix;

/// Planar shift: `x' = x + tx`, `y' = y + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Translation<T> {
    pub tx: T,
    pub ty: T,
}

impl<T: FloatScalar> Default for Translation<T> {
    fn default() -> Self {
        Self::new(T::zero(), T::zero())
    }
}

impl<T: FloatScalar> Translation<T> {
    pub fn new(tx: T, ty: T) -> Self {
        Self { tx, ty }
    }

    #[inline]
    pub fn apply(&self, p: Point2<T>) -> Point2<T> {
        Point2::new(p.x + self.tx, p.y + self.ty)
    }

    #[inline]
    pub fn apply_inverse(&self, p: Point2<T>) -> Point2<T> {
        Point2::new(p.x - self.tx, p.y - self.ty)
    }

    /// The opposite shift.
    pub fn inverse(&self) -> Result<Self> {
        Ok(Self::new(-self.tx, -self.ty))
    }
}

impl<T: FloatScalar> Transform<T> for Translation<T> {
    type Point = Point2<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::Translation
    }

    fn compute_with(
        &mut self,
        src: &[Point2<T>],
        dst: &[Point2<T>],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        let kind = self.kind();
        check_counts(kind, src, dst)?;

        // [1 0] tx = x' − x ; [0 1] ty = y' − y
        let n = src.len();
        let mut a = DynMatrix::zeros(2 * n, 2, T::zero());
        let mut b = DynMatrix::zeros(2 * n, 1, T::zero());
        for (i, (s, d)) in src.iter().zip(dst).enumerate() {
            a[(2 * i, 0)] = T::one();
            a[(2 * i + 1, 1)] = T::one();
            b[(2 * i, 0)] = d.x - s.x;
            b[(2 * i + 1, 0)] = d.y - s.y;
        }
        let (x, strategy) = solve_design(&a, &b, settings, "translation design is singular")?;
        *self = Self::new(x[(0, 0)], x[(1, 0)]);

        Ok(report(kind, src, dst, strategy, |p| self.apply(p)))
    }

    fn transform(&self, p: Point2<T>, order: Order) -> Result<Point2<T>> {
        Ok(match order {
            Order::Direct => self.apply(p),
            Order::Inverse => self.apply_inverse(p),
        })
    }

    fn transform_batch(&self, points: &[Point2<T>], order: Order) -> Result<Vec<Point2<T>>> {
        Ok(match order {
            Order::Direct => points.iter().map(|&p| self.apply(p)).collect(),
            Order::Inverse => points.iter().map(|&p| self.apply_inverse(p)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::FitStrategy;

    #[test]
    fn exact_fit_from_one_point() {
        let mut t = Translation::default();
        let r = t
            .compute(&[Point2::new(1.0, 2.0)], &[Point2::new(11.0, -3.0)])
            .unwrap();
        assert_eq!(r.strategy, FitStrategy::Exact);
        assert_eq!(t, Translation::new(10.0, -5.0));
        assert_eq!(r.rmse, 0.0);
    }

    #[test]
    fn least_squares_is_mean_shift() {
        let src = [Point2::new(0.0_f64, 0.0), Point2::new(1.0, 1.0)];
        let dst = [Point2::new(1.0, 0.0), Point2::new(3.0, 1.0)];
        let mut t = Translation::default();
        let r = t.compute(&src, &dst).unwrap();
        assert_eq!(r.strategy, FitStrategy::LeastSquares);
        assert!((t.tx - 1.5).abs() < 1e-12);
        assert!(t.ty.abs() < 1e-12);
        assert!((r.residuals[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn round_trip() {
        let t = Translation::new(3.5, -2.0);
        let p = Point2::new(7.0, 1.0);
        let q = t.transform(p, Order::Direct).unwrap();
        assert_eq!(t.transform(q, Order::Inverse).unwrap(), p);
        assert_eq!(t.inverse().unwrap().apply(q), p);
    }
}
