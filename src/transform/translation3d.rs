use super::fit::{check_counts, report, solve_design};
use super::{FitReport, FitSettings, Order, Transform, TransformKind};
use crate::error::Result;
use crate::geometry::Point3;
use crate::traits::FloatScalar;
use crate::DynMatrix;

/// Spatial shift.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Translation3D<T> {
    pub tx: T,
    pub ty: T,
    pub tz: T,
}

impl<T: FloatScalar> Default for Translation3D<T> {
    fn default() -> Self {
        Self::new(T::zero(), T::zero(), T::zero())
    }
}

impl<T: FloatScalar> Translation3D<T> {
    pub fn new(tx: T, ty: T, tz: T) -> Self {
        Self { tx, ty, tz }
    }

    pub fn as_point(&self) -> Point3<T> {
        Point3::new(self.tx, self.ty, self.tz)
    }

    #[inline]
    pub fn apply(&self, p: Point3<T>) -> Point3<T> {
        p + self.as_point()
    }

    #[inline]
    pub fn apply_inverse(&self, p: Point3<T>) -> Point3<T> {
        p - self.as_point()
    }

    pub fn inverse(&self) -> Result<Self> {
        Ok(Self::new(-self.tx, -self.ty, -self.tz))
    }
}

impl<T: FloatScalar> Transform<T> for Translation3D<T> {
    type Point = Point3<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::Translation3D
    }

    fn compute_with(
        &mut self,
        src: &[Point3<T>],
        dst: &[Point3<T>],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        let kind = self.kind();
        check_counts(kind, src, dst)?;

        let n = src.len();
        let mut a = DynMatrix::zeros(3 * n, 3, T::zero());
        let mut b = DynMatrix::zeros(3 * n, 1, T::zero());
        for (i, (&s, &d)) in src.iter().zip(dst).enumerate() {
            let diff = (d - s).to_array();
            for k in 0..3 {
                a[(3 * i + k, k)] = T::one();
                b[(3 * i + k, 0)] = diff[k];
            }
        }
        let (x, strategy) = solve_design(&a, &b, settings, "translation design is singular")?;
        *self = Self::new(x[(0, 0)], x[(1, 0)], x[(2, 0)]);

        Ok(report(kind, src, dst, strategy, |p| self.apply(p)))
    }

    fn transform(&self, p: Point3<T>, order: Order) -> Result<Point3<T>> {
        Ok(match order {
            Order::Direct => self.apply(p),
            Order::Inverse => self.apply_inverse(p),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_and_round_trip() {
        let src = [Point3::new(1.0_f64, 2.0, 3.0), Point3::new(-1.0, 0.0, 4.0)];
        let dst = [Point3::new(2.0, 0.0, 3.5), Point3::new(0.0, -2.0, 4.5)];
        let mut t = Translation3D::default();
        let r = t.compute(&src, &dst).unwrap();
        assert!(r.rmse < 1e-12);
        assert!((t.tx - 1.0).abs() < 1e-12);
        assert!((t.ty + 2.0).abs() < 1e-12);
        assert!((t.tz - 0.5).abs() < 1e-12);

        let q = t.transform(src[0], Order::Direct).unwrap();
        assert_eq!(t.transform(q, Order::Inverse).unwrap(), src[0]);
    }
}
