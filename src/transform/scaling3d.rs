use super::fit::{check_counts, report, solve_design};
use super::{check_invertible, FitReport, FitSettings, Order, Transform, TransformKind};
use crate::error::Result;
use crate::geometry::Point3;
use crate::traits::FloatScalar;
use crate::DynMatrix;

/// Uniform spatial scaling about the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scaling3D<T> {
    pub scale: T,
}

impl<T: FloatScalar> Default for Scaling3D<T> {
    fn default() -> Self {
        Self::new(T::one())
    }
}

impl<T: FloatScalar> Scaling3D<T> {
    pub fn new(scale: T) -> Self {
        Self { scale }
    }

    #[inline]
    pub fn apply(&self, p: Point3<T>) -> Point3<T> {
        Point3::new(p.x * self.scale, p.y * self.scale, p.z * self.scale)
    }

    pub fn apply_inverse(&self, p: Point3<T>) -> Result<Point3<T>> {
        Ok(self.inverse()?.apply(p))
    }

    pub fn inverse(&self) -> Result<Self> {
        check_invertible(self.scale.powi(3), self.scale, 3, "zero scale has no inverse")?;
        Ok(Self::new(T::one() / self.scale))
    }
}

impl<T: FloatScalar> Transform<T> for Scaling3D<T> {
    type Point = Point3<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::Scaling3D
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
        let mut a = DynMatrix::zeros(3 * n, 1, T::zero());
        let mut b = DynMatrix::zeros(3 * n, 1, T::zero());
        for (i, (s, d)) in src.iter().zip(dst).enumerate() {
            let (s, d) = (s.to_array(), d.to_array());
            for k in 0..3 {
                a[(3 * i + k, 0)] = s[k];
                b[(3 * i + k, 0)] = d[k];
            }
        }
        let (x, strategy) =
            solve_design(&a, &b, settings, "scaling needs a point away from the origin")?;
        self.scale = x[(0, 0)];

        Ok(report(kind, src, dst, strategy, |p| self.apply(p)))
    }

    fn transform(&self, p: Point3<T>, order: Order) -> Result<Point3<T>> {
        match order {
            Order::Direct => Ok(self.apply(p)),
            Order::Inverse => self.apply_inverse(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn fit_from_one_point() {
        let mut s = Scaling3D::<f64>::default();
        s.compute(&[Point3::new(1.0, 2.0, 2.0)], &[Point3::new(3.0, 6.0, 6.0)])
            .unwrap();
        assert!((s.scale - 3.0).abs() < 1e-12);
        let p = s.transform(Point3::new(3.0, 6.0, 6.0), Order::Inverse).unwrap();
        assert!((p.z - 2.0).abs() < 1e-12);
    }

    #[test]
    fn origin_only_is_degenerate() {
        let mut s = Scaling3D::<f64>::default();
        assert!(matches!(
            s.compute(&[Point3::origin()], &[Point3::origin()]),
            Err(Error::DegenerateConfiguration(_))
        ));
    }
}
