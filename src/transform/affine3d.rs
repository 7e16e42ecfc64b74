use super::fit::{check_counts, report, solve_design};
use super::{check_invertible, FitReport, FitSettings, Order, Transform, TransformKind};
use crate::error::{Error, Result};
use crate::geometry::Point3;
use crate::matrix::{Matrix3, Matrix3x4};
use crate::traits::FloatScalar;
use crate::{DynMatrix, Matrix};

/// General spatial affine map `X' = A·X + t`, twelve parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "T: crate::traits::Scalar + serde::Serialize",
        deserialize = "T: crate::traits::Scalar + serde::Deserialize<'de>"
    ))
)]
pub struct Affine3D<T> {
    pub linear: Matrix3<T>,
    pub tx: T,
    pub ty: T,
    pub tz: T,
}

impl<T: FloatScalar> Default for Affine3D<T> {
    fn default() -> Self {
        Self::new(Matrix::eye(), T::zero(), T::zero(), T::zero())
    }
}

impl<T: FloatScalar> Affine3D<T> {
    pub fn new(linear: Matrix3<T>, tx: T, ty: T, tz: T) -> Self {
        Self { linear, tx, ty, tz }
    }

    /// From `[A | t]`.
    pub fn from_matrix(m: &Matrix3x4<T>) -> Self {
        Self {
            linear: Matrix::from_fn(|i, j| m[(i, j)]),
            tx: m[(0, 3)],
            ty: m[(1, 3)],
            tz: m[(2, 3)],
        }
    }

    pub fn matrix(&self) -> Matrix3x4<T> {
        let t = [self.tx, self.ty, self.tz];
        Matrix::from_fn(|i, j| if j < 3 { self.linear[(i, j)] } else { t[i] })
    }

    pub fn translation(&self) -> Point3<T> {
        Point3::new(self.tx, self.ty, self.tz)
    }

    /// Length of each image axis, i.e. the column norms of `A`.
    pub fn scale(&self) -> [T; 3] {
        core::array::from_fn(|j| {
            (0..3)
                .fold(T::zero(), |acc, i| acc + self.linear[(i, j)] * self.linear[(i, j)])
                .sqrt()
        })
    }

    pub fn det(&self) -> T {
        self.linear.det()
    }

    #[inline]
    pub fn apply(&self, p: Point3<T>) -> Point3<T> {
        p.rotated(&self.linear) + self.translation()
    }

    pub fn apply_inverse(&self, p: Point3<T>) -> Result<Point3<T>> {
        Ok(self.inverse()?.apply(p))
    }

    /// Exact inverse; fails when `A` is singular.
    pub fn inverse(&self) -> Result<Self> {
        let largest = (0..3).fold(T::zero(), |m, i| {
            (0..3).fold(m, |m, j| m.max(self.linear[(i, j)].abs()))
        });
        check_invertible(self.det(), largest, 3, "singular affine map has no inverse")?;
        let inv = self.linear.inverse().map_err(|e| match e {
            Error::SingularMatrix => {
                Error::DegenerateConfiguration("singular affine map has no inverse")
            }
            other => other,
        })?;
        let t = self.translation().rotated(&inv);
        Ok(Self::new(inv, -t.x, -t.y, -t.z))
    }
}

impl<T: FloatScalar> Transform<T> for Affine3D<T> {
    type Point = Point3<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::Affine3D
    }

    /// Design `[x, y, z, 1]` on centered coordinates, one right-hand side
    /// per output axis.
    fn compute_with(
        &mut self,
        src: &[Point3<T>],
        dst: &[Point3<T>],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        let kind = self.kind();
        check_counts(kind, src, dst)?;
        let why = "points are coplanar";
        let sc = Point3::centroid(src).ok_or(Error::DegenerateConfiguration(why))?;
        let dc = Point3::centroid(dst).ok_or(Error::DegenerateConfiguration(why))?;

        let n = src.len();
        let mut a = DynMatrix::zeros(n, 4, T::zero());
        let mut b = DynMatrix::zeros(n, 3, T::zero());
        for (i, (&s, &d)) in src.iter().zip(dst).enumerate() {
            let s = (s - sc).to_array();
            let d = (d - dc).to_array();
            for k in 0..3 {
                a[(i, k)] = s[k];
                b[(i, k)] = d[k];
            }
            a[(i, 3)] = T::one();
        }
        let (x, strategy) = solve_design(&a, &b, settings, why)?;

        // x is 4×3: column k holds row k of [A | t]
        let linear = Matrix::from_fn(|i, j| x[(j, i)]);
        let m = sc.rotated(&linear);
        *self = Self::new(
            linear,
            dc.x + x[(3, 0)] - m.x,
            dc.y + x[(3, 1)] - m.y,
            dc.z + x[(3, 2)] - m.z,
        );

        Ok(report(kind, src, dst, strategy, |p| self.apply(p)))
    }

    fn transform(&self, p: Point3<T>, order: Order) -> Result<Point3<T>> {
        match order {
            Order::Direct => Ok(self.apply(p)),
            Order::Inverse => self.apply_inverse(p),
        }
    }

    fn transform_batch(
        &self,
        points: &[Point3<T>],
        order: Order,
    ) -> Result<alloc::vec::Vec<Point3<T>>> {
        let t = match order {
            Order::Direct => *self,
            Order::Inverse => self.inverse()?,
        };
        Ok(points.iter().map(|&p| t.apply(p)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinates;
    use crate::transform::FitStrategy;
    use alloc::vec::Vec;

    const TOL: f64 = 1e-9;

    fn truth() -> Affine3D<f64> {
        Affine3D::from_matrix(&Matrix::new([
            [1.1, 0.2, -0.1, 5.0],
            [0.05, 0.9, 0.3, -2.0],
            [-0.2, 0.1, 1.3, 0.5],
        ]))
    }

    #[test]
    fn exact_fit_with_four_points() {
        let t = truth();
        let src = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        let dst: Vec<_> = src.iter().map(|&p| t.apply(p)).collect();
        let mut fit = Affine3D::default();
        let r = fit.compute(&src, &dst).unwrap();
        assert_eq!(r.strategy, FitStrategy::Exact);
        assert!(fit.matrix().max_abs_diff(&t.matrix()) < TOL);
    }

    #[test]
    fn least_squares_fit() {
        let t = truth();
        let src: Vec<_> = (0..10)
            .map(|i| {
                let f = i as f64;
                Point3::new(f, (f * 1.3).sin() * 4.0, (f * 0.7).cos() * 3.0)
            })
            .collect();
        let dst: Vec<_> = src.iter().map(|&p| t.apply(p)).collect();
        let mut fit = Affine3D::default();
        let r = fit.compute(&src, &dst).unwrap();
        assert_eq!(r.strategy, FitStrategy::LeastSquares);
        assert!(r.rmse < 1e-9);
        assert!(fit.matrix().max_abs_diff(&t.matrix()) < TOL);
    }

    #[test]
    fn coplanar_points_are_degenerate() {
        let src = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let mut fit = Affine3D::default();
        assert_eq!(
            fit.compute(&src, &src).unwrap_err(),
            Error::DegenerateConfiguration("points are coplanar")
        );
    }

    #[test]
    fn inverse_and_scale() {
        let t = truth();
        let p = Point3::new(3.0, -4.0, 2.0);
        let q = t.transform(p, Order::Direct).unwrap();
        assert!(t.transform(q, Order::Inverse).unwrap().distance(&p) < TOL);

        let s = Affine3D::new(Matrix::new([[2.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 4.0]]), 0.0, 0.0, 0.0).scale();
        assert_eq!(s, [2.0, 3.0, 4.0]);

        let flat = Affine3D::new(Matrix::<f64, 3, 3>::zeros(), 1.0, 0.0, 0.0);
        assert!(matches!(flat.inverse(), Err(Error::DegenerateConfiguration(_))));
    }
}
