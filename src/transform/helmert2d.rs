use super::fit::{check_counts, report, solve_design};
use super::{check_invertible, FitReport, FitSettings, Order, Transform, TransformKind};
use crate::error::{Error, Result};
use crate::geometry::Point2;
use crate::matrix::Matrix2x3;
use crate::traits::FloatScalar;
use crate::{DynMatrix, Matrix};

/// Planar similarity: rotation, uniform scale and translation.
///
/// ```text
/// x' = a·x − b·y + tx        a = s·cos θ
/// y' = b·x + a·y + ty        b = s·sin θ
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Helmert2D<T> {
    pub tx: T,
    pub ty: T,
    a: T,
    b: T,
}

impl<T: FloatScalar> Default for Helmert2D<T> {
    fn default() -> Self {
        Self::from_coefficients(T::one(), T::zero(), T::zero(), T::zero())
    }
}

impl<T: FloatScalar> Helmert2D<T> {
    /// From translation, scale and rotation (radians).
    pub fn new(tx: T, ty: T, scale: T, rotation: T) -> Self {
        let (s, c) = rotation.sin_cos();
        Self::from_coefficients(scale * c, scale * s, tx, ty)
    }

    /// From the linear coefficients `a = s·cos θ`, `b = s·sin θ`.
    pub fn from_coefficients(a: T, b: T, tx: T, ty: T) -> Self {
        Self { tx, ty, a, b }
    }

    pub fn a(&self) -> T {
        self.a
    }

    pub fn b(&self) -> T {
        self.b
    }

    pub fn scale(&self) -> T {
        self.a.hypot(self.b)
    }

    /// Rotation angle in radians, in `(−π, π]`.
    pub fn rotation(&self) -> T {
        self.b.atan2(self.a)
    }

    pub fn set_parameters(&mut self, tx: T, ty: T, scale: T, rotation: T) {
        *self = Self::new(tx, ty, scale, rotation);
    }

    /// `[[a, −b, tx], [b, a, ty]]`.
    pub fn matrix(&self) -> Matrix2x3<T> {
        Matrix::new([[self.a, -self.b, self.tx], [self.b, self.a, self.ty]])
    }

    #[inline]
    pub fn apply(&self, p: Point2<T>) -> Point2<T> {
        Point2::new(
            self.a * p.x - self.b * p.y + self.tx,
            self.b * p.x + self.a * p.y + self.ty,
        )
    }

    pub fn apply_inverse(&self, p: Point2<T>) -> Result<Point2<T>> {
        let det = self.a * self.a + self.b * self.b;
        let largest = self.a.abs().max(self.b.abs());
        check_invertible(det, largest, 2, "zero scale has no inverse")?;
        let dx = p.x - self.tx;
        let dy = p.y - self.ty;
        Ok(Point2::new(
            (self.a * dx + self.b * dy) / det,
            (-self.b * dx + self.a * dy) / det,
        ))
    }

    pub fn inverse(&self) -> Result<Self> {
        let det = self.a * self.a + self.b * self.b;
        let largest = self.a.abs().max(self.b.abs());
        check_invertible(det, largest, 2, "zero scale has no inverse")?;
        let a = self.a / det;
        let b = -self.b / det;
        Ok(Self::from_coefficients(
            a,
            b,
            -(a * self.tx - b * self.ty),
            -(b * self.tx + a * self.ty),
        ))
    }
}

impl<T: FloatScalar> Transform<T> for Helmert2D<T> {
    type Point = Point2<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::Helmert2D
    }

    /// Rows `[x, −y, 1, 0]→x'` and `[y, x, 0, 1]→y'` on centered
    /// coordinates; the translation is restored afterwards.
    fn compute_with(
        &mut self,
        src: &[Point2<T>],
        dst: &[Point2<T>],
        settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        let kind = self.kind();
        check_counts(kind, src, dst)?;
        let why = "points are coincident";
        let sc = Point2::centroid(src).ok_or(Error::DegenerateConfiguration(why))?;
        let dc = Point2::centroid(dst).ok_or(Error::DegenerateConfiguration(why))?;

        let n = src.len();
        let mut a = DynMatrix::zeros(2 * n, 4, T::zero());
        let mut b = DynMatrix::zeros(2 * n, 1, T::zero());
        for (i, (&s, &d)) in src.iter().zip(dst).enumerate() {
            let s = s - sc;
            let d = d - dc;
            let (r0, r1) = (2 * i, 2 * i + 1);
            a[(r0, 0)] = s.x;
            a[(r0, 1)] = -s.y;
            a[(r0, 2)] = T::one();
            a[(r1, 0)] = s.y;
            a[(r1, 1)] = s.x;
            a[(r1, 3)] = T::one();
            b[(r0, 0)] = d.x;
            b[(r1, 0)] = d.y;
        }
        let (x, strategy) = solve_design(&a, &b, settings, why)?;

        let (ca, cb) = (x[(0, 0)], x[(1, 0)]);
        self.a = ca;
        self.b = cb;
        self.tx = dc.x + x[(2, 0)] - (ca * sc.x - cb * sc.y);
        self.ty = dc.y + x[(3, 0)] - (cb * sc.x + ca * sc.y);

        Ok(report(kind, src, dst, strategy, |p| self.apply(p)))
    }

    fn transform(&self, p: Point2<T>, order: Order) -> Result<Point2<T>> {
        match order {
            Order::Direct => Ok(self.apply(p)),
            Order::Inverse => self.apply_inverse(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinates;
    use crate::transform::FitStrategy;
    use alloc::vec::Vec;

    const TOL: f64 = 1e-9;

    fn assert_near(a: f64, b: f64, tol: f64, msg: &str) {
        assert!((a - b).abs() < tol, "{}: {} vs {}", msg, a, b);
    }

    #[test]
    fn parameters() {
        let h = Helmert2D::new(150.0, 75.0, 0.25, 35f64.to_radians());
        assert_near(h.a(), 0.20478801107224795, 1e-15, "a");
        assert_near(h.b(), 0.14339410908776151, 1e-15, "b");
        assert_near(h.scale(), 0.25, 1e-15, "scale");
        assert_near(h.rotation(), 35f64.to_radians(), 1e-15, "rotation");
    }

    #[test]
    fn exact_fit_with_two_points() {
        let truth = Helmert2D::new(-20.0, 4.0, 1.7, -0.4);
        let src = [Point2::new(10.0, 3.0), Point2::new(-6.0, 8.0)];
        let dst: Vec<_> = src.iter().map(|&p| truth.apply(p)).collect();
        let mut h = Helmert2D::default();
        let r = h.compute(&src, &dst).unwrap();
        assert_eq!(r.strategy, FitStrategy::Exact);
        for (s, d) in src.iter().zip(&dst) {
            assert!(h.apply(*s).distance(d) < TOL);
        }
        assert_near(h.scale(), 1.7, TOL, "scale");
        assert_near(h.rotation(), -0.4, TOL, "rotation");
        assert_near(h.tx, -20.0, TOL, "tx");
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let p = Point2::new(1.0, 1.0);
        let mut h = Helmert2D::default();
        let err = h.compute(&[p, p], &[p, Point2::new(2.0, 2.0)]).unwrap_err();
        assert!(matches!(err, Error::DegenerateConfiguration(_)));
    }

    #[test]
    fn inverse_object_and_round_trip() {
        let h = Helmert2D::new(3.0, -8.0, 0.5, 2.0);
        let inv = h.inverse().unwrap();
        let p = Point2::new(12.0, 34.0);
        let q = h.apply(p);
        assert!(inv.apply(q).distance(&p) < TOL);
        assert!(h.transform(q, Order::Inverse).unwrap().distance(&p) < TOL);
        assert_near(inv.scale(), 2.0, TOL, "inverse scale");
    }

    #[test]
    fn inverse_verdict_matches_affine() {
        use crate::transform::Affine2D;
        for scale in [0.0, 1e-200, 1e-9, 1.0, 3.5e4, f64::NAN] {
            let h = Helmert2D::new(3.0, 4.0, scale, 0.5);
            let a = Affine2D::from(h);
            assert_eq!(h.inverse().is_ok(), a.inverse().is_ok(), "scale {}", scale);
            assert_eq!(h.inverse().is_ok(), h.apply_inverse(Point2::new(1.0, 1.0)).is_ok());
        }
        let h = Helmert2D::new(0.0_f64, 0.0, 1e-9, 0.5);
        let p = Point2::new(2.0, -1.0);
        let q = h.apply_inverse(h.apply(p)).unwrap();
        assert!(q.distance(&p) < TOL);
        assert_eq!(
            Helmert2D::<f64>::new(0.0, 0.0, 0.0, 0.5).inverse().unwrap_err(),
            Error::DegenerateConfiguration("zero scale has no inverse")
        );
    }
}
