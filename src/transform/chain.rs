use alloc::vec::Vec;

use super::{FitReport, FitSettings, Order, Transform, Transform2D, TransformKind};
use crate::error::{Error, Result};
use crate::geometry::Point2;
use crate::traits::FloatScalar;

/// An ordered composition of planar transforms.
///
/// ```
/// use geotrf::geometry::Point2;
/// use geotrf::transform::{Order, Scaling, Transform, TransformChain, Translation};
///
/// let mut chain = TransformChain::new();
/// chain.push(Scaling::new(2.0));
/// chain.push(Translation::new(1.0, 0.0));
/// let p = chain.transform(Point2::new(1.0, 1.0), Order::Direct).unwrap();
/// assert_eq!(p, Point2::new(3.0, 2.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformChain<T> {
    steps: Vec<Transform2D<T>>,
}

impl<T: FloatScalar> TransformChain<T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step, applied after every step already in the chain.
    pub fn push(&mut self, step: impl Into<Transform2D<T>>) {
        self.steps.push(step.into());
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Transform2D<T>> {
        self.steps.iter()
    }

    /// The chain of step inverses, in reverse order.
    pub fn inverse(&self) -> Result<Self> {
        let steps = self
            .steps
            .iter()
            .rev()
            .map(Transform2D::inverse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }
}

impl<T: FloatScalar> FromIterator<Transform2D<T>> for TransformChain<T> {
    fn from_iter<I: IntoIterator<Item = Transform2D<T>>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl<T: FloatScalar> Transform<T> for TransformChain<T> {
    type Point = Point2<T>;

    fn kind(&self) -> TransformKind {
        TransformKind::Chain
    }

    fn compute_with(
        &mut self,
        _src: &[Point2<T>],
        _dst: &[Point2<T>],
        _settings: &FitSettings<T>,
    ) -> Result<FitReport<T>> {
        Err(Error::UnsupportedOperation("a transform chain cannot be fitted"))
    }

    fn transform(&self, p: Point2<T>, order: Order) -> Result<Point2<T>> {
        match order {
            Order::Direct => self
                .steps
                .iter()
                .try_fold(p, |p, t| t.transform(p, Order::Direct)),
            Order::Inverse => self
                .steps
                .iter()
                .rev()
                .try_fold(p, |p, t| t.transform(p, Order::Inverse)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinates;
    use crate::transform::{Helmert2D, Rotation, Scaling, Translation};

    #[test]
    fn order_matters() {
        let mut a = TransformChain::new();
        a.push(Rotation::new(core::f64::consts::FRAC_PI_2));
        a.push(Translation::new(10.0, 0.0));
        let p = a.transform(Point2::new(1.0, 0.0), Order::Direct).unwrap();
        assert!(p.distance(&Point2::new(10.0, 1.0)) < 1e-12);

        let b: TransformChain<f64> = a.iter().rev().copied().collect();
        let q = b.transform(Point2::new(1.0, 0.0), Order::Direct).unwrap();
        assert!(q.distance(&Point2::new(0.0, 11.0)) < 1e-12);
    }

    #[test]
    fn inverse_runs_backwards() {
        let mut c = TransformChain::new();
        c.push(Helmert2D::new(5.0, -2.0, 1.5, 0.3));
        c.push(Scaling::new(0.5));
        c.push(Translation::new(-1.0, 4.0));
        let p = Point2::new(7.0, 8.0);
        let q = c.transform(p, Order::Direct).unwrap();
        assert!(c.transform(q, Order::Inverse).unwrap().distance(&p) < 1e-12);
        assert!(c.inverse().unwrap().transform(q, Order::Direct).unwrap().distance(&p) < 1e-12);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn empty_chain_and_no_fit() {
        let mut c = TransformChain::<f64>::new();
        assert!(c.is_empty());
        let p = Point2::new(1.0, 2.0);
        assert_eq!(c.transform(p, Order::Inverse).unwrap(), p);
        assert!(matches!(
            c.compute(&[p], &[p]),
            Err(Error::UnsupportedOperation(_))
        ));
        assert_eq!(c.kind(), TransformKind::Chain);
    }

    #[test]
    fn failing_step_propagates() {
        let mut c = TransformChain::new();
        c.push(Scaling::new(0.0));
        assert!(c.transform(Point2::new(1.0, 1.0), Order::Inverse).is_err());
    }
}
