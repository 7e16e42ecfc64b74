//! Coordinate tuples consumed and produced by the transforms.

use core::ops::{Add, Sub};

use crate::traits::FloatScalar;
use crate::Matrix;

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2<T> {
    pub x: T,
    pub y: T,
}

/// A point in space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

/// Shared access to 2D and 3D points, so fitting code can be written once
/// over the dimension.
pub trait Coordinates<T: FloatScalar>: Copy {
    /// Number of coordinates.
    const DIM: usize;

    /// Coordinate `i` (`0 = x`, `1 = y`, `2 = z`).
    fn coord(&self, i: usize) -> T;

    /// Euclidean distance to `other`.
    fn distance(&self, other: &Self) -> T {
        (0..Self::DIM)
            .fold(T::zero(), |acc, i| {
                let d = self.coord(i) - other.coord(i);
                acc + d * d
            })
            .sqrt()
    }
}

// ── Point2 ──────────────────────────────────────────────────────────

impl<T> Point2<T> {
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: FloatScalar> Point2<T> {
    #[inline]
    pub fn origin() -> Self {
        Self::new(T::zero(), T::zero())
    }

    #[inline]
    pub fn to_array(self) -> [T; 2] {
        [self.x, self.y]
    }

    /// Lift into 3D with the given height.
    #[inline]
    pub fn with_z(self, z: T) -> Point3<T> {
        Point3::new(self.x, self.y, z)
    }

    /// Arithmetic mean of a point set; `None` when empty.
    pub fn centroid(points: &[Self]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let sum = points.iter().fold(Self::origin(), |acc, &p| acc + p);
        let n = T::from_usize(points.len());
        Some(Self::new(sum.x / n, sum.y / n))
    }
}

impl<T: FloatScalar> Coordinates<T> for Point2<T> {
    const DIM: usize = 2;

    #[inline]
    fn coord(&self, i: usize) -> T {
        match i {
            0 => self.x,
            1 => self.y,
            _ => panic!("Point2 has no coordinate {}", i),
        }
    }
}

impl<T> From<[T; 2]> for Point2<T> {
    fn from([x, y]: [T; 2]) -> Self {
        Self { x, y }
    }
}

impl<T> From<(T, T)> for Point2<T> {
    fn from((x, y): (T, T)) -> Self {
        Self { x, y }
    }
}

// ── Point3 ──────────────────────────────────────────────────────────

impl<T> Point3<T> {
    #[inline]
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T: FloatScalar> Point3<T> {
    #[inline]
    pub fn origin() -> Self {
        Self::new(T::zero(), T::zero(), T::zero())
    }

    #[inline]
    pub fn to_array(self) -> [T; 3] {
        [self.x, self.y, self.z]
    }

    /// Drop the height.
    #[inline]
    pub fn xy(self) -> Point2<T> {
        Point2::new(self.x, self.y)
    }

    #[inline]
    pub fn norm(self) -> T {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// `m · p` for a 3×3 matrix.
    #[inline]
    pub fn rotated(self, m: &Matrix<T, 3, 3>) -> Self {
        Self::from(m.mul_array(&self.to_array()))
    }

    /// Arithmetic mean of a point set; `None` when empty.
    pub fn centroid(points: &[Self]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let sum = points.iter().fold(Self::origin(), |acc, &p| acc + p);
        let n = T::from_usize(points.len());
        Some(Self::new(sum.x / n, sum.y / n, sum.z / n))
    }
}

impl<T: FloatScalar> Coordinates<T> for Point3<T> {
    const DIM: usize = 3;

    #[inline]
    fn coord(&self, i: usize) -> T {
        match i {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("Point3 has no coordinate {}", i),
        }
    }
}

impl<T> From<[T; 3]> for Point3<T> {
    fn from([x, y, z]: [T; 3]) -> Self {
        Self { x, y, z }
    }
}

impl<T> From<(T, T, T)> for Point3<T> {
    fn from((x, y, z): (T, T, T)) -> Self {
        Self { x, y, z }
    }
}

// ── Arithmetic ──────────────────────────────────────────────────────

macro_rules! impl_point_ops {
    ($P:ident { $($f:ident),+ }) => {
        impl<T: FloatScalar> Add for $P<T> {
            type Output = Self;
            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self { $($f: self.$f + rhs.$f),+ }
            }
        }

        impl<T: FloatScalar> Sub for $P<T> {
            type Output = Self;
            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self { $($f: self.$f - rhs.$f),+ }
            }
        }
    };
}

impl_point_ops!(Point2 { x, y });
impl_point_ops!(Point3 { x, y, z });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);

        let p = Point3::new(1.0, 2.0, 2.0);
        assert_eq!(Point3::origin().distance(&p), 3.0);
        assert_eq!(p.norm(), 3.0);
    }

    #[test]
    fn centroid_and_ops() {
        let pts = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(3.0, 3.0, 3.0),
        ];
        assert_eq!(Point3::centroid(&pts), Some(Point3::new(1.0, 1.0, 1.0)));
        assert_eq!(Point3::<f64>::centroid(&[]), None);
        assert_eq!(pts[3] - pts[0], Point3::new(2.0, 3.0, 3.0));
    }

    #[test]
    fn rotated_by_matrix() {
        let rz = Matrix::new([[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        let p = Point3::new(1.0, 0.0, 5.0).rotated(&rz);
        assert_eq!(p, Point3::new(0.0, 1.0, 5.0));
    }

    #[test]
    fn coordinate_access() {
        let p = Point3::from([1.0, 2.0, 3.0]);
        assert_eq!(<Point3<f64> as Coordinates<f64>>::DIM, 3);
        assert_eq!(p.coord(2), 3.0);
        assert_eq!(p.xy().with_z(9.0), Point3::new(1.0, 2.0, 9.0));
    }
}
