//! # geotrf
//!
//! Small-matrix decompositions, geometric transform estimation from point
//! correspondences, and local geodetic frames.
//!
//! ## Quick start
//!
//! ```
//! use geotrf::geometry::Point2;
//! use geotrf::transform::{Affine2D, Order, Transform};
//!
//! let src = [
//!     Point2::new(0.0_f64, 0.0),
//!     Point2::new(10.0, 0.0),
//!     Point2::new(0.0, 10.0),
//!     Point2::new(10.0, 10.0),
//! ];
//! let truth = Affine2D::new(5.0, -3.0, 2.0, 1.5, 0.2);
//! let dst: Vec<_> = src.iter().map(|&p| truth.apply(p)).collect();
//!
//! let mut fitted = Affine2D::default();
//! let report = fitted.compute(&src, &dst).unwrap();
//! assert!(report.rmse < 1e-9);
//!
//! let back = fitted.transform(dst[3], Order::Inverse).unwrap();
//! assert!((back.x - 10.0).abs() < 1e-9);
//! ```
//!
//! ## Modules
//!
//! - [`matrix`]: fixed-size `Matrix<T, M, N>` with const-generic
//!   dimensions and column-major storage. [`Vector<T, N>`] and
//!   [`ColumnVector<T, N>`] are 1-row and 1-column aliases.
//!
//! - [`dynmatrix`]: heap-allocated `DynMatrix<T>` with runtime dimensions,
//!   the working type of the decompositions. [`DynVector<T>`] for
//!   single-index access.
//!
//! - [`linalg`]: LU (partial pivoting), Cholesky, SVD (Golub-Kahan) and
//!   eigen decomposition (symmetric tridiagonal QR or Hessenberg + Francis
//!   QR). Each wrapper provides `solve()` and, where defined, `inverse()`
//!   and `det()`. Fixed-size adapters: `a.lu()`, `a.svd()`, `a.eigen()`,
//!   `a.solve(&b)`, `a.inverse()`, `a.det()`.
//!
//! - [`geometry`]: `Point2` / `Point3` value types.
//!
//! - [`transform`]: translation, rotation, scaling, Helmert and affine
//!   transforms in 2D and 3D behind the [`Transform`](transform::Transform)
//!   trait, their tagged variants with the kind factory, and
//!   `TransformChain`.
//!
//! - [`geodesy`]: reference ellipsoids, the ECEF ↔ ENU frame and CRS
//!   conversion through a pluggable delegate.
//!
//! - [`traits`]: element traits [`Scalar`] and [`FloatScalar`], and the
//!   [`MatrixRef`] / [`MatrixMut`] access traits the algorithms are written
//!   against.
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade and never
//! installs a logger. Fits report at `debug`, QR sweep iteration counts at
//! `trace`, and minimum-norm SVD flooring and out-of-range ENU use at
//! `warn`.
//!
//! ## Cargo features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std`   | yes     | Standard library support, forwarded to `num-traits`, `num-complex`, `thiserror` and `serde` |
//! | `libm`  | no      | Floating-point math from `libm` for `no_std` builds |
//! | `serde` | no      | `Serialize` / `Deserialize` for points, matrices, transforms, kinds, reports and ellipsoids |
//! | `all`   | no      | `std` + `serde` |

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("geotrf needs the `std` or the `libm` feature for floating-point math");

extern crate alloc;

pub mod dynmatrix;
pub mod error;
pub mod geodesy;
pub mod geometry;
pub mod linalg;
pub mod matrix;
pub mod traits;
pub mod transform;

pub use dynmatrix::{DynMatrix, DynVector};
pub use error::{Error, Result};
pub use matrix::aliases::{
    ColumnVector2, ColumnVector3, Matrix2, Matrix2x3, Matrix3, Matrix3x4, Matrix4, Vector2,
    Vector3,
};
pub use matrix::vector::{ColumnVector, Vector};
pub use matrix::Matrix;
pub use traits::{FloatScalar, MatrixMut, MatrixRef, Scalar};

pub use num_complex::Complex;
