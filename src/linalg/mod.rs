//! Matrix decompositions.
//!
//! Each decomposition has an in-place free-function core operating on
//! `&mut impl MatrixMut<T>` and a wrapper struct over [`DynMatrix`](crate::DynMatrix)
//! with `solve`, `inverse` and `det`. Fixed-size [`Matrix`](crate::Matrix)
//! gets thin adapters (`a.lu()`, `a.svd()`, `a.eigen()`, ...) that run the
//! dynamic core.
//!
//! | Wrapper | Factorization | Requires |
//! |---|---|---|
//! | [`Lu`] | `P·A = L·U` | square |
//! | [`Cholesky`] | `A = L·Lᵀ` | symmetric positive definite |
//! | [`Svd`] | `A = U·Σ·Vᵀ` | any shape |
//! | [`Schur`] | `A = Q·S·Qᵀ` | square |
//! | [`Eigen`] | `A·V = V·D` | square |

pub(crate) mod cholesky;
pub(crate) mod eigen;
pub(crate) mod hessenberg;
pub(crate) mod lu;
pub(crate) mod schur;
pub(crate) mod svd;
pub(crate) mod symmetric_eigen;

pub use cholesky::{back_substitute_lt, cholesky_in_place, forward_substitute, Cholesky};
pub use eigen::Eigen;
pub use hessenberg::hessenberg;
pub use lu::{lu_in_place, lu_solve, Lu};
pub use schur::{francis_qr, split_real_blocks, Schur};
pub use svd::Svd;
pub use symmetric_eigen::{tridiagonal_qr_with_vecs, tridiagonalize};
