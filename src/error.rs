use alloc::string::String;

use thiserror::Error;

use crate::transform::TransformKind;

/// Errors produced by the matrix, decomposition, transform and CRS layers.
///
/// ```
/// use geotrf::{DynMatrix, Error};
/// use geotrf::linalg::Lu;
///
/// let singular = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
/// assert_eq!(Lu::new(&singular).unwrap_err(), Error::SingularMatrix);
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Incompatible matrix, vector or point-set shapes.
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .got.0, .got.1)]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// A pivot vanished during LU factorization.
    #[error("matrix is singular")]
    SingularMatrix,

    /// A Cholesky diagonal term became non-positive.
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,

    /// An iterative QR sweep exhausted its iteration budget.
    #[error("iterative algorithm did not converge")]
    ConvergenceFailure,

    /// Strict least-squares solve on a rank-deficient system.
    #[error("rank deficient system: rank {rank}, {required} required")]
    RankDeficient { rank: usize, required: usize },

    /// Fewer correspondences than the transform kind needs.
    #[error("{kind} needs at least {required} points, got {got}")]
    InsufficientPoints {
        kind: TransformKind,
        required: usize,
        got: usize,
    },

    /// The correspondences (or the parameters) do not determine a unique,
    /// invertible transform.
    #[error("degenerate configuration: {0}")]
    DegenerateConfiguration(&'static str),

    /// The CRS delegate could not resolve a definition.
    #[error("invalid CRS definition `{0}`")]
    InvalidCrsDefinition(String),

    /// The operation is not available for this object.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// The transform kind factory did not recognise a name.
    #[error("unknown transform kind `{0}`")]
    UnknownTransformKind(String),

    /// `generalize`/`specialize` requested outside the kind lattice.
    #[error("cannot convert {from} into {to}")]
    InvalidConversion {
        from: TransformKind,
        to: TransformKind,
    },

    /// `specialize` would discard a parameter that is not at identity.
    #[error("cannot specialize {from} into {to}: {parameter} is not at identity")]
    NotSpecializable {
        from: TransformKind,
        to: TransformKind,
        parameter: &'static str,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "std")]
    #[test]
    fn is_a_std_error() {
        fn source_chain(e: &(dyn std::error::Error + 'static)) -> String {
            alloc::format!("{}", e)
        }
        let e = Error::RankDeficient { rank: 1, required: 2 };
        assert_eq!(source_chain(&e), "rank deficient system: rank 1, 2 required");
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn display_messages() {
        let e = Error::DimensionMismatch {
            expected: (3, 3),
            got: (2, 3),
        };
        assert_eq!(e.to_string(), "dimension mismatch: expected 3x3, got 2x3");

        let e = Error::InsufficientPoints {
            kind: TransformKind::Affine2D,
            required: 3,
            got: 2,
        };
        assert_eq!(e.to_string(), "Affine2D needs at least 3 points, got 2");

        let e = Error::InvalidCrsDefinition("EPSG:99999".into());
        assert_eq!(e.to_string(), "invalid CRS definition `EPSG:99999`");
    }
}
