//! Shared estimation plumbing: point-count checks, design-matrix solves,
//! the SVD Procrustes solution and fit reports.

use alloc::vec::Vec;

use super::{FitReport, FitSettings, FitStrategy, TransformKind};
use crate::error::{Error, Result};
use crate::geometry::{Coordinates, Point3};
use crate::linalg::{Lu, Svd};
use crate::matrix::Matrix3;
use crate::traits::FloatScalar;
use crate::{DynMatrix, Matrix};

/// `src` and `dst` must pair up, and there must be enough of them.
pub(crate) fn check_counts<P>(kind: TransformKind, src: &[P], dst: &[P]) -> Result<()> {
    let dim = kind.dimension();
    if src.len() != dst.len() {
        return Err(Error::DimensionMismatch {
            expected: (src.len(), dim),
            got: (dst.len(), dim),
        });
    }
    let required = kind.min_points();
    if src.len() < required {
        return Err(Error::InsufficientPoints {
            kind,
            required,
            got: src.len(),
        });
    }
    Ok(())
}

/// Solve `A·X = B` for the parameters.
///
/// A square design goes through LU; anything else through SVD, after
/// checking that the design has full column rank. Singular or
/// rank-deficient designs become [`Error::DegenerateConfiguration`]
/// carrying `why`.
pub(crate) fn solve_design<T: FloatScalar>(
    a: &DynMatrix<T>,
    b: &DynMatrix<T>,
    settings: &FitSettings<T>,
    why: &'static str,
) -> Result<(DynMatrix<T>, FitStrategy)> {
    if a.is_square() {
        let lu = Lu::with_tolerance(a, settings.rank_tolerance).map_err(|e| match e {
            Error::SingularMatrix => Error::DegenerateConfiguration(why),
            other => other,
        })?;
        return Ok((lu.solve_matrix(b)?, FitStrategy::Exact));
    }

    let svd = Svd::new(a)?;
    let rank = svd.rank(settings.rank_tolerance);
    if rank < a.ncols() {
        log::debug!(
            "design matrix {}x{} has rank {}, condition {:?}",
            a.nrows(),
            a.ncols(),
            rank,
            svd.condition_number()
        );
        return Err(Error::DegenerateConfiguration(why));
    }
    let x = svd.solve_matrix_with_tolerance(b, settings.rank_tolerance)?;
    Ok((x, FitStrategy::LeastSquares))
}

/// Residuals and RMSE of a finished fit, logged at `debug`.
pub(crate) fn report<T, P>(
    kind: TransformKind,
    src: &[P],
    dst: &[P],
    strategy: FitStrategy,
    forward: impl Fn(P) -> P,
) -> FitReport<T>
where
    T: FloatScalar,
    P: Coordinates<T>,
{
    let residuals: Vec<T> = src
        .iter()
        .zip(dst)
        .map(|(&s, d)| forward(s).distance(d))
        .collect();
    let observations = P::DIM * src.len();
    let params = kind.parameter_count();
    let sum_sq = residuals.iter().fold(T::zero(), |acc, &r| acc + r * r);
    let rmse = if observations > params {
        (sum_sq / T::from_usize(observations - params)).sqrt()
    } else {
        T::zero()
    };
    log::debug!(
        "{} fit: {} points, {:?}, rmse {:?}",
        kind,
        src.len(),
        strategy,
        rmse
    );
    FitReport {
        residuals,
        rmse,
        strategy,
    }
}

/// Best rotation (and optionally scale) taking `src` onto `dst`.
pub(crate) struct Procrustes<T> {
    pub rotation: Matrix3<T>,
    pub scale: T,
    pub src_mean: Point3<T>,
    pub dst_mean: Point3<T>,
}

/// Orthogonal Procrustes via the SVD of the cross-covariance, with the
/// reflection guard `diag(1, 1, sign det(U·Vᵀ))`.
///
/// With `centered` the means are removed first and the Umeyama scale is
/// computed; without it the rotation is about the origin and `scale` is 1.
pub(crate) fn procrustes<T: FloatScalar>(
    src: &[Point3<T>],
    dst: &[Point3<T>],
    centered: bool,
    settings: &FitSettings<T>,
    why: &'static str,
) -> Result<Procrustes<T>> {
    let (src_mean, dst_mean) = if centered {
        (
            Point3::centroid(src).ok_or(Error::DegenerateConfiguration(why))?,
            Point3::centroid(dst).ok_or(Error::DegenerateConfiguration(why))?,
        )
    } else {
        (Point3::origin(), Point3::origin())
    };

    // H = Σ (dᵢ − d̄)·(sᵢ − s̄)ᵀ
    let mut h = Matrix3::<T>::zeros();
    let mut src_var = T::zero();
    for (&s, &d) in src.iter().zip(dst) {
        let s = (s - src_mean).to_array();
        let d = (d - dst_mean).to_array();
        for i in 0..3 {
            for j in 0..3 {
                h[(i, j)] = h[(i, j)] + d[i] * s[j];
            }
        }
        src_var = src_var + s.iter().fold(T::zero(), |acc, &x| acc + x * x);
    }

    let svd = Svd::new(&DynMatrix::from(&h))?;
    if svd.rank(settings.rank_tolerance) < 2 {
        return Err(Error::DegenerateConfiguration(why));
    }
    let u: Matrix3<T> = Matrix::try_from(svd.u())?;
    let vt: Matrix3<T> = Matrix::try_from(svd.vt())?;
    let sign = if (u * vt).det() < T::zero() {
        -T::one()
    } else {
        T::one()
    };
    let guard = [T::one(), T::one(), sign];
    let rotation = Matrix::from_fn(|i, j| {
        (0..3).fold(T::zero(), |acc, k| acc + u[(i, k)] * guard[k] * vt[(k, j)])
    });

    let scale = if centered {
        if !(src_var > T::zero()) {
            return Err(Error::DegenerateConfiguration(why));
        }
        let sv = svd.singular_values();
        (sv[0] * guard[0] + sv[1] * guard[1] + sv[2] * guard[2]) / src_var
    } else {
        T::one()
    };

    Ok(Procrustes {
        rotation,
        scale,
        src_mean,
        dst_mean,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::frame_rotation;

    #[test]
    fn counts() {
        let pts = [1, 2];
        assert!(check_counts(TransformKind::Helmert2D, &pts, &pts).is_ok());
        assert_eq!(
            check_counts(TransformKind::Affine2D, &pts, &pts).unwrap_err(),
            Error::InsufficientPoints {
                kind: TransformKind::Affine2D,
                required: 3,
                got: 2
            }
        );
        assert!(matches!(
            check_counts(TransformKind::Translation, &pts, &pts[..1]),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn singular_square_design_is_degenerate() {
        let a = DynMatrix::from_rows(2, 2, &[1.0_f64, 2.0, 2.0, 4.0]);
        let b = DynMatrix::from_rows(2, 1, &[1.0_f64, 2.0]);
        let err = solve_design(&a, &b, &FitSettings::default(), "collinear").unwrap_err();
        assert_eq!(err, Error::DegenerateConfiguration("collinear"));
    }

    #[test]
    fn procrustes_recovers_rotation_and_scale() {
        let r = frame_rotation(0.1_f64, -0.2, 0.3);
        let src = [
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 3.0),
            Point3::new(1.0, 1.0, 1.0),
        ];
        let t = Point3::new(5.0, -1.0, 2.0);
        let dst: Vec<_> = src
            .iter()
            .map(|&p| {
                let q = p.rotated(&r);
                Point3::new(1.5 * q.x, 1.5 * q.y, 1.5 * q.z) + t
            })
            .collect();
        let fit = procrustes(&src, &dst, true, &FitSettings::default(), "x").unwrap();
        assert!((fit.scale - 1.5).abs() < 1e-10);
        assert!(fit.rotation.max_abs_diff(&r) < 1e-10);
    }

    #[test]
    fn procrustes_rejects_collinear() {
        let src = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        ];
        let err = procrustes(&src, &src, true, &FitSettings::default(), "collinear");
        assert_eq!(err.err(), Some(Error::DegenerateConfiguration("collinear")));
    }
}
