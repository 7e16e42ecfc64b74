//! Fits against surveyed correspondence sets with known parameters.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use geotrf::geometry::{Point2, Point3};
use geotrf::transform::{
    Affine2D, FitStrategy, Helmert2D, Helmert3D, Order, Transform, Transform2D, Transform3D,
    TransformKind,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn arcsec(rad: f64) -> f64 {
    rad.to_degrees() * 3600.0
}

// ── Planar fixtures ─────────────────────────────────────────────────

fn planar_src() -> Vec<Point2<f64>> {
    [
        (4157222.543, 664789.307),
        (4149043.336, 688836.443),
        (4172803.511, 690340.078),
        (4177148.376, 642997.635),
        (4137012.190, 671808.029),
        (4146292.729, 666952.887),
        (4138759.902, 702670.738),
    ]
    .into_iter()
    .map(Point2::from)
    .collect()
}

fn affine_dst() -> Vec<Point2<f64>> {
    [
        (737107.092, 759565.279),
        (731294.227, 764301.907),
        (735901.291, 768078.488),
        (744937.420, 757067.318),
        (731760.522, 758392.053),
        (734496.503, 758529.698),
        (726807.795, 766227.040),
    ]
    .into_iter()
    .map(Point2::from)
    .collect()
}

fn helmert_dst() -> Vec<Point2<f64>> {
    [
        (756172.466, 732337.103),
        (751049.245, 736088.818),
        (755699.431, 739803.813),
        (763377.835, 730731.677),
        (751027.184, 730876.407),
        (753623.926, 731212.907),
        (746959.564, 737447.332),
    ]
    .into_iter()
    .map(Point2::from)
    .collect()
}

#[test]
fn affine2d_from_parameters_matches_survey() {
    let t = Affine2D::new(150.0, 75.0, 0.25, 0.30, 35f64.to_radians());
    let src = planar_src();
    let dst = affine_dst();
    for (s, d) in src.iter().zip(&dst) {
        let p = t.transform(*s, Order::Direct).unwrap();
        assert_relative_eq!(p.x, d.x, max_relative = 1e-4);
        assert_relative_eq!(p.y, d.y, max_relative = 1e-4);
    }
}

#[test]
fn affine2d_least_squares() {
    init();
    let mut t = Affine2D::default();
    let report = t.compute(&planar_src(), &affine_dst()).unwrap();

    assert_eq!(report.strategy, FitStrategy::LeastSquares);
    assert_eq!(report.residuals.len(), 7);
    assert_relative_eq!(t.a, 0.20478801107224795, max_relative = 1e-3);
    assert_relative_eq!(t.b, -0.17207293090531381, max_relative = 1e-3);
    assert_relative_eq!(t.c, 0.14339410908776151, max_relative = 1e-3);
    assert_relative_eq!(t.d, 0.24574561328669753, max_relative = 1e-3);
    assert_relative_eq!(t.tx, 150.0, max_relative = 1e-3);
    assert_relative_eq!(t.ty, 75.0, max_relative = 1e-3);
    assert_relative_eq!(t.scale_x(), 0.25, max_relative = 1e-3);
    assert_relative_eq!(t.scale_y(), 0.30, max_relative = 1e-3);
    assert_relative_eq!(t.rotation(), 35f64.to_radians(), max_relative = 1e-3);
}

#[test]
fn affine2d_inverse_maps_back() {
    let mut t = Affine2D::default();
    t.compute(&planar_src(), &affine_dst()).unwrap();
    let dst = affine_dst();
    let back = t.transform_batch(&dst, Order::Inverse).unwrap();
    let fwd = t.transform_batch(&back, Order::Direct).unwrap();
    for (p, q) in dst.iter().zip(&fwd) {
        assert_abs_diff_eq!(p.x, q.x, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, q.y, epsilon = 1e-6);
    }
}

#[test]
fn helmert2d_least_squares() {
    init();
    let mut t = Helmert2D::default();
    let report = t.compute(&planar_src(), &helmert_dst()).unwrap();

    assert_eq!(report.strategy, FitStrategy::LeastSquares);
    assert_relative_eq!(t.rotation(), 35f64.to_radians(), max_relative = 1e-4);
    assert_relative_eq!(t.scale(), 0.25, max_relative = 1e-4);
    assert_relative_eq!(t.tx, 150.0, max_relative = 1e-3);
    assert_relative_eq!(t.ty, 75.0, max_relative = 1e-3);
    assert!(report.max_residual() < 0.1);
}

/// Sum of squared residuals of `t` over the fixture.
fn sse<F: Transform<f64, Point = Point2<f64>>>(t: &F, src: &[Point2<f64>], dst: &[Point2<f64>]) -> f64 {
    src.iter()
        .zip(dst)
        .map(|(s, d)| {
            let p = t.transform(*s, Order::Direct).unwrap();
            (p.x - d.x).powi(2) + (p.y - d.y).powi(2)
        })
        .sum()
}

#[test]
fn least_squares_is_a_minimum() {
    let (src, dst) = (planar_src(), affine_dst());
    let mut fitted = Affine2D::default();
    fitted.compute(&src, &dst).unwrap();
    let best = sse(&fitted, &src, &dst);

    let nudges: [fn(&mut Affine2D<f64>, f64); 6] = [
        |t, h| t.a += h,
        |t, h| t.b += h,
        |t, h| t.c += h,
        |t, h| t.d += h,
        |t, h| t.tx += h,
        |t, h| t.ty += h,
    ];
    for (i, nudge) in nudges.iter().enumerate() {
        // coefficient steps scaled to the ~4e6 coordinate range
        let h = if i < 4 { 1e-9 } else { 1e-3 };
        for step in [h, -h] {
            let mut t = fitted;
            nudge(&mut t, step);
            assert!(sse(&t, &src, &dst) >= best, "parameter {} step {}", i, step);
        }
    }

    let (hdst, mut helmert) = (helmert_dst(), Helmert2D::default());
    helmert.compute(&src, &hdst).unwrap();
    let best = sse(&helmert, &src, &hdst);
    for step in [1e-9, -1e-9] {
        let t = Helmert2D::new(helmert.tx, helmert.ty, helmert.scale() + step, helmert.rotation());
        assert!(sse(&t, &src, &hdst) >= best);
        let t = Helmert2D::new(helmert.tx, helmert.ty, helmert.scale(), helmert.rotation() + step);
        assert!(sse(&t, &src, &hdst) >= best);
    }
}

#[test]
fn helmert2d_inverse_parameters() {
    let t = Helmert2D::new(150.0, 75.0, 0.25, 35f64.to_radians());
    let inv = t.inverse().unwrap();
    assert_relative_eq!(inv.tx, -663.564, max_relative = 1e-5);
    assert_relative_eq!(inv.ty, 98.400, max_relative = 1e-4);
    assert_relative_eq!(inv.rotation(), -35f64.to_radians(), max_relative = 1e-12);
    assert_relative_eq!(inv.scale(), 4.0, max_relative = 1e-12);
}

#[test]
fn factory_fit_generalizes_and_specializes() {
    let mut t = Transform2D::<f64>::from_name("similarity").unwrap();
    t.compute(&planar_src(), &helmert_dst()).unwrap();
    assert_eq!(t.kind(), TransformKind::Helmert2D);

    let general = t.generalize(TransformKind::Affine2D).unwrap();
    let p = planar_src()[3];
    let a = t.transform(p, Order::Direct).unwrap();
    let b = general.transform(p, Order::Direct).unwrap();
    assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-6);
    assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-6);

    let back = general.specialize(TransformKind::Helmert2D, 1e-9).unwrap();
    assert_eq!(back.kind(), TransformKind::Helmert2D);

    // a fitted affine map carries real skew
    let mut affine = Transform2D::<f64>::from_name("affine").unwrap();
    affine.compute(&planar_src(), &affine_dst()).unwrap();
    assert!(affine.specialize(TransformKind::Helmert2D, 1e-6).is_err());
}

// ── Seven-parameter fixture ─────────────────────────────────────────

fn geocentric_src() -> Vec<Point3<f64>> {
    [
        (2441775.419, 799268.100, 5818729.162),
        (3464655.838, 845749.989, 5270271.528),
        (3309991.828, 828932.118, 5370882.280),
        (3160763.338, 759160.187, 5469345.504),
        (2248123.493, 865686.595, 5886425.596),
        (3022573.157, 802945.690, 5540683.951),
        (3104219.427, 998384.028, 5463290.505),
        (2998189.685, 931451.634, 5533398.462),
        (3199093.294, 932231.327, 5420322.483),
        (3370658.823, 711876.990, 5349786.786),
        (3341340.173, 957912.343, 5330003.236),
        (2534031.166, 975174.455, 5752078.309),
        (2838909.903, 903822.098, 5620660.184),
        (2902495.079, 761455.843, 5609859.672),
        (2682407.890, 950395.934, 5688993.082),
        (2620258.868, 779138.041, 5743799.267),
        (3246470.535, 1077900.355, 5365277.896),
        (3249408.275, 692757.965, 5426396.948),
        (2763885.496, 733247.387, 5682653.347),
        (2368885.005, 994492.233, 5818478.154),
    ]
    .into_iter()
    .map(Point3::from)
    .collect()
}

fn geocentric_dst() -> Vec<Point3<f64>> {
    [
        (2441276.712, 799286.666, 5818162.025),
        (3464161.275, 845805.461, 5269712.429),
        (3309496.800, 828981.942, 5370322.060),
        (3160269.913, 759204.574, 5468784.081),
        (2247621.426, 865698.413, 5885856.498),
        (3022077.340, 802985.055, 5540121.276),
        (3103716.966, 998426.412, 5462727.814),
        (2997689.029, 931490.201, 5532835.154),
        (3198593.776, 932277.179, 5419760.966),
        (3370168.626, 711928.884, 5349227.574),
        (3340840.578, 957963.383, 5329442.724),
        (2533526.497, 975196.347, 5751510.935),
        (2838409.359, 903854.897, 5620095.593),
        (2902000.172, 761490.908, 5609296.343),
        (2681904.794, 950423.098, 5688426.909),
        (2619761.810, 779162.964, 5743233.630),
        (3245966.134, 1077947.976, 5364716.214),
        (3248918.041, 692805.543, 5425836.841),
        (2763390.878, 733277.458, 5682089.111),
        (2368378.937, 994508.273, 5817909.286),
    ]
    .into_iter()
    .map(Point3::from)
    .collect()
}

#[test]
fn helmert3d_closed_form() {
    init();
    let mut t = Helmert3D::default();
    let report = t.compute(&geocentric_src(), &geocentric_dst()).unwrap();

    assert_eq!(report.strategy, FitStrategy::ClosedForm);
    assert_relative_eq!(t.scale_ppm(), 1.0237, max_relative = 1e-3);
    assert_relative_eq!(arcsec(t.omega()), 0.8502, max_relative = 1e-3);
    assert_relative_eq!(arcsec(t.phi()), 1.8141, max_relative = 1e-3);
    assert_relative_eq!(arcsec(t.kappa()), -7.8535, max_relative = 1e-3);
    assert_relative_eq!(t.tx, -419.5684, max_relative = 1e-3);
    assert_relative_eq!(t.ty, -99.2460, max_relative = 1e-3);
    assert_relative_eq!(t.tz, -591.4559, max_relative = 1e-3);
    assert!(report.max_residual() < 0.5);
    assert!(report.rmse < 0.2);
}

#[test]
fn helmert3d_as_affine() {
    let mut t = Transform3D::<f64>::from_name("helmert3d").unwrap();
    t.compute(&geocentric_src(), &geocentric_dst()).unwrap();
    let Transform3D::Affine3D(affine) = t.generalize(TransformKind::Affine3D).unwrap() else {
        panic!("expected an affine map");
    };
    for s in affine.scale() {
        assert_relative_eq!((s - 1.0) * 1e6, 1.0237, max_relative = 1e-3);
    }

    let src = geocentric_src();
    let q = affine.apply(src[7]);
    let r = t.transform(src[7], Order::Direct).unwrap();
    assert_abs_diff_eq!(q.x, r.x, epsilon = 1e-6);
    assert_abs_diff_eq!(q.y, r.y, epsilon = 1e-6);
    assert_abs_diff_eq!(q.z, r.z, epsilon = 1e-6);
}

#[test]
fn too_few_points() {
    let mut t = Helmert3D::<f64>::default();
    let src = geocentric_src();
    let err = t.compute(&src[..2], &geocentric_dst()[..2]).unwrap_err();
    assert_eq!(
        err,
        geotrf::Error::InsufficientPoints {
            kind: TransformKind::Helmert3D,
            required: 3,
            got: 2
        }
    );
}
