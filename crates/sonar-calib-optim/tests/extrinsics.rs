//! Synthetic ground-truth recovery for the two-stage extrinsic solve.
//!
//! Points are generated in the camera frame, pushed through a known
//! camera→sonar transform and the sonar projection model, and the solver
//! must recover that transform from the resulting pixel observations.

use approx::assert_relative_eq;
use sonar_calib_core::{Correspondences, Pt3, Real, SonarParameters, Vec3};
use sonar_calib_optim::{
    projection_error, solve_extrinsics, ExtrinsicTransform, SolveOptions,
};

/// Ground truth: the conventional camera→sonar alignment plus a small
/// mounting offset.
fn ground_truth() -> ExtrinsicTransform {
    let mut gt = ExtrinsicTransform::default_prior();
    gt.translation = Vec3::new(0.06, -0.03, 0.12);
    gt
}

/// A 3D cloud in front of the camera (z forward), spread along all axes so
/// every pose direction is observable from azimuth/range measurements.
fn camera_points() -> Vec<Pt3> {
    let mut points = Vec::new();
    for ix in -2i32..=2 {
        for iy in -1i32..=1 {
            let x = ix as Real * 0.12;
            let y = iy as Real * 0.15;
            let z = 1.0 + 0.1 * (ix + iy) as Real;
            points.push(Pt3::new(x, y, z));
        }
    }
    points
}

fn project(
    sonar: &SonarParameters,
    transform: &ExtrinsicTransform,
    points: &[Pt3],
) -> Correspondences {
    let pixels = points
        .iter()
        .map(|p| {
            let sonar_point = transform.transform_point(&p.coords);
            sonar.polar_to_pixel(&sonar.point_to_polar(&sonar_point))
        })
        .collect();
    Correspondences::new(pixels, points.to_vec()).unwrap()
}

#[test]
fn exact_seed_gives_zero_residual() {
    let sonar = SonarParameters::new(1.6, true);
    let gt = ground_truth();
    let corr = project(&sonar, &gt, &camera_points());

    let result = solve_extrinsics(&corr, &sonar, &gt, &SolveOptions::default()).unwrap();

    assert!(result.converged, "solver did not converge: {result:?}");
    assert!(
        result.residual_error < 1e-3,
        "residual too large: {}",
        result.residual_error
    );
    assert_eq!(result.point_count, corr.len());
}

#[test]
fn perturbed_seed_recovers_ground_truth() {
    let sonar = SonarParameters::new(1.6, true);
    let gt = ground_truth();
    let corr = project(&sonar, &gt, &camera_points());

    // 10% perturbation on every seed component.
    let prior = ExtrinsicTransform::new(gt.rotation * 1.1, gt.translation * 1.1);
    let result = solve_extrinsics(&corr, &sonar, &prior, &SolveOptions::default()).unwrap();

    assert!(result.converged, "solver did not converge: {result:?}");
    assert_relative_eq!(result.transform.rotation, gt.rotation, epsilon = 1e-4);
    assert_relative_eq!(result.transform.translation, gt.translation, epsilon = 1e-4);
    assert!(
        result.residual_error < 1e-3,
        "residual too large: {}",
        result.residual_error
    );
}

#[test]
fn true_transform_has_zero_projection_error() {
    let sonar = SonarParameters::new(1.6, true);
    let gt = ground_truth();
    let corr = project(&sonar, &gt, &camera_points());

    let err = projection_error(&corr, &sonar, &gt.rotation, &gt.translation);
    assert!(err.abs() < 1e-9, "expected zero error at truth, got {err}");
}

#[test]
fn projection_error_grows_with_translation_delta() {
    let sonar = SonarParameters::new(1.6, true);
    let gt = ground_truth();
    let corr = project(&sonar, &gt, &camera_points());

    let mut last = 0.0;
    for step in 1..=8 {
        let delta = 0.005 * step as Real;
        let tvec = gt.translation + Vec3::new(delta, 0.0, 0.0);
        let err = projection_error(&corr, &sonar, &gt.rotation, &tvec);
        assert!(
            err > last,
            "error must grow monotonically: {err} <= {last} at delta {delta}"
        );
        last = err;
    }
}
