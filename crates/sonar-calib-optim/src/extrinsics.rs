//! Two-stage camera→sonar extrinsic solve.
//!
//! Stage 1 holds rotation fixed at the prior and fits translation only; the
//! full 6-DOF stage 2 is then seeded from that translation. Translation is
//! far better conditioned than full pose from sparse single-frame
//! correspondences, so solving it first avoids poor local minima. Each stage
//! retries exactly once, reseeded from its own output, when the backend
//! reports non-success or the residual stays above
//! [`RETRY_ERROR_THRESHOLD`]; the final answer is always returned, tagged
//! with an explicit `converged` flag.

use log::debug;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use sonar_calib_core::{
    rotation_from_rvec, rvec_from_rotation, Correspondences, Iso3, Mat3, Real, SonarParameters,
    Vec3,
};
use thiserror::Error;

use crate::backend_lm::LmBackend;
use crate::reprojection::{projection_error, SonarReprojectionProblem};
use crate::traits::{NllsSolverBackend, SolveOptions};

/// Iteration cap per solver attempt.
pub const MAX_SOLVER_ITERATIONS: usize = 3000;

/// Residual (summed pixel error) above which a stage is retried once.
pub const RETRY_ERROR_THRESHOLD: Real = 100.0;

/// Errors from the extrinsic solver.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The correspondence set is empty; callers must check before solving.
    #[error("cannot solve extrinsics from an empty correspondence set")]
    NoCorrespondences,
}

/// Rigid camera→sonar transform as axis-angle rotation plus translation.
///
/// The direction is fixed: applying the transform takes camera-frame points
/// into the sonar frame. Reversed or chained transforms (sonar→board, ...)
/// are derived explicitly via [`compose`](Self::compose), never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrinsicTransform {
    /// Axis-angle (Rodrigues) rotation vector.
    pub rotation: Vec3,
    /// Translation in metres.
    pub translation: Vec3,
}

impl ExtrinsicTransform {
    pub fn new(rotation: Vec3, translation: Vec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Conventional starting guess for a forward-looking sonar under a
    /// camera: a 2π/3 turn about [1, 1, 1], which maps the camera's
    /// x-right/z-forward axes onto the sonar's x-forward/y-right, with
    /// zero offset.
    pub fn default_prior() -> Self {
        Self {
            rotation: Vec3::new(1.2092, 1.2092, 1.2092),
            translation: Vec3::zeros(),
        }
    }

    /// Rotation part as a matrix.
    pub fn rotation_matrix(&self) -> Mat3 {
        rotation_from_rvec(&self.rotation)
    }

    /// The transform as an SE(3) isometry.
    pub fn isometry(&self) -> Iso3 {
        Iso3::new(self.translation, self.rotation)
    }

    /// Map a camera-frame point into the sonar frame.
    pub fn transform_point(&self, camera_point: &Vec3) -> Vec3 {
        self.translation + self.rotation_matrix() * camera_point
    }

    /// Chain with another transform: `self ∘ other`.
    ///
    /// With `self` camera→sonar and `other` board→camera, the result is the
    /// board→sonar transform.
    pub fn compose(&self, other: &ExtrinsicTransform) -> ExtrinsicTransform {
        let rot = self.rotation_matrix() * other.rotation_matrix();
        ExtrinsicTransform {
            rotation: rvec_from_rotation(&rot),
            translation: self.translation + self.rotation_matrix() * other.translation,
        }
    }
}

/// Outcome of an extrinsic solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Fitted camera→sonar transform.
    pub transform: ExtrinsicTransform,
    /// Summed reprojection error in pixel units (see
    /// [`projection_error`]); for aggregate solves with a focus frame this
    /// is instead that frame's per-point mean.
    pub residual_error: Real,
    /// False when either stage still failed after its retry.
    pub converged: bool,
    /// Number of point pairs the transform was fitted to.
    pub point_count: usize,
}

/// Run one stage with its single retry, reseeding from the unconverged
/// output. Returns the final parameters, the converged flag and the final
/// scalar error.
fn minimize_stage(
    problem: &SonarReprojectionProblem<'_>,
    correspondences: &Correspondences,
    sonar: &SonarParameters,
    x0: DVector<Real>,
    opts: &SolveOptions,
) -> (DVector<Real>, bool, Real) {
    let backend = LmBackend;

    let mut x = x0;
    for attempt in 0..2 {
        let (x_opt, report) = backend.solve(problem, x, opts);
        let (rvec, tvec) = problem.decode(&x_opt);
        let err = projection_error(correspondences, sonar, &rvec, &tvec);

        if report.converged && err <= RETRY_ERROR_THRESHOLD {
            return (x_opt, true, err);
        }
        if attempt == 0 {
            debug!(
                "stage did not converge (backend success: {}, error {:.3}); retrying once",
                report.converged, err
            );
            x = x_opt;
        } else {
            return (x_opt, false, err);
        }
    }
    unreachable!("stage loop returns within two attempts")
}

/// Fit a camera→sonar transform to one correspondence set.
///
/// Requires at least one point pair; degenerate geometry is not rejected up
/// front and shows up as a large residual or `converged = false`.
pub fn solve_extrinsics(
    correspondences: &Correspondences,
    sonar: &SonarParameters,
    prior: &ExtrinsicTransform,
    opts: &SolveOptions,
) -> Result<CalibrationResult, SolveError> {
    if correspondences.is_empty() {
        return Err(SolveError::NoCorrespondences);
    }

    // Stage 1: translation only, rotation pinned to the prior.
    let stage1 = SonarReprojectionProblem::translation_only(correspondences, sonar, prior.rotation);
    let t0 = prior.translation;
    let (x1, converged1, err1) = minimize_stage(
        &stage1,
        correspondences,
        sonar,
        nalgebra::dvector![t0.x, t0.y, t0.z],
        opts,
    );
    debug!("translation stage error: {:.4}", err1);

    // Stage 2: full pose, seeded from the prior rotation and the stage-1
    // translation.
    let stage2 = SonarReprojectionProblem::full_pose(correspondences, sonar);
    let r0 = prior.rotation;
    let (x2, converged2, err2) = minimize_stage(
        &stage2,
        correspondences,
        sonar,
        nalgebra::dvector![r0.x, r0.y, r0.z, x1[0], x1[1], x1[2]],
        opts,
    );
    debug!("full-pose stage error: {:.4}", err2);

    let (rvec, tvec) = stage2.decode(&x2);
    Ok(CalibrationResult {
        transform: ExtrinsicTransform::new(rvec, tvec),
        residual_error: err2,
        converged: converged1 && converged2,
        point_count: correspondences.len(),
    })
}
