//! Sonar reprojection residuals.
//!
//! The projection chain is shared between the residual vector the solver
//! minimizes and the scalar error reported to callers:
//! camera point → sonar frame (`t + R·p`) → polar → sonar pixel.

use nalgebra::DVector;
use sonar_calib_core::{rotation_from_rvec, Correspondences, Real, SonarParameters, Vec2, Vec3};

use crate::traits::NllsProblem;

/// Predicted sonar pixel of one camera-frame point under `(rvec, tvec)`.
fn predict_pixel(
    sonar: &SonarParameters,
    rot: &sonar_calib_core::Mat3,
    tvec: &Vec3,
    camera_point: &sonar_calib_core::Pt3,
) -> Vec2 {
    let sonar_point = tvec + rot * camera_point.coords;
    sonar.polar_to_pixel(&sonar.point_to_polar(&sonar_point))
}

/// Total reprojection error of a candidate camera→sonar transform.
///
/// Sum over all points of the Euclidean pixel distance between the
/// predicted and observed sonar pixel. Sums (not means) scale with the
/// point count; divide by `correspondences.len()` wherever errors from
/// differently sized sets are compared.
pub fn projection_error(
    correspondences: &Correspondences,
    sonar: &SonarParameters,
    rvec: &Vec3,
    tvec: &Vec3,
) -> Real {
    let rot = rotation_from_rvec(rvec);
    correspondences
        .camera_points()
        .iter()
        .zip(correspondences.sonar_pixels())
        .map(|(cam, observed)| (predict_pixel(sonar, &rot, tvec, cam) - observed).norm())
        .sum()
}

/// Which pose parameters a [`SonarReprojectionProblem`] exposes to the
/// optimizer.
#[derive(Debug, Clone, Copy)]
enum PoseParams {
    /// Rotation held fixed; the parameter vector is the 3-element
    /// translation.
    TranslationOnly { rotation: Vec3 },
    /// Full 6-DOF: `[rx, ry, rz, tx, ty, tz]`.
    Full,
}

/// Least-squares reprojection problem over one correspondence set.
///
/// Residual rows come in pairs per point: azimuth-pixel and range-pixel
/// deviation of the predicted sonar pixel from the observed one.
#[derive(Debug, Clone)]
pub struct SonarReprojectionProblem<'a> {
    correspondences: &'a Correspondences,
    sonar: &'a SonarParameters,
    pose: PoseParams,
}

impl<'a> SonarReprojectionProblem<'a> {
    /// Translation-only stage: rotation fixed at the prior.
    pub fn translation_only(
        correspondences: &'a Correspondences,
        sonar: &'a SonarParameters,
        rotation: Vec3,
    ) -> Self {
        Self {
            correspondences,
            sonar,
            pose: PoseParams::TranslationOnly { rotation },
        }
    }

    /// Full 6-DOF pose stage.
    pub fn full_pose(correspondences: &'a Correspondences, sonar: &'a SonarParameters) -> Self {
        Self {
            correspondences,
            sonar,
            pose: PoseParams::Full,
        }
    }

    /// Decode a parameter vector into `(rvec, tvec)`.
    pub fn decode(&self, x: &DVector<Real>) -> (Vec3, Vec3) {
        match self.pose {
            PoseParams::TranslationOnly { rotation } => {
                (rotation, Vec3::new(x[0], x[1], x[2]))
            }
            PoseParams::Full => (
                Vec3::new(x[0], x[1], x[2]),
                Vec3::new(x[3], x[4], x[5]),
            ),
        }
    }
}

impl NllsProblem for SonarReprojectionProblem<'_> {
    fn num_params(&self) -> usize {
        match self.pose {
            PoseParams::TranslationOnly { .. } => 3,
            PoseParams::Full => 6,
        }
    }

    fn num_residuals(&self) -> usize {
        2 * self.correspondences.len()
    }

    fn residuals(&self, x: &DVector<Real>) -> DVector<Real> {
        let (rvec, tvec) = self.decode(x);
        let rot = rotation_from_rvec(&rvec);

        let mut r = DVector::zeros(self.num_residuals());
        for (i, (cam, observed)) in self
            .correspondences
            .camera_points()
            .iter()
            .zip(self.correspondences.sonar_pixels())
            .enumerate()
        {
            let d = predict_pixel(self.sonar, &rot, &tvec, cam) - observed;
            r[2 * i] = d.x;
            r[2 * i + 1] = d.y;
        }
        r
    }
}
