//! Non-linear optimization for sonar-camera extrinsic calibration.
//!
//! This crate provides the reprojection residual machinery and the two-stage
//! (translation-only, then full 6-DOF) Levenberg-Marquardt solve that fits a
//! camera→sonar rigid transform to a correspondence set.

pub mod backend_lm;
pub mod extrinsics;
pub mod reprojection;
pub mod traits;

pub use backend_lm::LmBackend;
pub use extrinsics::{
    solve_extrinsics, CalibrationResult, ExtrinsicTransform, SolveError, MAX_SOLVER_ITERATIONS,
    RETRY_ERROR_THRESHOLD,
};
pub use reprojection::{projection_error, SonarReprojectionProblem};
pub use traits::{NllsProblem, NllsSolverBackend, SolveOptions, SolveReport};
