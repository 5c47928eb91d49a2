//! Sonar-camera extrinsic calibration.
//!
//! Umbrella crate re-exporting the public API of the `sonar-calib-*`
//! workspace members:
//!
//! - [`core`]: sonar measurement model, board geometry, correspondences;
//! - [`optim`]: reprojection residuals and the two-stage extrinsic solver;
//! - [`pipeline`]: the session object for multi-frame calibration runs.
//!
//! See `examples/synthetic_session.rs` for an end-to-end run on synthetic
//! data.

pub use sonar_calib_core as core;
pub use sonar_calib_optim as optim;
pub use sonar_calib_pipeline as pipeline;

pub use sonar_calib_core::{
    build_correspondences, BoardGeometry, Correspondences, PolarPoint, SonarParameters,
};
pub use sonar_calib_optim::{
    projection_error, solve_extrinsics, CalibrationResult, ExtrinsicTransform, SolveError,
    SolveOptions,
};
pub use sonar_calib_pipeline::{BoardPose, CalibrationSession, FrameId, SessionError};
