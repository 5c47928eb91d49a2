//! Session-level calibration workflow.
//!
//! A [`CalibrationSession`] is the explicit shared-state object of a
//! calibration run: it owns the sonar parameters, the board-coordinate map,
//! the solver prior, per-frame label annotations and the accumulation map of
//! per-frame correspondences. Everything else is a pure function of its
//! inputs; concurrent use of one session requires external synchronization.
//!
//! Single-frame and aggregate solves both go through
//! [`sonar_calib_optim::solve_extrinsics`]; there is no duplicated
//! optimization path.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sonar_calib_core::{
    build_correspondences, BoardGeometry, Correspondences, SonarParameters, Vec2, Vec3,
};
use sonar_calib_optim::{
    projection_error, solve_extrinsics, CalibrationResult, ExtrinsicTransform, SolveError,
    SolveOptions,
};

/// Identifier of one observation frame (typically a timestamp string).
pub type FrameId = String;

/// Board pose in the camera frame, as supplied by an external fiducial
/// detector (Rodrigues rotation, translation in metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardPose {
    pub rotation: Vec3,
    pub translation: Vec3,
}

/// Errors from session-level operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The accumulation map holds nothing for the requested solve.
    #[error("no accumulated correspondences to solve")]
    EmptyAccumulation,
    /// A requested frame id has no accumulated correspondences.
    #[error("frame {0:?} has no accumulated correspondences")]
    UnknownFrame(FrameId),
    /// Solver-level failure (e.g. an empty correspondence set).
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Shared state for one calibration run.
pub struct CalibrationSession {
    sonar: SonarParameters,
    board_coords: BTreeMap<String, Vec2>,
    prior: ExtrinsicTransform,
    opts: SolveOptions,
    labels: BTreeMap<FrameId, BTreeMap<String, Vec2>>,
    frames: BTreeMap<FrameId, Correspondences>,
}

impl CalibrationSession {
    /// New session for one sonar configuration, with the standard board,
    /// the conventional camera→sonar prior and default solver settings.
    pub fn new(sonar: SonarParameters) -> Self {
        Self {
            sonar,
            board_coords: BoardGeometry::standard().target_coords(),
            prior: ExtrinsicTransform::default_prior(),
            opts: SolveOptions::default(),
            labels: BTreeMap::new(),
            frames: BTreeMap::new(),
        }
    }

    /// Replace the label → board-coordinate map (metres).
    pub fn with_board_coords(mut self, coords: BTreeMap<String, Vec2>) -> Self {
        self.board_coords = coords;
        self
    }

    /// Replace the solver prior used for every solve in this session.
    pub fn with_prior(mut self, prior: ExtrinsicTransform) -> Self {
        self.prior = prior;
        self
    }

    /// Replace the solver termination settings.
    pub fn with_solve_options(mut self, opts: SolveOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Sonar parameters this session was created with.
    pub fn sonar(&self) -> &SonarParameters {
        &self.sonar
    }

    /// Store (or replace) the human label → sonar-pixel annotations for a
    /// frame.
    pub fn set_labels(&mut self, frame_id: impl Into<FrameId>, labels: BTreeMap<String, Vec2>) {
        self.labels.insert(frame_id.into(), labels);
    }

    /// Join a frame's stored labels with the board map under the given
    /// board pose. Frames without labels yield an empty set.
    pub fn frame_correspondences(&self, frame_id: &str, pose: &BoardPose) -> Correspondences {
        match self.labels.get(frame_id) {
            Some(labeled) => build_correspondences(
                labeled,
                &self.board_coords,
                &pose.rotation,
                &pose.translation,
            ),
            None => Correspondences::default(),
        }
    }

    /// Build a frame's correspondences from its labels and accumulate them.
    /// Returns the number of matched pairs.
    pub fn build_and_accumulate(&mut self, frame_id: impl Into<FrameId>, pose: &BoardPose) -> usize {
        let frame_id = frame_id.into();
        let corr = self.frame_correspondences(&frame_id, pose);
        let n = corr.len();
        self.accumulate(frame_id, corr);
        n
    }

    /// Store (or replace) a frame's correspondences. Last write wins; stale
    /// results are the caller's to discard.
    pub fn accumulate(&mut self, frame_id: impl Into<FrameId>, correspondences: Correspondences) {
        self.frames.insert(frame_id.into(), correspondences);
    }

    /// Accumulated correspondences for one frame, if any.
    pub fn correspondences(&self, frame_id: &str) -> Option<&Correspondences> {
        self.frames.get(frame_id)
    }

    /// Ids of all accumulated frames, in sorted order.
    pub fn frame_ids(&self) -> impl Iterator<Item = &FrameId> {
        self.frames.keys()
    }

    /// Fit a transform to a single frame's accumulated correspondences.
    pub fn solve_frame(&self, frame_id: &str) -> Result<CalibrationResult, SessionError> {
        let corr = self
            .frames
            .get(frame_id)
            .ok_or_else(|| SessionError::UnknownFrame(frame_id.to_owned()))?;
        Ok(solve_extrinsics(corr, &self.sonar, &self.prior, &self.opts)?)
    }

    /// Fit one transform to the concatenation of several frames'
    /// correspondences (each frame's internal order preserved).
    ///
    /// When `focus_frame` names an accumulated, non-empty frame, the
    /// returned `residual_error` is the aggregate transform's error on only
    /// that frame's points divided by that frame's point count: how well
    /// the global calibration explains that one frame.
    pub fn solve_aggregate(
        &self,
        frame_ids: &[FrameId],
        focus_frame: Option<&str>,
    ) -> Result<CalibrationResult, SessionError> {
        if self.frames.is_empty() || frame_ids.is_empty() {
            return Err(SessionError::EmptyAccumulation);
        }

        let mut sets = Vec::with_capacity(frame_ids.len());
        for id in frame_ids {
            let corr = self
                .frames
                .get(id)
                .ok_or_else(|| SessionError::UnknownFrame(id.clone()))?;
            sets.push(corr);
        }

        let combined = Correspondences::concat(sets);
        debug!(
            "aggregate solve over {} frames, {} point pairs",
            frame_ids.len(),
            combined.len()
        );
        let mut result = solve_extrinsics(&combined, &self.sonar, &self.prior, &self.opts)?;

        if let Some(focus) = focus_frame {
            if let Some(corr) = self.frames.get(focus).filter(|c| !c.is_empty()) {
                let err = projection_error(
                    corr,
                    &self.sonar,
                    &result.transform.rotation,
                    &result.transform.translation,
                );
                result.residual_error = err / corr.len() as f64;
            }
        }

        Ok(result)
    }
}
