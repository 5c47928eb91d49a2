//! Matched sonar-pixel / camera-frame point sets.
//!
//! A correspondence set pairs human-labelled sonar pixels with the same
//! fiducials' 3D positions in the camera frame. The pairing is positional:
//! index `i` of both arrays refers to the same fiducial.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{rotation_from_rvec, Pt3, Vec2, Vec3};

/// Errors constructing a correspondence set.
#[derive(Debug, Error)]
pub enum CorrespondenceError {
    /// The paired arrays have different point counts. This is a contract
    /// violation on the caller's side, never a routine data state.
    #[error("mismatched point counts: {sonar} sonar pixels vs {camera} camera points")]
    LengthMismatch { sonar: usize, camera: usize },
}

/// Paired sonar-pixel and camera-frame points for one or more observations.
///
/// May be empty (no fiducials matched); callers must check [`is_empty`]
/// before handing the set to a solver.
///
/// [`is_empty`]: Correspondences::is_empty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Correspondences {
    sonar_pixels: Vec<Vec2>,
    camera_points: Vec<Pt3>,
}

impl Correspondences {
    /// Pair up pre-matched point arrays, rejecting mismatched counts.
    pub fn new(
        sonar_pixels: Vec<Vec2>,
        camera_points: Vec<Pt3>,
    ) -> Result<Self, CorrespondenceError> {
        if sonar_pixels.len() != camera_points.len() {
            return Err(CorrespondenceError::LengthMismatch {
                sonar: sonar_pixels.len(),
                camera: camera_points.len(),
            });
        }
        Ok(Self {
            sonar_pixels,
            camera_points,
        })
    }

    /// Number of matched point pairs.
    pub fn len(&self) -> usize {
        self.sonar_pixels.len()
    }

    /// True when no fiducials matched.
    pub fn is_empty(&self) -> bool {
        self.sonar_pixels.is_empty()
    }

    /// Observed sonar pixels, one per pair.
    pub fn sonar_pixels(&self) -> &[Vec2] {
        &self.sonar_pixels
    }

    /// Camera-frame 3D points, one per pair.
    pub fn camera_points(&self) -> &[Pt3] {
        &self.camera_points
    }

    /// Column-wise concatenation of several sets, preserving each set's
    /// internal order. Used to assemble multi-frame aggregates.
    pub fn concat<'a>(sets: impl IntoIterator<Item = &'a Correspondences>) -> Correspondences {
        let mut out = Correspondences::default();
        for set in sets {
            out.sonar_pixels.extend_from_slice(&set.sonar_pixels);
            out.camera_points.extend_from_slice(&set.camera_points);
        }
        out
    }
}

/// Join human labels with board geometry into a correspondence set.
///
/// Iterates the labels present in **both** maps in lexicographic order;
/// labels present in only one map are silently dropped (intersection join).
/// Each retained board point `(bx, by)` is lifted to `(bx, by, 0)` in the
/// board plane and moved into the camera frame through the externally
/// estimated board pose: `camera_point = t + R · (bx, by, 0)`.
///
/// An empty result is a valid output, not an error.
pub fn build_correspondences(
    labeled_pixels: &BTreeMap<String, Vec2>,
    board_coords: &BTreeMap<String, Vec2>,
    board_rvec: &Vec3,
    board_tvec: &Vec3,
) -> Correspondences {
    let rot = rotation_from_rvec(board_rvec);

    let mut sonar_pixels = Vec::new();
    let mut camera_points = Vec::new();
    for (label, pixel) in labeled_pixels {
        if let Some(coord) = board_coords.get(label) {
            let board_point = Vec3::new(coord.x, coord.y, 0.0);
            camera_points.push(Pt3::from(board_tvec + rot * board_point));
            sonar_pixels.push(*pixel);
        }
    }

    Correspondences {
        sonar_pixels,
        camera_points,
    }
}
