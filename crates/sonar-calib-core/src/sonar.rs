//! Sonar measurement model.
//!
//! An imaging sonar reports a fan of (azimuth, range) cells, delivered as a
//! rectangular pixel image with azimuth along x and range along y. This
//! module holds the per-session acquisition constants and the canonical
//! conversions between pixel, polar and Cartesian space.

use serde::{Deserialize, Serialize};

use crate::math::{Real, Vec2, Vec3};

/// A point in the sonar's native polar measurement space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    /// Azimuth in degrees, zero at the fan centre, positive to starboard.
    pub azimuth_deg: Real,
    /// Range from the transducer in metres.
    pub range_m: Real,
}

/// Acquisition constants for one sonar configuration.
///
/// All resolution/aperture/bin fields are derived deterministically from
/// `(range_max, is_wide)` by [`SonarParameters::new`] and must not be edited
/// afterwards; every pixel/polar conversion in a session closes over one
/// instance of this struct.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SonarParameters {
    /// Maximum range of the acquisition window in metres.
    pub range_max: Real,
    /// Wide (130°) vs narrow (40°) aperture mode.
    pub is_wide: bool,
    /// Metres per range bin.
    pub range_resolution: Real,
    /// Degrees per azimuth bin.
    pub azimuth_resolution: Real,
    /// Total azimuth aperture in degrees.
    pub aperture_deg: Real,
    /// Number of azimuth bins (image columns).
    pub theta_bins: usize,
    /// Number of range bins (image rows).
    pub range_bins: usize,
    /// Column of the fan apex in the vendor's raw Cartesian display.
    pub pixel_center_x: usize,
}

impl SonarParameters {
    /// Derive the full parameter set from the acquisition configuration.
    ///
    /// Range resolution drops to 2 mm below 1.5 m window length. Wide mode
    /// has a fixed 216-column image; narrow mode derives the column count
    /// from aperture and resolution.
    pub fn new(range_max: Real, is_wide: bool) -> Self {
        let range_resolution = if range_max >= 1.5 { 0.0025 } else { 0.002 };
        let range_bins = (range_max / range_resolution) as usize;

        let (aperture_deg, azimuth_resolution, theta_bins, pixel_center_x) = if is_wide {
            (130.0, 0.6, 216, 808)
        } else {
            let aperture: Real = 40.0;
            let res: Real = 0.4;
            (aperture, res, (aperture / res) as usize, 305)
        };

        Self {
            range_max,
            is_wide,
            range_resolution,
            azimuth_resolution,
            aperture_deg,
            theta_bins,
            range_bins,
            pixel_center_x,
        }
    }

    /// Polar coordinates of a sonar-image pixel.
    ///
    /// `azimuth = px · azimuth_resolution − aperture/2`,
    /// `range = py · range_resolution`. Total, no failure modes.
    pub fn pixel_to_polar(&self, pixel: Vec2) -> PolarPoint {
        PolarPoint {
            azimuth_deg: pixel.x * self.azimuth_resolution - 0.5 * self.aperture_deg,
            range_m: pixel.y * self.range_resolution,
        }
    }

    /// Sonar-image pixel of a polar point. Exact inverse of
    /// [`pixel_to_polar`](Self::pixel_to_polar).
    pub fn polar_to_pixel(&self, polar: &PolarPoint) -> Vec2 {
        Vec2::new(
            (polar.azimuth_deg + 0.5 * self.aperture_deg) / self.azimuth_resolution,
            polar.range_m / self.range_resolution,
        )
    }

    /// Polar coordinates of a 3D point expressed in the sonar frame
    /// (x-forward, y-right, z-down).
    ///
    /// Range is the Euclidean norm; azimuth is `atan2(y, x)` in degrees,
    /// positive to starboard. This is the single azimuth convention used
    /// everywhere in the library.
    pub fn point_to_polar(&self, point: &Vec3) -> PolarPoint {
        PolarPoint {
            azimuth_deg: point.y.atan2(point.x).to_degrees(),
            range_m: point.norm(),
        }
    }

    /// [`point_to_polar`](Self::point_to_polar) over a slice of points.
    pub fn points_to_polar(&self, points: &[Vec3]) -> Vec<PolarPoint> {
        points.iter().map(|p| self.point_to_polar(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wide_mode_constants() {
        let sonar = SonarParameters::new(1.6, true);
        assert_relative_eq!(sonar.azimuth_resolution, 0.6);
        assert_relative_eq!(sonar.aperture_deg, 130.0);
        assert_relative_eq!(sonar.range_resolution, 0.0025);
        assert_eq!(sonar.theta_bins, 216);
        assert_eq!(sonar.range_bins, 640);
        assert_eq!(sonar.pixel_center_x, 808);
    }

    #[test]
    fn narrow_mode_constants() {
        let sonar = SonarParameters::new(1.0, false);
        assert_relative_eq!(sonar.azimuth_resolution, 0.4);
        assert_relative_eq!(sonar.aperture_deg, 40.0);
        assert_relative_eq!(sonar.range_resolution, 0.002);
        assert_eq!(sonar.theta_bins, 100);
        assert_eq!(sonar.range_bins, 500);
    }

    #[test]
    fn pixel_to_polar_example() {
        // 100 px * 0.6 deg - 65 deg = -5 deg, 50 px * 2.5 mm = 0.125 m.
        let sonar = SonarParameters::new(1.6, true);
        let polar = sonar.pixel_to_polar(Vec2::new(100.0, 50.0));
        assert_relative_eq!(polar.azimuth_deg, -5.0, epsilon = 1e-12);
        assert_relative_eq!(polar.range_m, 0.125, epsilon = 1e-12);
    }

    #[test]
    fn pixel_polar_round_trip() {
        for &(range_max, wide) in &[(1.6, true), (1.2, false), (2.5, true)] {
            let sonar = SonarParameters::new(range_max, wide);
            for &(px, py) in &[(0.0, 0.0), (10.5, 3.25), (215.0, 639.0), (57.0, 128.0)] {
                let pixel = Vec2::new(px, py);
                let back = sonar.polar_to_pixel(&sonar.pixel_to_polar(pixel));
                assert_relative_eq!(back, pixel, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn azimuth_sign_convention() {
        let sonar = SonarParameters::new(1.6, true);

        // Straight ahead.
        let ahead = sonar.point_to_polar(&Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(ahead.azimuth_deg, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ahead.range_m, 2.0, epsilon = 1e-12);

        // To starboard (+y) is positive azimuth.
        let starboard = sonar.point_to_polar(&Vec3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(starboard.azimuth_deg, 45.0, epsilon = 1e-12);

        let port = sonar.point_to_polar(&Vec3::new(1.0, -1.0, 0.0));
        assert_relative_eq!(port.azimuth_deg, -45.0, epsilon = 1e-12);
    }

    #[test]
    fn range_includes_depth_axis() {
        let sonar = SonarParameters::new(1.6, true);
        let polar = sonar.point_to_polar(&Vec3::new(3.0, 0.0, 4.0));
        assert_relative_eq!(polar.range_m, 5.0, epsilon = 1e-12);
    }
}
