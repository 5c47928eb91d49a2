//! Mathematical type definitions and small rotation utilities.

use nalgebra::{Isometry3, Matrix3, Point2, Point3, Rotation3, Vector2, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// 3D rigid transform (SE(3)) using [`Real`].
pub type Iso3 = Isometry3<Real>;

/// Rotation matrix from an axis-angle (Rodrigues) vector.
///
/// Total on all inputs; the zero vector maps to the identity.
pub fn rotation_from_rvec(rvec: &Vec3) -> Mat3 {
    Rotation3::from_scaled_axis(*rvec).into_inner()
}

/// Axis-angle (Rodrigues) vector from a rotation matrix.
///
/// Inverse of [`rotation_from_rvec`] up to the usual 2π ambiguity.
pub fn rvec_from_rotation(rot: &Mat3) -> Vec3 {
    Rotation3::from_matrix(rot).scaled_axis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_rvec_is_identity() {
        let rot = rotation_from_rvec(&Vec3::zeros());
        assert_relative_eq!(rot, Mat3::identity(), epsilon = 1e-14);
    }

    #[test]
    fn rvec_round_trip() {
        let rvec = Vec3::new(0.3, -0.2, 0.7);
        let back = rvec_from_rotation(&rotation_from_rvec(&rvec));
        assert_relative_eq!(back, rvec, epsilon = 1e-10);
    }

    #[test]
    fn quarter_turn_about_z() {
        let rvec = Vec3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        let rot = rotation_from_rvec(&rvec);
        let p = rot * Vec3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(p, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }
}
