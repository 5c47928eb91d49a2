//! Core geometry primitives for `sonar-calib-rs`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec2`, `Pt3`, ...),
//! - the sonar measurement model ([`SonarParameters`], pixel/polar/Cartesian
//!   conversions),
//! - fiducial-board geometry (black-square centres, sonar-target labels),
//! - point-correspondence types and the label-join builder.
//!
//! Measurement pipeline:
//! `sonar pixel = pixel ∘ polar ∘ cartesian(sonar frame)`
//!
//! The sonar frame convention is x-forward, y-right, z-down; azimuth is
//! measured in the x/y plane with `atan2(y, x)`, positive to starboard.

/// Linear algebra type aliases and rotation helpers.
pub mod math;
/// Sonar measurement model and coordinate conversions.
pub mod sonar;
/// Fiducial-board geometry and sonar-target labels.
pub mod board;
/// Matched sonar-pixel / camera-point sets.
pub mod correspondences;

pub use board::*;
pub use correspondences::*;
pub use math::*;
pub use sonar::*;
