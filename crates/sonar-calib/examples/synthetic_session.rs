//! End-to-end calibration session on synthetic data.
//!
//! Simulates three observations of the standard board from slightly
//! different poses, labels every sonar target by projecting it through a
//! known camera→sonar transform, then recovers that transform per-frame and
//! from the aggregate.

use std::collections::BTreeMap;

use anyhow::Result;
use nalgebra::Vector3;
use sonar_calib::core::{rotation_from_rvec, BoardGeometry, Vec2, Vec3};
use sonar_calib::{BoardPose, CalibrationSession, ExtrinsicTransform, SonarParameters};

fn label_board(
    sonar: &SonarParameters,
    truth: &ExtrinsicTransform,
    pose: &BoardPose,
) -> BTreeMap<String, Vec2> {
    let rot = rotation_from_rvec(&pose.rotation);
    BoardGeometry::standard()
        .target_coords()
        .into_iter()
        .map(|(label, coord)| {
            let camera_point = pose.translation + rot * Vec3::new(coord.x, coord.y, 0.0);
            let sonar_point = truth.transform_point(&camera_point);
            (label, sonar.polar_to_pixel(&sonar.point_to_polar(&sonar_point)))
        })
        .collect()
}

fn main() -> Result<()> {
    let sonar = SonarParameters::new(1.6, true);

    // The transform we pretend not to know: the conventional mount
    // alignment plus a few centimetres of offset.
    let mut truth = ExtrinsicTransform::default_prior();
    truth.translation = Vector3::new(0.05, -0.02, 0.1);

    let mut session = CalibrationSession::new(sonar);
    for i in 0..3 {
        let pose = BoardPose {
            rotation: Vec3::new(0.0, 0.08 * i as f64, 0.0),
            translation: Vec3::new(-0.13 + 0.04 * i as f64, -0.1, 0.9),
        };
        let frame_id = format!("frame-{i}");
        session.set_labels(frame_id.clone(), label_board(&sonar, &truth, &pose));
        let n = session.build_and_accumulate(frame_id.clone(), &pose);
        println!("{frame_id}: {n} labelled targets");

        let result = session.solve_frame(&frame_id)?;
        println!(
            "  single-frame: t = {:.4?}, error = {:.4}, converged = {}",
            result.transform.translation.as_slice(),
            result.residual_error,
            result.converged
        );
    }

    let ids: Vec<_> = session.frame_ids().cloned().collect();
    let aggregate = session.solve_aggregate(&ids, None)?;
    println!(
        "aggregate over {} frames: t = {:.4?}, r = {:.4?}, error = {:.4}",
        ids.len(),
        aggregate.transform.translation.as_slice(),
        aggregate.transform.rotation.as_slice(),
        aggregate.residual_error
    );
    println!(
        "ground truth:            t = {:.4?}, r = {:.4?}",
        truth.translation.as_slice(),
        truth.rotation.as_slice()
    );

    for id in &ids {
        let fit = session.solve_aggregate(&ids, Some(id))?;
        println!("{id}: per-point error against aggregate = {:.5}", fit.residual_error);
    }

    Ok(())
}
