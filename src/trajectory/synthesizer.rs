// src/trajectory/synthesizer.rs
//
// Route plan → trajectory.
//
// Pipeline:
//   1. Every maneuver segment becomes a small local-frame primitive
//      (8 points): a horizontal line for straights, a slerped unit arc scaled
//      by the radius for turns.
//   2. Primitives are placed at the pose left by the previous segment; the
//      heading accumulates the signed turn angles.
//   3. The concatenated polyline is deduplicated and rotated +90° about the
//      initial location. Synthesis treats heading 0 as +x, consumers treat it
//      as +y (north).
//   4. The polyline is resampled with a cubic spline every `sampling_unit`
//      meters. A sample survives only if it stays within
//      ATTRIBUTION_THRESHOLD of the segment it was sampled from, so spline
//      overshoot never leaks into the final path.
//
// Synthesis is deterministic: identical inputs give bit-identical output.

use crate::error::RouteError;
use crate::geometry::{
    distance_to_polyline, polyline_length, remove_duplicates, resample_with_params, Point2, Pose,
    EPSILON,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::maneuver::{ManeuverSegment, RoutePlan};

/// Points in every local primitive, straight or turn.
pub const POINTS_PER_PRIMITIVE: usize = 8;

/// Maximum distance between a resampled point and its source segment.
pub const ATTRIBUTION_THRESHOLD: f64 = 0.5;

/// Default spatial sampling interval in meters.
pub const DEFAULT_SAMPLING_UNIT: f64 = 5.0;

/// Rotation between the synthesis frame and the consumer frame.
const FRAME_ROTATION_DEG: f64 = 90.0;

/// Resampled points closer than this to an accepted point are dropped.
const DUPLICATE_TOLERANCE: f64 = 1e-6;

/// A resampled, duplicate-free path. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    points: Vec<Point2>,
    sampling_unit: f64,
    heading_change_deg: f64,
}

impl Trajectory {
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn sampling_unit(&self) -> f64 {
        self.sampling_unit
    }

    /// Net heading change accumulated over the route (sum of turn angles).
    pub fn heading_change_deg(&self) -> f64 {
        self.heading_change_deg
    }

    pub fn length(&self) -> f64 {
        polyline_length(&self.points)
    }
}

/// Build the local-frame primitive for one segment, starting at the origin
/// and heading along +x.
fn primitive(segment: &ManeuverSegment) -> Vec<Point2> {
    let steps = (POINTS_PER_PRIMITIVE - 1) as f64;
    match *segment {
        ManeuverSegment::Straight { length } => (0..POINTS_PER_PRIMITIVE)
            .map(|i| Point2::new(length * i as f64 / steps, 0.0))
            .collect(),
        ManeuverSegment::Turn { angle, radius } => {
            let start = Point2::new(1.0, 0.0);
            // Unit arc from (1, 0) sweeping `angle`, moved so it starts at the
            // origin, then turned so its tangent there is +x.
            let align = if angle > 0.0 { -90.0 } else { 90.0 };
            (0..POINTS_PER_PRIMITIVE)
                .map(|i| {
                    let on_circle = slerp(start, angle, i as f64 / steps);
                    (on_circle - start).rotate_deg(align) * radius
                })
                .collect()
        }
    }
}

/// Spherical interpolation of a unit vector over a signed sweep.
/// t = 0 gives `start`, t = 1 gives `start` rotated by `sweep_deg`.
fn slerp(start: Point2, sweep_deg: f64, t: f64) -> Point2 {
    start.rotate_deg(sweep_deg * t)
}

/// Turn a route plan into a uniformly resampled trajectory.
pub fn synthesize(
    initial_pose: Pose,
    plan: &RoutePlan,
    sampling_unit: f64,
) -> Result<Trajectory, RouteError> {
    plan.validate()?;
    if !(sampling_unit.is_finite() && sampling_unit > 0.0) {
        return Err(RouteError::InvalidRoutePlan(format!(
            "sampling unit must be positive, got {}",
            sampling_unit
        )));
    }

    let pivot = initial_pose.position;
    let to_consumer_frame = |p: Point2| p.rotate_about(FRAME_ROTATION_DEG, pivot);

    let mut pose = initial_pose;
    let mut path = vec![to_consumer_frame(initial_pose.position)];
    // Per-segment polylines (consumer frame) and their chord-length spans.
    let mut pieces: Vec<Vec<Point2>> = Vec::with_capacity(plan.segment_count());
    let mut spans: Vec<(f64, f64)> = Vec::with_capacity(plan.segment_count());
    let mut covered = 0.0;

    for segment in plan.segments() {
        let placed: Vec<Point2> = primitive(segment)
            .into_iter()
            .map(|p| pose.to_world(p))
            .collect();
        let end = placed[placed.len() - 1];
        pose = Pose::new(end, pose.heading_deg + segment.heading_change());

        let piece: Vec<Point2> = placed.into_iter().map(to_consumer_frame).collect();
        let piece_len = polyline_length(&piece);
        spans.push((covered, covered + piece_len));
        covered += piece_len;
        path.extend_from_slice(&piece);
        pieces.push(piece);
    }

    let path = remove_duplicates(&path, EPSILON);
    if path.len() < 2 {
        return Err(RouteError::InvalidRoutePlan(format!(
            "route plan produced {} distinct point(s), need at least 2",
            path.len()
        )));
    }

    let samples = resample_with_params(&path, sampling_unit);
    let mut points: Vec<Point2> = Vec::with_capacity(samples.len());
    let mut dropped = 0usize;
    let mut piece_idx = 0usize;

    for (s, p) in samples {
        // Samples come in increasing s; advance to the segment covering s.
        while piece_idx + 1 < spans.len() && s > spans[piece_idx].1 + EPSILON {
            piece_idx += 1;
        }
        let close_enough = distance_to_polyline(p, &pieces[piece_idx]) < ATTRIBUTION_THRESHOLD;
        let duplicate = points
            .last()
            .is_some_and(|q| q.distance(p) <= DUPLICATE_TOLERANCE);
        if close_enough && !duplicate {
            points.push(p);
        } else {
            dropped += 1;
        }
    }

    if points.len() < 2 {
        return Err(RouteError::InvalidRoutePlan(format!(
            "only {} trajectory point(s) survived resampling",
            points.len()
        )));
    }

    debug!(
        "Synthesized trajectory: {} segments → {} points ({} dropped), length {:.1}m",
        pieces.len(),
        points.len(),
        dropped,
        polyline_length(&points)
    );

    Ok(Trajectory {
        points,
        sampling_unit,
        heading_change_deg: pose.heading_deg - initial_pose.heading_deg,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::resample;
    use crate::trajectory::DrivingAction;
    use proptest::prelude::*;

    /// Re-resampling a curved trajectory at its own unit drifts by at most
    /// this much: chords through the samples are shorter than the arcs they
    /// were taken from, so later samples slide back along the path.
    const CURVED_RESAMPLE_DRIFT: f64 = 0.25;

    fn plan_of(segments: Vec<ManeuverSegment>) -> RoutePlan {
        RoutePlan::new(vec![DrivingAction::new(segments)])
    }

    #[test]
    fn test_straight_plan_is_collinear() {
        let plan = RoutePlan::new(vec![
            DrivingAction::single(ManeuverSegment::straight(10.0)),
            DrivingAction::single(ManeuverSegment::straight(35.0)),
        ]);
        let traj = synthesize(Pose::new(Point2::new(10.0, 10.0), 0.0), &plan, 5.0).unwrap();
        let pts = traj.points();
        assert_eq!(pts.len(), 10, "45m at 5m spacing → 10 points, got {}", pts.len());
        for w in pts.windows(3) {
            let cross = (w[1] - w[0]).cross(w[2] - w[1]);
            assert!(cross.abs() < 1e-6, "points not collinear: {:?}", w);
        }
        // Heading 0 in synthesis frame points north after the frame rotation.
        assert!(pts[0].approx_eq(Point2::new(10.0, 10.0), 1e-9));
        assert!(pts[pts.len() - 1].approx_eq(Point2::new(10.0, 55.0), 1e-3));
    }

    #[test]
    fn test_left_turn_stays_on_circle() {
        let radius = 20.0;
        let plan = plan_of(vec![ManeuverSegment::turn(90.0, radius)]);
        let traj = synthesize(Pose::default(), &plan, 1.0).unwrap();

        // Left turn from the origin heading north: centre sits at (-r, 0).
        let centre = Point2::new(-radius, 0.0);
        let half_step = (90.0f64 / (POINTS_PER_PRIMITIVE - 1) as f64 / 2.0).to_radians();
        let sagitta = radius * (1.0 - half_step.cos());
        let tol = ATTRIBUTION_THRESHOLD + sagitta;
        for p in traj.points() {
            let d = p.distance(centre);
            assert!((d - radius).abs() <= tol, "point {:?} at distance {} from centre", p, d);
        }
        assert_eq!(traj.heading_change_deg(), 90.0);

        // Ends heading west.
        let end = traj.points()[traj.len() - 1];
        assert!(end.approx_eq(Point2::new(-radius, radius), 1e-3), "end {:?}", end);
    }

    #[test]
    fn test_right_turn_bends_the_other_way() {
        let radius = 30.0;
        let plan = plan_of(vec![ManeuverSegment::turn(-60.0, radius)]);
        let traj = synthesize(Pose::default(), &plan, 2.0).unwrap();
        let centre = Point2::new(radius, 0.0);
        for p in traj.points() {
            assert!(p.x >= -0.01, "right turn from north must move east: {:?}", p);
            assert!((p.distance(centre) - radius).abs() < 1.0);
        }
        assert_eq!(traj.heading_change_deg(), -60.0);
    }

    #[test]
    fn test_heading_accumulates_across_actions() {
        let plan = RoutePlan::new(vec![
            DrivingAction::new(vec![
                ManeuverSegment::straight(30.0),
                ManeuverSegment::turn(-90.0, 20.0),
                ManeuverSegment::turn(-20.0, 100.0),
            ]),
            DrivingAction::new(vec![
                ManeuverSegment::straight(4.0),
                ManeuverSegment::turn(45.0, 12.0),
            ]),
        ]);
        let traj = synthesize(Pose::new(Point2::new(10.0, 10.0), 0.0), &plan, 5.0).unwrap();
        assert_eq!(traj.heading_change_deg(), -65.0);
        for w in traj.points().windows(2) {
            assert!(w[0].distance(w[1]) > 1e-6, "consecutive duplicates: {:?}", w);
        }
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let plan = plan_of(vec![
            ManeuverSegment::straight(20.0),
            ManeuverSegment::turn(-90.0, 40.0),
            ManeuverSegment::turn(20.0, 100.0),
        ]);
        let a = synthesize(Pose::new(Point2::new(10.0, 10.0), 0.0), &plan, 30.0).unwrap();
        let b = synthesize(Pose::new(Point2::new(10.0, 10.0), 0.0), &plan, 30.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_inputs() {
        let empty = RoutePlan::default();
        assert!(matches!(
            synthesize(Pose::default(), &empty, 5.0),
            Err(RouteError::InvalidRoutePlan(_))
        ));
        let bad_radius = plan_of(vec![ManeuverSegment::turn(30.0, 0.0)]);
        assert!(synthesize(Pose::default(), &bad_radius, 5.0).is_err());
        let ok = plan_of(vec![ManeuverSegment::straight(10.0)]);
        assert!(synthesize(Pose::default(), &ok, 0.0).is_err());
    }

    #[test]
    fn test_resampling_a_straight_trajectory_is_idempotent() {
        let plan = plan_of(vec![ManeuverSegment::straight(20.0), ManeuverSegment::straight(25.0)]);
        let traj = synthesize(Pose::default(), &plan, 5.0).unwrap();
        let again = resample(traj.points(), traj.sampling_unit());
        assert_eq!(again.len(), traj.len());
        for (a, b) in again.iter().zip(traj.points()) {
            assert!(a.approx_eq(*b, 1e-3), "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_resampling_a_curved_trajectory_stays_close() {
        let plan = plan_of(vec![
            ManeuverSegment::straight(20.0),
            ManeuverSegment::turn(90.0, 10.0),
            ManeuverSegment::straight(20.0),
        ]);
        let traj = synthesize(Pose::default(), &plan, 5.0).unwrap();
        let again = resample(traj.points(), traj.sampling_unit());
        assert!(again.len().abs_diff(traj.len()) <= 1, "{} vs {}", again.len(), traj.len());
        assert_eq!(again.first(), traj.points().first());
        assert_eq!(again.last(), traj.points().last());
        for (a, b) in again.iter().zip(traj.points()) {
            assert!(a.distance(*b) <= CURVED_RESAMPLE_DRIFT, "{:?} vs {:?}", a, b);
        }
    }

    fn straight_plan() -> impl Strategy<Value = Vec<ManeuverSegment>> {
        prop::collection::vec((1.0f64..50.0).prop_map(ManeuverSegment::straight), 1..5)
    }

    fn signed_angle() -> impl Strategy<Value = f64> {
        (10.0f64..170.0, any::<bool>()).prop_map(|(a, left)| if left { a } else { -a })
    }

    proptest! {
        #[test]
        fn prop_straight_plans_stay_on_one_line(
            segments in straight_plan(),
            x in -100.0f64..100.0,
            y in -100.0f64..100.0,
            heading in -180.0f64..180.0,
            unit in 0.5f64..10.0,
        ) {
            let start = Point2::new(x, y);
            let traj = synthesize(Pose::new(start, heading), &plan_of(segments), unit).unwrap();
            let direction = Point2::from_angle_deg(heading + FRAME_ROTATION_DEG);
            let mut along = f64::NEG_INFINITY;
            for p in traj.points() {
                let offset = *p - start;
                prop_assert!(direction.cross(offset).abs() < 2e-3, "{:?} left the line", p);
                // The end point may round to within a millimeter of the last sample.
                let s = direction.dot(offset);
                prop_assert!(s > along - 2e-3, "{:?} went backwards", p);
                along = s;
            }
            prop_assert_eq!(traj.heading_change_deg(), 0.0);
        }

        #[test]
        fn prop_single_turn_lies_on_its_circle(
            angle in signed_angle(),
            radius in 10.0f64..60.0,
            unit in 0.5f64..10.0,
        ) {
            let traj = synthesize(Pose::default(), &plan_of(vec![ManeuverSegment::turn(angle, radius)]), unit).unwrap();
            // From the origin heading north, left turns pivot on (-r, 0), right turns on (r, 0).
            let centre = if angle > 0.0 { Point2::new(-radius, 0.0) } else { Point2::new(radius, 0.0) };
            let half_step = (angle.abs() / (POINTS_PER_PRIMITIVE - 1) as f64 / 2.0).to_radians();
            let sagitta = radius * (1.0 - half_step.cos());
            let tol = ATTRIBUTION_THRESHOLD + sagitta + 1e-3;
            for p in traj.points() {
                let d = p.distance(centre);
                prop_assert!((d - radius).abs() <= tol, "{:?} is {} from centre", p, d);
            }
            prop_assert_eq!(traj.heading_change_deg(), angle);
        }
    }
}
