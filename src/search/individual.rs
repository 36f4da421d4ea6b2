// src/search/individual.rs

use serde::{Deserialize, Serialize};

use crate::trajectory::{speed_profile, DrivingAction, ManeuverSegment, Waypoint};
use crate::types::{CarFollowingConfig, ProceduralRoadConfig};

/// Open-loop script of the lead vehicle: where it must be, and when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarFollowingIndividual {
    pub waypoints: Vec<Waypoint>,
}

impl CarFollowingIndividual {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints }
    }

    /// Evenly spaced waypoints in the middle of the right lane, starting
    /// `initial_distance` ahead of the road start, at constant speed.
    pub fn seed(cf: &CarFollowingConfig) -> Self {
        let y = cf.road_center_y - cf.lane_width * 0.5;
        let waypoints = (0..cf.node_count)
            .map(|i| {
                Waypoint::new(
                    cf.inter_node_distance * i as f64 + cf.initial_distance,
                    y,
                    cf.ground_level + 1.0,
                    cf.nominal_gap * i as f64,
                )
            })
            .collect();
        Self { waypoints }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn speed_profile(&self) -> Vec<f64> {
        speed_profile(&self.waypoints)
    }

    pub fn arrival_times(&self) -> Vec<f64> {
        self.waypoints.iter().map(|w| w.t).collect()
    }
}

/// A procedurally generated road: one single-segment driving action per
/// road piece. The fixed lead-in straight is NOT part of the individual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoadIndividual {
    pub segments: Vec<DrivingAction>,
}

impl RoadIndividual {
    pub fn new(segments: Vec<DrivingAction>) -> Self {
        Self { segments }
    }

    /// Deterministic starting road: `segment_count - 1` gentle left and right
    /// bends separated by straights of mid-range length.
    pub fn seed(pr: &ProceduralRoadConfig) -> Self {
        let length = f64::from(pr.min_length + pr.max_length) / 2.0;
        let angle = f64::from(pr.min_angle);
        let radius = f64::from(pr.max_radius.saturating_sub(1).max(pr.min_radius));
        let segments = (0..pr.segment_count.saturating_sub(1))
            .map(|i| match i % 4 {
                1 => DrivingAction::single(ManeuverSegment::turn(angle, radius)),
                3 => DrivingAction::single(ManeuverSegment::turn(-angle, radius)),
                _ => DrivingAction::single(ManeuverSegment::straight(length)),
            })
            .collect();
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_car_following_seed() {
        let cf = CarFollowingConfig::default();
        let seed = CarFollowingIndividual::seed(&cf);
        assert_eq!(seed.arrival_times(), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(seed.waypoints[0].x, 15.0);
        assert_eq!(seed.waypoints[4].x, 95.0);
        assert!(seed.waypoints.iter().all(|w| w.y == 28.0 && w.z == -27.0));
    }

    #[test]
    fn test_seed_speed_is_28_8_kmh() {
        let seed = CarFollowingIndividual::seed(&CarFollowingConfig::default());
        let speeds = seed.speed_profile();
        assert_eq!(speeds.len(), 4);
        for s in speeds {
            assert!((s - 20.0 / 2.5 * 3.6).abs() < 1e-9, "got {} km/h", s);
        }
    }

    #[test]
    fn test_road_seed_shape() {
        let pr = ProceduralRoadConfig::default();
        let road = RoadIndividual::seed(&pr);
        assert_eq!(road.len(), 4);
        let net: f64 = road
            .segments
            .iter()
            .flat_map(|a| a.segments.iter())
            .map(|s| s.heading_change())
            .sum();
        assert_eq!(net, 0.0, "bends cancel out");
    }

    #[test]
    fn test_individual_serializes_as_list() {
        let ind = CarFollowingIndividual::new(vec![Waypoint::new(1.0, 2.0, 3.0, 4.0)]);
        let json = serde_json::to_string(&ind).unwrap();
        assert_eq!(json, r#"[{"x":1.0,"y":2.0,"z":3.0,"t":4.0}]"#);
    }
}
