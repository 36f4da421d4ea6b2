// src/simulation/scenario.rs
//
// Physical scenario handed to the simulator: the road, where the ego car
// starts, where it must get to, and (for car-following) the open-loop script
// of the lead vehicle.
//
// Builders reject a candidate before it reaches the simulator when its route
// cannot be synthesised or its road folds onto itself.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::error::ScenarioError;
use crate::geometry::{distance_to_polyline, OffsetSide, Point2, Point3, Pose};
use crate::road::{
    lane_marking, RoadNode, RoadPoints, RoadPolygon, MARKING_OFFSET, MARKING_SAMPLING_UNIT,
};
use crate::trajectory::{synthesize, DrivingAction, ManeuverSegment, RoutePlan, Waypoint};
use crate::types::{CarFollowingConfig, ProceduralRoadConfig, SimulationConfig};

use super::session::SimulationSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Ego follows a scripted lead vehicle on a straight road.
    CarFollowing,
    /// Ego drives alone along a generated road.
    ProceduralRoad,
}

#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    pub name: String,
    pub kind: ScenarioKind,
    pub road_nodes: Vec<RoadNode>,
    #[serde(skip)]
    pub road: Arc<RoadPolygon>,
    pub left_marking: Vec<RoadNode>,
    pub right_marking: Vec<RoadNode>,
    pub ego_start: Point3,
    pub ego_heading_deg: f64,
    pub lead_start: Option<Point3>,
    pub lead_script: Vec<Waypoint>,
    pub target: Point3,
    pub target_radius: f64,
    /// Centre of the right lane; deviation from it is the procedural-road
    /// measurement.
    pub lane_reference: Vec<Point2>,
    pub speed_limit_kmh: f64,
    pub ticks_per_step: u32,
}

/// Straight two-lane road along +x, centred on `road_center_y`.
pub fn car_following_road(cf: &CarFollowingConfig) -> Vec<RoadNode> {
    RoadNode::straight(
        Point2::new(0.0, cf.road_center_y),
        cf.road_node_count,
        cf.inter_node_distance,
        cf.ground_level,
        2.0 * cf.lane_width,
    )
}

/// Every generated road starts with the same straight lead-in so the ego car
/// spawns on a predictable stretch.
pub fn wrap_with_lead_in(pr: &ProceduralRoadConfig, actions: &[DrivingAction]) -> RoutePlan {
    let mut wrapped = Vec::with_capacity(actions.len() + 1);
    wrapped.push(DrivingAction::single(ManeuverSegment::straight(pr.lead_in_length)));
    wrapped.extend_from_slice(actions);
    RoutePlan::new(wrapped)
}

/// Road geometry plus its validity verdict, without building a scenario.
pub fn build_road(nodes: &[RoadNode]) -> Result<RoadPolygon, ScenarioError> {
    let road = RoadPolygon::from_points(RoadPoints::from_centerline(nodes)?);
    road.validate()?;
    Ok(road)
}

fn markings(nodes: &[RoadNode]) -> (Vec<RoadNode>, Vec<RoadNode>) {
    (
        lane_marking(nodes, OffsetSide::Left, MARKING_OFFSET, MARKING_SAMPLING_UNIT),
        lane_marking(nodes, OffsetSide::Right, MARKING_OFFSET, MARKING_SAMPLING_UNIT),
    )
}

impl Scenario {
    pub fn car_following(
        name: impl Into<String>,
        cf: &CarFollowingConfig,
        sim: &SimulationConfig,
        script: &[Waypoint],
    ) -> Result<Self, ScenarioError> {
        if script.len() < 2 {
            return Err(ScenarioError::InvalidIndividual(format!(
                "lead script needs at least 2 waypoints, got {}",
                script.len()
            )));
        }
        let nodes = car_following_road(cf);
        let road = build_road(&nodes)?;
        let lane_reference = road.road_points().right_lane_center();
        let (left_marking, right_marking) = markings(&nodes);

        // Middle of the right lane, one car length onto the road.
        let ego_start = Point3::new(
            cf.car_length,
            cf.road_center_y - cf.lane_width * 0.5,
            cf.ground_level,
        );
        let lead_start = Point3::new(ego_start.x + cf.initial_distance, ego_start.y, ego_start.z);

        let target = script[script.len() - 2].position();
        let name = name.into();
        debug!(scenario = %name, waypoints = script.len(), "car-following scenario built");

        Ok(Self {
            name,
            kind: ScenarioKind::CarFollowing,
            road_nodes: nodes,
            road: Arc::new(road),
            left_marking,
            right_marking,
            ego_start,
            ego_heading_deg: 0.0,
            lead_start: Some(lead_start),
            lead_script: script.to_vec(),
            target,
            target_radius: 2.0 * cf.lane_width + sim.target_margin,
            lane_reference,
            speed_limit_kmh: cf.max_speed_kmh,
            ticks_per_step: sim.car_following_ticks_per_step,
        })
    }

    pub fn procedural_road(
        name: impl Into<String>,
        pr: &ProceduralRoadConfig,
        sim: &SimulationConfig,
        actions: &[DrivingAction],
    ) -> Result<Self, ScenarioError> {
        let start = Point2::new(pr.start_x, pr.start_y);
        let plan = wrap_with_lead_in(pr, actions);
        let trajectory = synthesize(Pose::new(start, pr.start_heading_deg), &plan, pr.sampling_unit)?;

        let nodes = RoadNode::from_trajectory(&trajectory, pr.ground_level, 2.0 * pr.lane_width);
        let road = build_road(&nodes)?;
        let lane_reference = road.road_points().right_lane_center();
        let (left_marking, right_marking) = markings(&nodes);

        // Synthesis heading 0 points north once the road is in the world frame.
        let heading = pr.start_heading_deg + 90.0;
        let forward = Point2::from_angle_deg(heading);
        let spawn = start + forward * pr.car_start_offset + forward.perp_right() * (pr.lane_width * 0.5);

        let target_node = nodes[nodes.len() - 2];
        let name = name.into();
        debug!(
            scenario = %name,
            nodes = nodes.len(),
            length = trajectory.length(),
            "procedural-road scenario built"
        );

        Ok(Self {
            name,
            kind: ScenarioKind::ProceduralRoad,
            road_nodes: nodes,
            road: Arc::new(road),
            left_marking,
            right_marking,
            ego_start: Point3::new(spawn.x, spawn.y, pr.ground_level),
            ego_heading_deg: heading,
            lead_start: None,
            lead_script: Vec::new(),
            target: target_node.position(),
            target_radius: 2.0 * pr.lane_width + sim.target_margin,
            lane_reference,
            speed_limit_kmh: pr.speed_limit_kmh,
            ticks_per_step: sim.procedural_road_ticks_per_step,
        })
    }

    pub fn has_lead(&self) -> bool {
        self.lead_start.is_some()
    }

    /// Per-step measurement: distance to the lead vehicle when there is one,
    /// deviation from the right-lane centre otherwise.
    pub fn measure(&self, sample: &SimulationSample) -> f64 {
        match (self.kind, &sample.lead) {
            (ScenarioKind::CarFollowing, Some(lead)) => sample.ego.position.distance(lead.position),
            _ => distance_to_polyline(sample.ego.position.xy(), &self.lane_reference),
        }
    }
}
