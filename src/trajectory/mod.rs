mod maneuver;
mod synthesizer;
mod waypoint;

pub use maneuver::{DrivingAction, ManeuverSegment, RoutePlan};
pub use synthesizer::{
    synthesize, Trajectory, ATTRIBUTION_THRESHOLD, DEFAULT_SAMPLING_UNIT, POINTS_PER_PRIMITIVE,
};
pub use waypoint::{speed_kmh, speed_profile, Waypoint, MPS_TO_KMH};
