// src/trajectory/maneuver.rs

use crate::error::RouteError;
use serde::{Deserialize, Serialize};

/// One geometric primitive of a route.
///
/// `angle` is in degrees: positive turns counter-clockwise (left), negative
/// turns clockwise (right).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ManeuverSegment {
    Straight { length: f64 },
    Turn { angle: f64, radius: f64 },
}

impl ManeuverSegment {
    pub fn straight(length: f64) -> Self {
        Self::Straight { length }
    }

    pub fn turn(angle: f64, radius: f64) -> Self {
        Self::Turn { angle, radius }
    }

    /// Heading change applied to the pose after this segment.
    pub fn heading_change(&self) -> f64 {
        match *self {
            Self::Straight { .. } => 0.0,
            Self::Turn { angle, .. } => angle,
        }
    }

    pub fn validate(&self) -> Result<(), RouteError> {
        match *self {
            Self::Straight { length } => {
                if !(length.is_finite() && length > 0.0) {
                    return Err(RouteError::InvalidRoutePlan(format!(
                        "straight segment length must be positive, got {}",
                        length
                    )));
                }
            }
            Self::Turn { angle, radius } => {
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(RouteError::InvalidRoutePlan(format!(
                        "turn radius must be positive, got {}",
                        radius
                    )));
                }
                if !angle.is_finite() || angle % 360.0 == 0.0 {
                    return Err(RouteError::InvalidRoutePlan(format!(
                        "turn angle must be a non-zero angle that is not a multiple of 360, got {}",
                        angle
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Segments that share one continuous pose update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DrivingAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "trajectory_segments")]
    pub segments: Vec<ManeuverSegment>,
}

impl DrivingAction {
    pub fn new(segments: Vec<ManeuverSegment>) -> Self {
        Self {
            name: None,
            segments,
        }
    }

    pub fn single(segment: ManeuverSegment) -> Self {
        Self::new(vec![segment])
    }
}

/// Ordered driving actions; the unit handed to the synthesizer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutePlan {
    pub actions: Vec<DrivingAction>,
}

impl RoutePlan {
    pub fn new(actions: Vec<DrivingAction>) -> Self {
        Self { actions }
    }

    /// All segments in driving order.
    pub fn segments(&self) -> impl Iterator<Item = &ManeuverSegment> {
        self.actions.iter().flat_map(|a| a.segments.iter())
    }

    pub fn segment_count(&self) -> usize {
        self.actions.iter().map(|a| a.segments.len()).sum()
    }

    pub fn validate(&self) -> Result<(), RouteError> {
        if self.segment_count() == 0 {
            return Err(RouteError::InvalidRoutePlan(
                "route plan has no segments".to_string(),
            ));
        }
        self.segments().try_for_each(|s| s.validate())
    }
}
