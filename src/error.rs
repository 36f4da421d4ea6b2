// src/error.rs

/// Errors from turning a route plan into a trajectory.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("invalid route plan: {0}")]
    InvalidRoutePlan(String),
}

/// Errors from building road geometry out of centerline nodes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoadError {
    #[error("road needs at least 2 centerline nodes, got {0}")]
    InsufficientNodes(usize),
    #[error("road width must be constant: node {index} has width {found}, expected {expected}")]
    InconsistentWidth {
        index: usize,
        expected: f64,
        found: f64,
    },
    #[error("road width must be positive, got {0}")]
    NonPositiveWidth(f64),
    #[error("consecutive centerline nodes {0} and {1} coincide")]
    DegenerateSegment(usize, usize),
}

/// Anything that prevents a candidate from becoming a simulatable scenario.
/// These never abort a search; the candidate is rejected instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Road(#[from] RoadError),
    #[error("road geometry is invalid: {0}")]
    RoadInvalid(String),
    #[error("invalid individual: {0}")]
    InvalidIndividual(String),
}

/// Failures reported by the simulation side of the boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("simulation timed out after {steps} steps")]
    Timeout { steps: u32 },
    #[error("simulator error: {0}")]
    Simulator(String),
    #[error("external controller unavailable: {0}")]
    ControllerUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = RoadError::InsufficientNodes(1);
        assert!(format!("{}", e).contains("at least 2"));
        let s: ScenarioError = RouteError::InvalidRoutePlan("empty".into()).into();
        assert!(format!("{}", s).contains("empty"));
    }

    #[test]
    fn test_timeout_display() {
        let e = SimulationError::Timeout { steps: 120 };
        assert!(format!("{}", e).contains("120"));
    }
}
