// src/trajectory/waypoint.rs

use serde::{Deserialize, Serialize};

use crate::geometry::{Point2, Point3};

/// Metres per second → kilometres per hour.
pub const MPS_TO_KMH: f64 = 3.6;

/// A position the scripted vehicle must reach at absolute time `t` (seconds
/// from scenario start).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t: f64,
}

impl Waypoint {
    pub const fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self { x, y, z, t }
    }

    pub fn position(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn xy(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Average speed in km/h needed to cover `distance` metres in `gap` seconds.
/// Non-positive gaps yield infinity.
pub fn speed_kmh(distance: f64, gap: f64) -> f64 {
    if gap <= 0.0 {
        return f64::INFINITY;
    }
    distance / gap * MPS_TO_KMH
}

/// Implied average speed (km/h) between each pair of consecutive waypoints.
pub fn speed_profile(waypoints: &[Waypoint]) -> Vec<f64> {
    waypoints
        .windows(2)
        .map(|w| speed_kmh(w[0].position().distance(w[1].position()), w[1].t - w[0].t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_speed_profile() {
        let wps: Vec<Waypoint> = (0..5)
            .map(|i| Waypoint::new(20.0 * i as f64 + 15.0, 28.0, -27.0, 2.5 * i as f64))
            .collect();
        let speeds = speed_profile(&wps);
        assert_eq!(speeds.len(), 4);
        for s in speeds {
            assert!((s - 28.8).abs() < 1e-9, "expected 28.8 km/h, got {}", s);
        }
    }

    #[test]
    fn test_speed_uses_3d_distance() {
        let wps = [Waypoint::new(0.0, 0.0, 0.0, 0.0), Waypoint::new(3.0, 4.0, 0.0, 1.0)];
        assert!((speed_profile(&wps)[0] - 18.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_gap_is_infinite() {
        assert!(speed_kmh(20.0, 0.0).is_infinite());
        assert!(speed_profile(&[]).is_empty());
    }
}
