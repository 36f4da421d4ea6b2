// src/geometry/point.rs

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point (or vector) in the road plane, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle_deg` degrees counter-clockwise from +x.
    pub fn from_angle_deg(angle_deg: f64) -> Self {
        let rad = angle_deg.to_radians();
        Self::new(rad.cos(), rad.sin())
    }

    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point2) -> f64 {
        (self - other).norm()
    }

    pub fn dot(self, other: Point2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product. Positive when `other` lies
    /// counter-clockwise of `self`.
    pub fn cross(self, other: Point2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Returns `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Point2> {
        let n = self.norm();
        if n <= super::EPSILON {
            None
        } else {
            Some(self * (1.0 / n))
        }
    }

    /// Counter-clockwise rotation about the origin.
    pub fn rotate_deg(self, angle_deg: f64) -> Point2 {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        Point2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Counter-clockwise rotation about `pivot`.
    pub fn rotate_about(self, angle_deg: f64, pivot: Point2) -> Point2 {
        (self - pivot).rotate_deg(angle_deg) + pivot
    }

    /// Left-hand normal (+90°) of a direction vector.
    pub fn perp_left(self) -> Point2 {
        Point2::new(-self.y, self.x)
    }

    /// Right-hand normal (−90°) of a direction vector.
    pub fn perp_right(self) -> Point2 {
        Point2::new(self.y, -self.x)
    }

    pub fn lerp(self, other: Point2, t: f64) -> Point2 {
        self + (other - self) * t
    }

    /// Round both coordinates to `decimals` places.
    pub fn rounded(self, decimals: i32) -> Point2 {
        let f = 10f64.powi(decimals);
        Point2::new((self.x * f).round() / f, (self.y * f).round() / f)
    }

    pub fn approx_eq(self, other: Point2, tol: f64) -> bool {
        (self.x - other.x).abs() <= tol && (self.y - other.y).abs() <= tol
    }
}

impl Add for Point2 {
    type Output = Point2;
    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;
    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Point2;
    fn mul(self, rhs: f64) -> Point2 {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Point2::new(x, y)
    }
}

/// A simulator-space position. Oracles measure 3D distances, the road model
/// only looks at the plane projection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(self, other: Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn xy(self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Point3::new(x, y, z)
    }
}

/// Position plus heading (degrees, counter-clockwise from +x).
/// Produced once and never modified; synthesis derives new poses instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point2,
    pub heading_deg: f64,
}

impl Pose {
    pub const fn new(position: Point2, heading_deg: f64) -> Self {
        Self {
            position,
            heading_deg,
        }
    }

    /// Map a point expressed in this pose's local frame into the world frame.
    pub fn to_world(&self, local: Point2) -> Point2 {
        local.rotate_deg(self.heading_deg) + self.position
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Point2::ORIGIN, 0.0)
    }
}
