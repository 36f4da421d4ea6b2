// src/geometry/mod.rs
//
// Planar geometry kernel shared by trajectory synthesis, the road model and
// the oracles. Everything here is pure and allocation-light; no module in
// this directory holds state between calls.

pub mod point;
pub mod polygon;
pub mod polyline;
pub mod spline;

pub use point::{Point2, Point3, Pose};
pub use polygon::Polygon;
pub use polyline::{
    distance_to_polyline, distance_to_segment, offset_polyline, polyline_length,
    remove_duplicates, OffsetSide,
};
pub use spline::{resample, resample_with_params};

/// Tolerance used for "same point" and degenerate-segment decisions.
pub const EPSILON: f64 = 1e-9;
