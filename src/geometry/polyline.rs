// src/geometry/polyline.rs

use super::point::Point2;
use super::EPSILON;

/// Which side of the travel direction an offset curve lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetSide {
    Left,
    Right,
}

/// Euclidean distance from `p` to the closed segment `a`–`b`.
pub fn distance_to_segment(p: Point2, a: Point2, b: Point2) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= EPSILON * EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Distance from `p` to the nearest point of a polyline.
/// A single-point polyline degenerates to point distance; an empty one is
/// infinitely far away.
pub fn distance_to_polyline(p: Point2, line: &[Point2]) -> f64 {
    match line {
        [] => f64::INFINITY,
        [only] => p.distance(*only),
        _ => line
            .windows(2)
            .map(|w| distance_to_segment(p, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

pub fn polyline_length(line: &[Point2]) -> f64 {
    line.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Cumulative chord length at each vertex, starting at 0.
pub fn cumulative_lengths(line: &[Point2]) -> Vec<f64> {
    let mut acc = 0.0;
    let mut out = Vec::with_capacity(line.len());
    for (i, p) in line.iter().enumerate() {
        if i > 0 {
            acc += line[i - 1].distance(*p);
        }
        out.push(acc);
    }
    out
}

/// Drop consecutive points closer than `tolerance` to the last kept one.
/// Order is preserved; the first point always survives.
pub fn remove_duplicates(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for &p in points {
        match out.last() {
            Some(&last) if last.distance(p) <= tolerance => {}
            _ => out.push(p),
        }
    }
    out
}

/// Offset every vertex by `distance` along the local normal.
///
/// The direction at vertex i points to vertex i+1; the last vertex reuses the
/// direction from its predecessor. Degenerate (zero-length) directions are
/// skipped, so the output can be shorter than the input.
pub fn offset_polyline(line: &[Point2], distance: f64, side: OffsetSide) -> Vec<Point2> {
    if line.len() < 2 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(line.len());
    for i in 0..line.len() {
        let dir = if i + 1 < line.len() {
            line[i + 1] - line[i]
        } else {
            line[i] - line[i - 1]
        };
        let Some(unit) = dir.normalized() else {
            continue;
        };
        let normal = match side {
            OffsetSide::Left => unit.perp_left(),
            OffsetSide::Right => unit.perp_right(),
        };
        out.push(line[i] + normal * distance);
    }
    out
}
