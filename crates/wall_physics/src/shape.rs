//! Collision shapes and polygon geometry
//!
//! Icons arrive as ordered outlines in image-pixel coordinates. Bodies use the
//! convex hull of that outline, re-centred on its centroid, so a body's
//! position is always its centre of mass.

use crate::error::{PhysicsError, Result};
use rapier2d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// 2D point in canvas pixels
pub type Point = [f32; 2];

const EPSILON: f32 = 1.0e-6;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    /// Create from corners
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, `None` for an empty slice
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut aabb = Self::new(*first, *first);
        for p in &points[1..] {
            aabb.min[0] = aabb.min[0].min(p[0]);
            aabb.min[1] = aabb.min[1].min(p[1]);
            aabb.max[0] = aabb.max[0].max(p[0]);
            aabb.max[1] = aabb.max[1].max(p[1]);
        }
        Some(aabb)
    }

    /// Inclusive containment test
    pub fn contains(&self, point: Point) -> bool {
        point[0] >= self.min[0]
            && point[0] <= self.max[0]
            && point[1] >= self.min[1]
            && point[1] <= self.max[1]
    }

    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }

    pub fn center(&self) -> Point {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }
}

/// Collision shape type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    /// Arbitrary outline; the body uses its convex hull
    Polygon { points: Vec<Point> },
    /// Axis-aligned rectangle centred on the body position
    Rectangle { width: f32, height: f32 },
}

impl BodyShape {
    /// Create a polygon shape
    pub fn polygon(points: Vec<Point>) -> Self {
        Self::Polygon { points }
    }

    /// Create a rectangle shape from full size
    pub fn rectangle(width: f32, height: f32) -> Self {
        Self::Rectangle { width, height }
    }

    /// Convex hull of the shape, centred on its centroid
    pub fn local_hull(&self) -> Result<Vec<Point>> {
        let raw = match self {
            Self::Polygon { points } => points.clone(),
            Self::Rectangle { width, height } => {
                let (hw, hh) = (width * 0.5, height * 0.5);
                vec![[-hw, -hh], [hw, -hh], [hw, hh], [-hw, hh]]
            }
        };

        let hull = convex_hull(&raw);
        if hull.len() < 3 || polygon_area(&hull) <= EPSILON {
            return Err(PhysicsError::DegenerateOutline { points: raw.len() });
        }

        let c = polygon_centroid(&hull);
        Ok(hull.iter().map(|p| [p[0] - c[0], p[1] - c[1]]).collect())
    }
}

/// Build a Rapier shape from a local hull
pub(crate) fn to_rapier(hull: &[Point]) -> Result<rapier::SharedShape> {
    let points: Vec<rapier::Point<rapier::Real>> =
        hull.iter().map(|p| rapier::Point::new(p[0], p[1])).collect();
    rapier::SharedShape::convex_hull(&points).ok_or_else(|| {
        PhysicsError::ShapeCreationFailed(format!("rapier rejected hull of {} points", hull.len()))
    })
}

/// Convex hull by Andrew's monotone chain. Collinear points are dropped.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted: Vec<Point> = points
        .iter()
        .copied()
        .filter(|p| p[0].is_finite() && p[1].is_finite())
        .collect();
    sorted.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let cross = |o: Point, a: Point, b: Point| {
        (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
    };

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Unsigned polygon area (shoelace)
pub fn polygon_area(points: &[Point]) -> f32 {
    signed_area(points).abs()
}

fn signed_area(points: &[Point]) -> f32 {
    let n = points.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a[0] * b[1] - b[0] * a[1];
    }
    sum * 0.5
}

/// Area centroid; falls back to the vertex mean for degenerate input
pub fn polygon_centroid(points: &[Point]) -> Point {
    let area = signed_area(points);
    let n = points.len();
    if n == 0 {
        return [0.0, 0.0];
    }
    if area.abs() <= EPSILON {
        let sum = points
            .iter()
            .fold([0.0, 0.0], |acc, p| [acc[0] + p[0], acc[1] + p[1]]);
        return [sum[0] / n as f32, sum[1] / n as f32];
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let cross = a[0] * b[1] - b[0] * a[1];
        cx += (a[0] + b[0]) * cross;
        cy += (a[1] + b[1]) * cross;
    }
    let k = 1.0 / (6.0 * area);
    [cx * k, cy * k]
}

/// Second moment of a uniform polygon about its origin.
///
/// `points` must already be centred on the centroid.
pub fn polygon_inertia(points: &[Point], mass: f32) -> f32 {
    let n = points.len();
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let cross = (b[0] * a[1] - b[1] * a[0]).abs();
        let dots = (b[0] * b[0] + b[1] * b[1]) + (b[0] * a[0] + b[1] * a[1]) + (a[0] * a[0] + a[1] * a[1]);
        numerator += cross * dots;
        denominator += cross;
    }
    if denominator <= EPSILON {
        return 0.0;
    }
    (mass / 6.0) * (numerator / denominator)
}

/// Uniformly scale points about the origin
pub fn scale_points(points: &[Point], factor: f32) -> Vec<Point> {
    points.iter().map(|p| [p[0] * factor, p[1] * factor]).collect()
}

/// Rotate then translate local points into world space
pub fn transform_points(points: &[Point], position: Point, angle: f32) -> Vec<Point> {
    let (sin, cos) = angle.sin_cos();
    points
        .iter()
        .map(|p| {
            [
                position[0] + p[0] * cos - p[1] * sin,
                position[1] + p[0] * sin + p[1] * cos,
            ]
        })
        .collect()
}

/// Inverse of [`transform_points`] for a single point
pub fn to_local(point: Point, position: Point, angle: f32) -> Point {
    let (sin, cos) = angle.sin_cos();
    let dx = point[0] - position[0];
    let dy = point[1] - position[1];
    [dx * cos + dy * sin, -dx * sin + dy * cos]
}
