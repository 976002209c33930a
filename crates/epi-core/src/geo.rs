//! Planar geometry for projected building and road coordinates.
//!
//! Shapefile inputs arrive in a projected CRS (metres), so everything here is
//! plain Euclidean geometry in `f64`.  No geodesic maths is needed at town
//! scale.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

// ── Point ─────────────────────────────────────────────────────────────────────

/// A projected coordinate in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation: `t = 0` is `self`, `t = 1` is `other`.
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// `[x, y]` form used by the R-tree indices.
    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

// ── CoordKey ──────────────────────────────────────────────────────────────────

/// Exact hashable key for a coordinate, used to deduplicate road vertices
/// shared between line strings.
///
/// `-0.0` is normalised to `0.0` so both spellings map to one node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct CoordKey(u64, u64);

impl From<Point> for CoordKey {
    fn from(p: Point) -> Self {
        CoordKey((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
    }
}

// ── Polygon ───────────────────────────────────────────────────────────────────

/// A simple polygon given by its exterior ring.
///
/// The ring may or may not repeat the first vertex at the end; both forms are
/// accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Validate and build a polygon.
    ///
    /// # Errors
    ///
    /// [`CoreError::DegeneratePolygon`] for fewer than three distinct
    /// vertices, [`CoreError::NonFiniteCoordinate`] for NaN/∞ input.
    pub fn new(mut vertices: Vec<Point>) -> CoreResult<Self> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if let Some(bad) = vertices.iter().find(|p| !p.is_finite()) {
            return Err(CoreError::NonFiniteCoordinate { x: bad.x, y: bad.y });
        }
        if vertices.len() < 3 {
            return Err(CoreError::DegeneratePolygon(vertices.len()));
        }
        Ok(Self { vertices })
    }

    /// Axis-aligned rectangle, convenient for synthetic towns and tests.
    pub fn rect(min: Point, max: Point) -> Self {
        Self {
            vertices: vec![
                min,
                Point::new(max.x, min.y),
                max,
                Point::new(min.x, max.y),
            ],
        }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// `(min, max)` corners of the bounding box.
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.vertices {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Signed shoelace area (positive for counter-clockwise rings).
    fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        let mut acc = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            acc += a.x * b.y - b.x * a.y;
        }
        acc * 0.5
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area-weighted centroid; falls back to the vertex mean for rings with
    /// (near-)zero area.
    pub fn centroid(&self) -> Point {
        let area = self.signed_area();
        let n = self.vertices.len();
        if area.abs() < f64::EPSILON {
            let (sx, sy) = self
                .vertices
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            return Point::new(sx / n as f64, sy / n as f64);
        }
        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let cross = a.x * b.y - b.x * a.y;
            cx += (a.x + b.x) * cross;
            cy += (a.y + b.y) * cross;
        }
        Point::new(cx / (6.0 * area), cy / (6.0 * area))
    }

    /// Even-odd point-in-polygon test.  Points exactly on an edge may go
    /// either way.
    pub fn contains(&self, p: Point) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

impl TryFrom<Vec<Point>> for Polygon {
    type Error = CoreError;
    fn try_from(v: Vec<Point>) -> CoreResult<Self> {
        Polygon::new(v)
    }
}

impl From<Polygon> for Vec<Point> {
    fn from(p: Polygon) -> Self {
        p.vertices
    }
}
