//! Geometry input handed over by the GIS collaborator.
//!
//! Shapefile parsing is not part of the engine.  Whatever reads the source
//! data produces a [`Geometry`]: typed building footprints plus a road line
//! network, in one projected CRS.  A JSON form of the same structure is
//! supported so scenarios can be stored next to their configuration.
//!
//! ```json
//! {
//!   "buildings": [
//!     { "category": "residential", "polygon": [{"x":0,"y":0},{"x":10,"y":0},{"x":10,"y":10}] }
//!   ],
//!   "roads": [ { "points": [{"x":0,"y":-5},{"x":100,"y":-5}] } ]
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use epi_core::{CoreError, Point, Polygon};

use crate::{BuildingCategory, SpatialError, SpatialResult};

/// One building polygon tagged with its use category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingFootprint {
    pub category: BuildingCategory,
    pub polygon:  Polygon,
}

/// One polyline of the road network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadLine {
    pub points: Vec<Point>,
}

/// Building and road geometry for one study area.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub buildings: Vec<BuildingFootprint>,
    pub roads:     Vec<RoadLine>,
}

impl Geometry {
    /// Parse the JSON form from any reader.
    pub fn from_json_reader<R: Read>(reader: R) -> SpatialResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse the JSON form from a file.
    pub fn from_json_path(path: &Path) -> SpatialResult<Self> {
        let file = File::open(path)?;
        Self::from_json_reader(BufReader::new(file))
    }

    /// Structural checks run before the graph is built.
    ///
    /// # Errors
    ///
    /// [`SpatialError::EmptyGeometry`] when either collection is empty, and
    /// [`SpatialError::InvalidRoad`] for lines with fewer than two points or
    /// non-finite coordinates.  Footprints are validated on deserialization
    /// by [`Polygon`].
    pub fn validate(&self) -> SpatialResult<()> {
        if self.buildings.is_empty() {
            return Err(SpatialError::EmptyGeometry("buildings"));
        }
        if self.roads.is_empty() {
            return Err(SpatialError::EmptyGeometry("roads"));
        }
        for (index, fp) in self.buildings.iter().enumerate() {
            let vertices = fp.polygon.vertices();
            if let Some(p) = vertices.iter().find(|p| !p.is_finite()) {
                return Err(SpatialError::InvalidFootprint {
                    index,
                    source: CoreError::NonFiniteCoordinate { x: p.x, y: p.y },
                });
            }
            if vertices.len() < 3 {
                return Err(SpatialError::InvalidFootprint {
                    index,
                    source: CoreError::DegeneratePolygon(vertices.len()),
                });
            }
        }
        for (index, road) in self.roads.iter().enumerate() {
            if road.points.len() < 2 {
                return Err(SpatialError::InvalidRoad {
                    index,
                    reason: format!("needs at least 2 points, got {}", road.points.len()),
                });
            }
            if let Some(p) = road.points.iter().find(|p| !p.is_finite()) {
                return Err(SpatialError::InvalidRoad {
                    index,
                    reason: format!("non-finite coordinate {p}"),
                });
            }
        }
        Ok(())
    }
}

// ── GeometrySource ────────────────────────────────────────────────────────────

/// Anything that can produce the study-area geometry at initialization.
///
/// Loading happens once, before the first tick, off the simulation timeline.
pub trait GeometrySource {
    fn load(&self) -> SpatialResult<Geometry>;
}

impl GeometrySource for Geometry {
    fn load(&self) -> SpatialResult<Geometry> {
        Ok(self.clone())
    }
}

/// A JSON geometry file on disk.
#[derive(Clone, Debug)]
pub struct JsonGeometryFile(pub PathBuf);

impl GeometrySource for JsonGeometryFile {
    fn load(&self) -> SpatialResult<Geometry> {
        Geometry::from_json_path(&self.0)
    }
}
