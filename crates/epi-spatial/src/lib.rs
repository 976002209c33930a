//! `epi-spatial` — the environment: graph, buildings, hospitals, routing.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`geometry`]    | `Geometry` input, `GeometrySource`, JSON loader            |
//! | [`building`]    | `Building`, `BuildingCategory`, `CategoryTable`, `HospitalBeds` |
//! | [`network`]     | `Network` (CSR + R-tree), `NetworkBuilder`, components     |
//! | [`router`]      | `Router` trait, `ShortestPathRouter`, `RouteCache`, `RoutePath` |
//! | [`environment`] | `Environment`, `EnvironmentConfig`                         |
//! | [`error`]       | `SpatialError`, `SpatialResult<T>`                         |

pub mod building;
pub mod environment;
pub mod error;
pub mod geometry;
pub mod network;
pub mod router;

#[cfg(test)]
mod tests;

pub use building::{Building, BuildingCategory, CategoryTable, HospitalBeds};
pub use environment::{Environment, EnvironmentConfig, RoomCounts};
pub use error::{SpatialError, SpatialResult};
pub use geometry::{BuildingFootprint, Geometry, GeometrySource, JsonGeometryFile, RoadLine};
pub use network::{Network, NetworkBuilder, NodeKind};
pub use router::{Route, RouteCache, RoutePath, Router, ShortestPathRouter};
