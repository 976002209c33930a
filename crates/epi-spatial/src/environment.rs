//! The simulation environment: graph, buildings, hospitals and routes.
//!
//! An [`Environment`] is built once per `initialise` from a [`Geometry`] and
//! afterwards only mutated in place (occupancy, closures, bed counts).  The
//! graph itself never changes, which is what makes the route cache valid for
//! the lifetime of the environment.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

use epi_core::{AgentRng, BuildingId, ComponentId, CoreError, Point};

use crate::building::{Building, BuildingCategory, CategoryTable, HospitalBeds};
use crate::geometry::{Geometry, GeometrySource};
use crate::network::{Network, NetworkBuilder};
use crate::router::{RouteCache, RoutePath, Router, ShortestPathRouter};
use crate::{SpatialError, SpatialResult};

// ── Config ────────────────────────────────────────────────────────────────────

/// Rooms per building, by category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomCounts {
    pub residential:             u16,
    pub school:                  u16,
    pub university:              u16,
    pub hospital:                u16,
    pub essential_amenity:       u16,
    pub essential_workplace:     u16,
    pub non_essential_amenity:   u16,
    pub non_essential_workplace: u16,
}

impl Default for RoomCounts {
    fn default() -> Self {
        Self {
            residential:             1,
            school:                  10,
            university:              20,
            hospital:                8,
            essential_amenity:       3,
            essential_workplace:     5,
            non_essential_amenity:   3,
            non_essential_workplace: 5,
        }
    }
}

impl RoomCounts {
    /// The counts as a category-indexed table.
    pub fn table(&self) -> CategoryTable<u16> {
        CategoryTable::from_fn(|c| match c {
            BuildingCategory::Residential           => self.residential,
            BuildingCategory::School                => self.school,
            BuildingCategory::University            => self.university,
            BuildingCategory::Hospital              => self.hospital,
            BuildingCategory::EssentialAmenity      => self.essential_amenity,
            BuildingCategory::EssentialWorkplace    => self.essential_workplace,
            BuildingCategory::NonEssentialAmenity   => self.non_essential_amenity,
            BuildingCategory::NonEssentialWorkplace => self.non_essential_workplace,
        })
    }
}

/// Environment construction parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Bed capacity of every hospital.
    pub hospital_beds: u32,
    pub rooms:         RoomCounts,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self { hospital_beds: 20, rooms: RoomCounts::default() }
    }
}

// ── Building R-tree entry ─────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct BuildingEntry {
    point: [f64; 2],
    id:    BuildingId,
}

impl RTreeObject for BuildingEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for BuildingEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Environment ───────────────────────────────────────────────────────────────

/// Graph plus building arena.  Buildings are indexed by `BuildingId`.
pub struct Environment {
    pub network:    Network,
    buildings:      Vec<Building>,
    by_category:    CategoryTable<Vec<BuildingId>>,
    building_index: RTree<BuildingEntry>,
    routes:         RouteCache,
    router:         Box<dyn Router>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("buildings", &self.buildings.len())
            .finish_non_exhaustive()
    }
}

impl Environment {
    /// Build from geometry with the default shortest-path router.
    ///
    /// # Errors
    ///
    /// Any [`SpatialError`] from [`Geometry::validate`], plus
    /// [`SpatialError::InvalidFootprint`] for zero-area footprints.  No
    /// partially built environment is ever returned.
    pub fn build(geometry: &Geometry, config: &EnvironmentConfig) -> SpatialResult<Self> {
        Self::build_with_router(geometry, config, Box::new(ShortestPathRouter))
    }

    /// Load geometry from `source` and build.
    pub fn load(source: &dyn GeometrySource, config: &EnvironmentConfig) -> SpatialResult<Self> {
        Self::build(&source.load()?, config)
    }

    pub fn build_with_router(
        geometry: &Geometry,
        config:   &EnvironmentConfig,
        router:   Box<dyn Router>,
    ) -> SpatialResult<Self> {
        geometry.validate()?;
        for (index, fp) in geometry.buildings.iter().enumerate() {
            if !(fp.polygon.area() > 0.0) {
                return Err(SpatialError::InvalidFootprint { index, source: CoreError::ZeroArea });
            }
        }

        let mut builder = NetworkBuilder::new();
        for road in &geometry.roads {
            builder.add_road_line(&road.points);
        }
        builder.freeze_roads();

        let rooms = config.rooms.table();
        let mut buildings = Vec::with_capacity(geometry.buildings.len());
        let mut by_category: CategoryTable<Vec<BuildingId>> = CategoryTable::default();
        for (i, fp) in geometry.buildings.iter().enumerate() {
            let id = BuildingId(i as u32);
            let (node, _) = builder.attach_building(id, fp.polygon.centroid());
            let beds = (fp.category == BuildingCategory::Hospital)
                .then(|| HospitalBeds::new(config.hospital_beds));
            buildings.push(Building::new(
                id,
                fp.category,
                node,
                fp.polygon.clone(),
                rooms[fp.category],
                beds,
            ));
            by_category[fp.category].push(id);
        }

        let network = builder.build();
        let building_index = RTree::bulk_load(
            buildings
                .iter()
                .map(|b| BuildingEntry { point: b.centroid().to_array(), id: b.id })
                .collect(),
        );

        log::info!(
            "environment built: {} nodes, {} edges, {} components, {} buildings ({} hospitals)",
            network.node_count(),
            network.edge_count(),
            network.component_count(),
            buildings.len(),
            by_category[BuildingCategory::Hospital].len(),
        );

        Ok(Self {
            network,
            buildings,
            by_category,
            building_index,
            routes: RouteCache::new(),
            router,
        })
    }

    // ── Buildings ─────────────────────────────────────────────────────────

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    #[inline]
    pub fn building(&self, id: BuildingId) -> &Building {
        &self.buildings[id.index()]
    }

    #[inline]
    pub fn building_mut(&mut self, id: BuildingId) -> &mut Building {
        &mut self.buildings[id.index()]
    }

    /// Checked lookup for ids coming from outside the engine.
    pub fn try_building(&self, id: BuildingId) -> SpatialResult<&Building> {
        self.buildings.get(id.index()).ok_or(SpatialError::BuildingNotFound(id))
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Buildings of `category` in ascending id order.
    pub fn buildings_of(&self, category: BuildingCategory) -> &[BuildingId] {
        &self.by_category[category]
    }

    #[inline]
    pub fn component_of(&self, building: BuildingId) -> ComponentId {
        self.network.component(self.building(building).node)
    }

    /// Building whose centroid is closest to `point`.
    pub fn nearest_building(&self, point: Point) -> Option<BuildingId> {
        self.building_index.nearest_neighbor(&point.to_array()).map(|e| e.id)
    }

    // ── Routing ───────────────────────────────────────────────────────────

    /// Cached route between two buildings, `None` when they lie in
    /// different components.
    ///
    /// Both directions of a pair share one cached path; the route for
    /// `(b, a)` visits the nodes of `(a, b)` in reverse order.
    pub fn get_route(&mut self, from: BuildingId, to: BuildingId) -> Option<RoutePath> {
        let Self { network, buildings, routes, router, .. } = self;
        let path = routes.get_or_compute(from, to, |lo, hi| {
            router.route(network, buildings[lo.index()].node, buildings[hi.index()].node)
        });
        if path.is_none() {
            log::debug!("no route between {from} and {to}");
        }
        path
    }

    pub fn route_cache(&self) -> &RouteCache {
        &self.routes
    }

    // ── Hospitals ─────────────────────────────────────────────────────────

    /// A uniformly chosen hospital in `component` with a free bed.
    pub fn random_hospital(&self, component: ComponentId, rng: &mut AgentRng) -> Option<BuildingId> {
        let candidates: Vec<BuildingId> = self.by_category[BuildingCategory::Hospital]
            .iter()
            .copied()
            .filter(|&h| {
                self.component_of(h) == component
                    && self.building(h).beds.is_some_and(|b| b.has_free_bed())
            })
            .collect();
        rng.choose(&candidates).copied()
    }

    /// Take a bed in `hospital`.  `false` when full or not a hospital.
    pub fn admit(&mut self, hospital: BuildingId) -> bool {
        self.building_mut(hospital).beds.as_mut().is_some_and(HospitalBeds::try_admit)
    }

    pub fn discharge(&mut self, hospital: BuildingId) {
        if let Some(beds) = self.building_mut(hospital).beds.as_mut() {
            beds.discharge();
        }
    }

    /// Beds currently occupied across all hospitals.
    pub fn occupied_beds(&self) -> u32 {
        self.by_category[BuildingCategory::Hospital]
            .iter()
            .filter_map(|&h| self.building(h).beds)
            .map(|b| b.occupied)
            .sum()
    }

    /// Clear occupancy, closures and bed counts.  The graph and the route
    /// cache are kept.
    pub fn reset(&mut self) {
        for b in &mut self.buildings {
            b.reset();
        }
    }
}
