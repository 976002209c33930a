//! Buildings, their use categories, rooms, and hospital beds.
//!
//! A building is a graph vertex plus building facets: it *has* a
//! [`NodeId`] in the [`Network`](crate::Network) rather than being a node
//! subtype.  Hospitals are buildings with a [`HospitalBeds`] facet.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use epi_core::{AgentId, AgentRng, BuildingId, NodeId, Point, Polygon};

/// Interior point sampling gives up after this many rejected draws and uses
/// the centroid.
const MAX_INTERIOR_ATTEMPTS: u32 = 32;

// ── BuildingCategory ──────────────────────────────────────────────────────────

/// Building-use category.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingCategory {
    Residential,
    School,
    University,
    Hospital,
    EssentialAmenity,
    EssentialWorkplace,
    NonEssentialAmenity,
    NonEssentialWorkplace,
}

impl BuildingCategory {
    pub const COUNT: usize = 8;

    pub const ALL: [BuildingCategory; Self::COUNT] = [
        BuildingCategory::Residential,
        BuildingCategory::School,
        BuildingCategory::University,
        BuildingCategory::Hospital,
        BuildingCategory::EssentialAmenity,
        BuildingCategory::EssentialWorkplace,
        BuildingCategory::NonEssentialAmenity,
        BuildingCategory::NonEssentialWorkplace,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Amenities are leisure destinations.
    pub fn is_amenity(self) -> bool {
        matches!(self, BuildingCategory::EssentialAmenity | BuildingCategory::NonEssentialAmenity)
    }

    /// Workplaces that take adult employees.
    pub fn is_workplace(self) -> bool {
        matches!(
            self,
            BuildingCategory::EssentialWorkplace | BuildingCategory::NonEssentialWorkplace
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildingCategory::Residential           => "residential",
            BuildingCategory::School                => "school",
            BuildingCategory::University            => "university",
            BuildingCategory::Hospital              => "hospital",
            BuildingCategory::EssentialAmenity      => "essential_amenity",
            BuildingCategory::EssentialWorkplace    => "essential_workplace",
            BuildingCategory::NonEssentialAmenity   => "non_essential_amenity",
            BuildingCategory::NonEssentialWorkplace => "non_essential_workplace",
        }
    }
}

impl std::fmt::Display for BuildingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── CategoryTable ─────────────────────────────────────────────────────────────

/// A value per building category, indexed by [`BuildingCategory`].
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CategoryTable<T>([T; BuildingCategory::COUNT]);

impl<T> CategoryTable<T> {
    pub fn from_fn(mut f: impl FnMut(BuildingCategory) -> T) -> Self {
        CategoryTable(BuildingCategory::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (BuildingCategory, &T)> {
        BuildingCategory::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<BuildingCategory> for CategoryTable<T> {
    type Output = T;
    #[inline]
    fn index(&self, c: BuildingCategory) -> &T {
        &self.0[c.index()]
    }
}

impl<T> IndexMut<BuildingCategory> for CategoryTable<T> {
    #[inline]
    fn index_mut(&mut self, c: BuildingCategory) -> &mut T {
        &mut self.0[c.index()]
    }
}

// ── HospitalBeds ──────────────────────────────────────────────────────────────

/// Bed capacity and current occupancy of a hospital.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HospitalBeds {
    pub capacity: u32,
    pub occupied: u32,
}

impl HospitalBeds {
    pub fn new(capacity: u32) -> Self {
        Self { capacity, occupied: 0 }
    }

    #[inline]
    pub fn has_free_bed(&self) -> bool {
        self.occupied < self.capacity
    }

    /// Take a bed.  Returns `false` (and changes nothing) when full.
    pub fn try_admit(&mut self) -> bool {
        if !self.has_free_bed() {
            return false;
        }
        self.occupied += 1;
        true
    }

    pub fn discharge(&mut self) {
        debug_assert!(self.occupied > 0, "discharge from an empty hospital");
        self.occupied -= 1;
    }
}

// ── Building ──────────────────────────────────────────────────────────────────

/// A building in the environment.
///
/// Rooms only cluster co-located occupants for contact purposes; they have
/// no geometry.  Occupant lists are `Vec`s so iteration order (and therefore
/// every seeded run) is deterministic.
#[derive(Clone, Debug)]
pub struct Building {
    pub id:        BuildingId,
    pub category:  BuildingCategory,
    /// The building's entry vertex in the graph.
    pub node:      NodeId,
    pub footprint: Polygon,
    centroid:      Point,
    /// Number of active closures covering this building.
    closures:      u16,
    rooms:         Vec<Vec<AgentId>>,
    /// Present only for [`BuildingCategory::Hospital`].
    pub beds:      Option<HospitalBeds>,
}

impl Building {
    pub(crate) fn new(
        id:        BuildingId,
        category:  BuildingCategory,
        node:      NodeId,
        footprint: Polygon,
        rooms:     u16,
        beds:      Option<HospitalBeds>,
    ) -> Self {
        let centroid = footprint.centroid();
        Self {
            id,
            category,
            node,
            footprint,
            centroid,
            closures: 0,
            rooms: vec![Vec::new(); rooms.max(1) as usize],
            beds,
        }
    }

    pub fn centroid(&self) -> Point {
        self.centroid
    }

    pub fn is_hospital(&self) -> bool {
        self.beds.is_some()
    }

    // ── Closures ──────────────────────────────────────────────────────────

    /// Closed while at least one closure intervention covers the building.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closures > 0
    }

    pub fn close(&mut self) {
        self.closures += 1;
    }

    pub fn reopen(&mut self) {
        debug_assert!(self.closures > 0, "reopening {} which is not closed", self.id);
        self.closures = self.closures.saturating_sub(1);
    }

    // ── Rooms & occupancy ─────────────────────────────────────────────────

    pub fn room_count(&self) -> u16 {
        self.rooms.len() as u16
    }

    pub fn random_room(&self, rng: &mut AgentRng) -> u16 {
        rng.gen_range(0..self.room_count())
    }

    pub fn occupants(&self, room: u16) -> &[AgentId] {
        &self.rooms[room as usize]
    }

    /// Iterator over `(room, occupants)` for non-empty rooms.
    pub fn occupied_rooms(&self) -> impl Iterator<Item = (u16, &[AgentId])> {
        self.rooms
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_empty())
            .map(|(i, r)| (i as u16, r.as_slice()))
    }

    pub fn occupant_count(&self) -> usize {
        self.rooms.iter().map(Vec::len).sum()
    }

    pub fn enter(&mut self, agent: AgentId, room: u16) {
        debug_assert!(!self.rooms[room as usize].contains(&agent), "{agent} entered twice");
        self.rooms[room as usize].push(agent);
    }

    /// Remove `agent` from `room`.  Returns `false` if it was not there.
    pub fn leave(&mut self, agent: AgentId, room: u16) -> bool {
        let occupants = &mut self.rooms[room as usize];
        match occupants.iter().position(|&a| a == agent) {
            Some(i) => {
                occupants.remove(i);
                true
            }
            None => false,
        }
    }

    /// A uniformly random point inside the footprint.
    ///
    /// Rejection-samples the bounding box; returns the centroid if no sample
    /// lands inside within a bounded number of attempts (very thin shapes).
    pub fn random_interior_point(&self, rng: &mut AgentRng) -> Point {
        let (min, max) = self.footprint.bounding_box();
        if max.x <= min.x || max.y <= min.y {
            return self.centroid;
        }
        for _ in 0..MAX_INTERIOR_ATTEMPTS {
            let p = Point::new(rng.gen_range(min.x..max.x), rng.gen_range(min.y..max.y));
            if self.footprint.contains(p) {
                return p;
            }
        }
        self.centroid
    }

    /// Empty every room, lift closures, free every bed.
    pub fn reset(&mut self) {
        for room in &mut self.rooms {
            room.clear();
        }
        self.closures = 0;
        if let Some(beds) = &mut self.beds {
            beds.occupied = 0;
        }
    }
}
