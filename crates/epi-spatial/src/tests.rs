//! Unit tests for epi-spatial.
//!
//! All tests use a small hand-built town so they run without any GIS data.

#[cfg(test)]
mod helpers {
    use epi_core::{Point, Polygon};

    use crate::{BuildingCategory, BuildingFootprint, Geometry, RoadLine};

    pub fn square_at(cx: f64, cy: f64) -> Polygon {
        Polygon::rect(Point::new(cx - 2.0, cy - 2.0), Point::new(cx + 2.0, cy + 2.0))
    }

    pub fn road(points: &[(f64, f64)]) -> RoadLine {
        RoadLine { points: points.iter().map(|&(x, y)| Point::new(x, y)).collect() }
    }

    /// Main street along y = 0 with a spur at x = 100, plus an island road
    /// at y = 1000 that is not connected to it.
    ///
    /// Buildings (centroid → nearest road node):
    ///   B0 residential    (2, 6)     → (0, 0)
    ///   B1 school         (41, 6)    → (40, 0)
    ///   B2 hospital       (79, 6)    → (80, 0)
    ///   B3 amenity        (98, 6)    → (100, 0)
    ///   B4 hospital       (1, 1006)  → (0, 1000)   [island]
    ///   B5 workplace      (61, -6)   → (60, 0)
    pub fn town() -> Geometry {
        let b = |category, cx, cy| BuildingFootprint { category, polygon: square_at(cx, cy) };
        Geometry {
            buildings: vec![
                b(BuildingCategory::Residential, 2.0, 6.0),
                b(BuildingCategory::School, 41.0, 6.0),
                b(BuildingCategory::Hospital, 79.0, 6.0),
                b(BuildingCategory::EssentialAmenity, 98.0, 6.0),
                b(BuildingCategory::Hospital, 1.0, 1006.0),
                b(BuildingCategory::NonEssentialWorkplace, 61.0, -6.0),
            ],
            roads: vec![
                road(&[(0.0, 0.0), (20.0, 0.0), (40.0, 0.0), (60.0, 0.0), (80.0, 0.0), (100.0, 0.0)]),
                road(&[(100.0, 0.0), (100.0, 50.0)]),
                road(&[(0.0, 1000.0), (20.0, 1000.0)]),
            ],
        }
    }
}

// ── Graph construction ────────────────────────────────────────────────────────

#[cfg(test)]
mod graph {
    use epi_core::{BuildingId, NodeId, Point};

    use crate::{Environment, EnvironmentConfig, NetworkBuilder, NodeKind};

    #[test]
    fn empty_build() {
        let net = NetworkBuilder::new().build();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert_eq!(net.component_count(), 0);
        assert!(net.nearest_road_node(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn shared_coordinates_are_one_node() {
        let env = Environment::build(&super::helpers::town(), &EnvironmentConfig::default()).unwrap();
        // 6 + 1 + 2 road nodes (the spur shares (100, 0)), 6 building nodes.
        assert_eq!(env.network.node_count(), 15);
        // 5 + 1 + 1 road edges, one link per building.
        assert_eq!(env.network.edge_count(), 13);
    }

    #[test]
    fn repeated_lines_add_no_edges() {
        let mut b = NetworkBuilder::new();
        let pts = [Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(5.0, 5.0)];
        assert_eq!(b.add_road_line(&pts), 2);
        assert_eq!(b.add_road_line(&pts), 0);
        // Zero-length segment collapses to a self-loop, which is skipped.
        assert_eq!(b.add_road_line(&[Point::new(5.0, 5.0), Point::new(5.0, 5.0)]), 0);
        let net = b.build();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 2);
        assert_eq!(net.degree(NodeId(1)), 2);
    }

    #[test]
    fn buildings_snap_to_nearest_road_node() {
        let env = Environment::build(&super::helpers::town(), &EnvironmentConfig::default()).unwrap();
        let school = env.building(BuildingId(1));
        assert_eq!(env.network.node_kind[school.node.index()], NodeKind::Building(BuildingId(1)));
        assert_eq!(env.network.degree(school.node), 1);
        let (road, _) = env.network.neighbours(school.node).next().unwrap();
        assert_eq!(env.network.position(road), Point::new(40.0, 0.0));
    }

    #[test]
    fn components_are_labelled() {
        let env = Environment::build(&super::helpers::town(), &EnvironmentConfig::default()).unwrap();
        assert_eq!(env.network.component_count(), 2);
        let main = env.component_of(BuildingId(0));
        for id in [1, 2, 3, 5] {
            assert_eq!(env.component_of(BuildingId(id)), main);
        }
        assert_ne!(env.component_of(BuildingId(4)), main);
    }

    #[test]
    fn nearest_building_lookup() {
        let env = Environment::build(&super::helpers::town(), &EnvironmentConfig::default()).unwrap();
        assert_eq!(env.nearest_building(Point::new(60.0, -10.0)), Some(BuildingId(5)));
        assert_eq!(env.nearest_building(Point::new(0.0, 990.0)), Some(BuildingId(4)));
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use epi_core::{BuildingId, NodeId, Point};

    use crate::{Environment, EnvironmentConfig, NetworkBuilder, Router, ShortestPathRouter};

    fn env() -> Environment {
        Environment::build(&super::helpers::town(), &EnvironmentConfig::default()).unwrap()
    }

    #[test]
    fn route_runs_along_main_street() {
        let mut env = env();
        let route = env.get_route(BuildingId(0), BuildingId(3)).unwrap();
        // Building node, six road nodes, building node.
        assert_eq!(route.len(), 8);
        assert_eq!(route.node(0), env.building(BuildingId(0)).node);
        assert_eq!(route.node(7), env.building(BuildingId(3)).node);
        assert!(route.length_m() > 100.0);
    }

    #[test]
    fn reverse_route_is_reversed_view() {
        let mut env = env();
        let ab = env.get_route(BuildingId(1), BuildingId(5)).unwrap();
        let ba = env.get_route(BuildingId(5), BuildingId(1)).unwrap();
        let mut forward: Vec<NodeId> = ab.nodes().collect();
        forward.reverse();
        assert_eq!(forward, ba.nodes().collect::<Vec<_>>());
        assert!(ab.shares_route(&ba));
        assert_ne!(ab.is_reversed(), ba.is_reversed());
    }

    #[test]
    fn repeated_requests_hit_the_cache() {
        let mut env = env();
        let first = env.get_route(BuildingId(0), BuildingId(2)).unwrap();
        let second = env.get_route(BuildingId(0), BuildingId(2)).unwrap();
        assert!(first.shares_route(&second));
        assert_eq!(env.route_cache().len(), 1);
        assert_eq!(env.route_cache().stats(), (1, 1));
    }

    #[test]
    fn different_components_have_no_route() {
        let mut env = env();
        assert!(env.get_route(BuildingId(0), BuildingId(4)).is_none());
        // Cached as unreachable.
        assert!(env.get_route(BuildingId(4), BuildingId(0)).is_none());
        assert_eq!(env.route_cache().stats(), (1, 1));
    }

    #[test]
    fn same_building_is_trivial() {
        let mut env = env();
        let route = env.get_route(BuildingId(2), BuildingId(2)).unwrap();
        assert_eq!(route.len(), 1);
        assert_eq!(route.length_m(), 0.0);
    }

    #[test]
    fn shorter_path_wins() {
        let mut b = NetworkBuilder::new();
        // Direct 30 m edge versus a 10 + 50 m detour.
        b.add_road_line(&[Point::new(0.0, 0.0), Point::new(30.0, 0.0)]);
        b.add_road_line(&[Point::new(0.0, 0.0), Point::new(0.0, 10.0), Point::new(30.0, 50.0)]);
        b.add_road_line(&[Point::new(30.0, 50.0), Point::new(30.0, 0.0)]);
        let net = b.build();
        let route = ShortestPathRouter.route(&net, NodeId(0), NodeId(1)).unwrap();
        assert_eq!(route.nodes, vec![NodeId(0), NodeId(1)]);
        assert_eq!(route.length_m, 30.0);
    }

    #[test]
    fn equal_length_tie_goes_to_first_discovered() {
        let mut b = NetworkBuilder::new();
        // (0,0)=0 → (10,0)=1 → (10,10)=2, and (0,0) → (0,10)=3 → (10,10).
        b.add_road_line(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]);
        b.add_road_line(&[Point::new(0.0, 0.0), Point::new(0.0, 10.0), Point::new(10.0, 10.0)]);
        let net = b.build();
        let route = ShortestPathRouter.route(&net, NodeId(0), NodeId(2)).unwrap();
        assert_eq!(route.nodes, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(route.length_m, 20.0);
    }
}

// ── Buildings & hospitals ─────────────────────────────────────────────────────

#[cfg(test)]
mod buildings {
    use epi_core::{AgentId, AgentRng, BuildingId};

    use crate::{BuildingCategory, Environment, EnvironmentConfig};

    fn env_with_beds(beds: u32) -> Environment {
        let config = EnvironmentConfig { hospital_beds: beds, ..Default::default() };
        Environment::build(&super::helpers::town(), &config).unwrap()
    }

    #[test]
    fn category_lists_ascend() {
        let env = env_with_beds(1);
        assert_eq!(
            env.buildings_of(BuildingCategory::Hospital),
            &[BuildingId(2), BuildingId(4)]
        );
        assert!(env.buildings_of(BuildingCategory::University).is_empty());
        assert!(env.building(BuildingId(2)).is_hospital());
        assert!(!env.building(BuildingId(0)).is_hospital());
    }

    #[test]
    fn rooms_follow_config() {
        let env = env_with_beds(1);
        let rooms = EnvironmentConfig::default().rooms;
        assert_eq!(env.building(BuildingId(1)).room_count(), rooms.school);
        assert_eq!(env.building(BuildingId(0)).room_count(), rooms.residential);
    }

    #[test]
    fn hospital_in_component() {
        let env = env_with_beds(1);
        let mut rng = AgentRng::new(1, AgentId(0));
        let main = env.component_of(BuildingId(0));
        let island = env.component_of(BuildingId(4));
        assert_eq!(env.random_hospital(main, &mut rng), Some(BuildingId(2)));
        assert_eq!(env.random_hospital(island, &mut rng), Some(BuildingId(4)));
    }

    #[test]
    fn full_hospital_refuses() {
        let mut env = env_with_beds(1);
        let mut rng = AgentRng::new(1, AgentId(0));
        let main = env.component_of(BuildingId(0));
        assert!(env.admit(BuildingId(2)));
        assert!(!env.admit(BuildingId(2)));
        assert_eq!(env.random_hospital(main, &mut rng), None);
        assert_eq!(env.occupied_beds(), 1);

        env.discharge(BuildingId(2));
        assert_eq!(env.random_hospital(main, &mut rng), Some(BuildingId(2)));
    }

    #[test]
    fn non_hospital_never_admits() {
        let mut env = env_with_beds(5);
        assert!(!env.admit(BuildingId(0)));
    }

    #[test]
    fn occupancy_keeps_entry_order() {
        let mut env = env_with_beds(1);
        let school = env.building_mut(BuildingId(1));
        school.enter(AgentId(3), 0);
        school.enter(AgentId(1), 0);
        school.enter(AgentId(2), 0);
        assert!(school.leave(AgentId(1), 0));
        assert!(!school.leave(AgentId(1), 0));
        assert_eq!(school.occupants(0), &[AgentId(3), AgentId(2)]);
        assert_eq!(school.occupant_count(), 2);
        assert_eq!(school.occupied_rooms().count(), 1);
    }

    #[test]
    fn closures_nest() {
        let mut env = env_with_beds(1);
        let b = env.building_mut(BuildingId(5));
        b.close();
        b.close();
        b.reopen();
        assert!(b.is_closed());
        b.reopen();
        assert!(!b.is_closed());
    }

    #[test]
    fn interior_point_inside_footprint() {
        let env = env_with_beds(1);
        let mut rng = AgentRng::new(7, AgentId(3));
        let b = env.building(BuildingId(3));
        for _ in 0..50 {
            let p = b.random_interior_point(&mut rng);
            assert!(b.footprint.contains(p), "{p} outside footprint");
        }
    }

    #[test]
    fn reset_clears_mutable_state() {
        let mut env = env_with_beds(2);
        env.admit(BuildingId(2));
        env.building_mut(BuildingId(1)).close();
        env.building_mut(BuildingId(0)).enter(AgentId(0), 0);
        env.reset();
        assert_eq!(env.occupied_beds(), 0);
        assert!(!env.building(BuildingId(1)).is_closed());
        assert_eq!(env.building(BuildingId(0)).occupant_count(), 0);
    }
}

// ── Geometry input ────────────────────────────────────────────────────────────

#[cfg(test)]
mod geometry {
    use std::io::Write;

    use epi_core::{CoreError, Point, Polygon};

    use crate::{
        BuildingCategory, BuildingFootprint, Environment, EnvironmentConfig, Geometry,
        GeometrySource, JsonGeometryFile, SpatialError,
    };

    #[test]
    fn empty_geometry_fails() {
        let err = Environment::build(&Geometry::default(), &EnvironmentConfig::default()).unwrap_err();
        assert!(matches!(err, SpatialError::EmptyGeometry("buildings")));

        let mut g = super::helpers::town();
        g.roads.clear();
        let err = Environment::build(&g, &EnvironmentConfig::default()).unwrap_err();
        assert!(matches!(err, SpatialError::EmptyGeometry("roads")));
    }

    #[test]
    fn single_point_road_fails() {
        let mut g = super::helpers::town();
        g.roads.push(super::helpers::road(&[(5.0, 5.0)]));
        let err = g.validate().unwrap_err();
        assert!(matches!(err, SpatialError::InvalidRoad { index: 3, .. }));
    }

    #[test]
    fn zero_area_footprint_fails() {
        let mut g = super::helpers::town();
        let flat = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ])
        .unwrap();
        g.buildings.push(BuildingFootprint { category: BuildingCategory::Residential, polygon: flat });
        let err = Environment::build(&g, &EnvironmentConfig::default()).unwrap_err();
        assert!(matches!(err, SpatialError::InvalidFootprint { index: 6, .. }));
    }

    #[test]
    fn non_finite_footprint_fails() {
        let mut g = super::helpers::town();
        let polygon = Polygon::rect(Point::new(f64::NAN, 0.0), Point::new(4.0, 4.0));
        g.buildings.push(BuildingFootprint { category: BuildingCategory::Residential, polygon });
        let err = Environment::build(&g, &EnvironmentConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SpatialError::InvalidFootprint { index: 6, source: CoreError::NonFiniteCoordinate { .. } }
        ));
    }

    #[test]
    fn json_file_source() {
        let town = super::helpers::town();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&town).unwrap().as_bytes()).unwrap();

        let loaded = JsonGeometryFile(file.path().to_path_buf()).load().unwrap();
        assert_eq!(loaded, town);
        let env = Environment::load(&loaded, &EnvironmentConfig::default()).unwrap();
        assert_eq!(env.building_count(), 6);
    }

    #[test]
    fn two_vertex_polygon_rejected_by_parser() {
        let json = r#"{
            "buildings": [{ "category": "school", "polygon": [{"x":0,"y":0},{"x":1,"y":1}] }],
            "roads": []
        }"#;
        let err = Geometry::from_json_reader(json.as_bytes()).unwrap_err();
        assert!(matches!(err, SpatialError::Json(_)));
    }

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: EnvironmentConfig =
            serde_json::from_str(r#"{ "rooms": { "school": 4 } }"#).unwrap();
        assert_eq!(config.rooms.school, 4);
        assert_eq!(config.rooms.university, 20);
        assert_eq!(config.hospital_beds, EnvironmentConfig::default().hospital_beds);
    }
}
