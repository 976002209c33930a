//! A synthetic street-grid town.
//!
//! `GRID` streets run in each direction, `BLOCK_M` apart, with a road point
//! every `POINT_SPACING_M`.  Every block holds four square buildings, one per
//! corner; the category of each follows a fixed pattern so the town is the
//! same on every run.

use epi_core::{Point, Polygon};
use epi_spatial::{BuildingCategory, BuildingFootprint, Geometry, RoadLine};

const GRID:            usize = 10;
const BLOCK_M:         f64   = 100.0;
const POINT_SPACING_M: f64   = 50.0;
const BUILDING_M:      f64   = 20.0;
const INSET_M:         f64   = 15.0;

/// Building indices that are hospitals.
const HOSPITALS: [usize; 2] = [82, 238];

fn category(k: usize) -> BuildingCategory {
    use BuildingCategory::*;
    if HOSPITALS.contains(&k) {
        return Hospital;
    }
    match k {
        k if k % 40 == 0 => School,
        k if k % 81 == 7 => University,
        k if k % 10 == 3 => EssentialWorkplace,
        k if k % 10 == 6 => NonEssentialWorkplace,
        k if k % 12 == 5 => EssentialAmenity,
        k if k % 12 == 9 => NonEssentialAmenity,
        _ => Residential,
    }
}

pub fn build_town() -> Geometry {
    let extent = (GRID - 1) as f64 * BLOCK_M;
    let steps = (extent / POINT_SPACING_M) as usize;

    let mut roads = Vec::with_capacity(2 * GRID);
    for i in 0..GRID {
        let c = i as f64 * BLOCK_M;
        let along = |s: usize| s as f64 * POINT_SPACING_M;
        roads.push(RoadLine { points: (0..=steps).map(|s| Point::new(along(s), c)).collect() });
        roads.push(RoadLine { points: (0..=steps).map(|s| Point::new(c, along(s))).collect() });
    }

    let mut buildings = Vec::new();
    for by in 0..GRID - 1 {
        for bx in 0..GRID - 1 {
            let x0 = bx as f64 * BLOCK_M;
            let y0 = by as f64 * BLOCK_M;
            let corners = [
                (x0 + INSET_M, y0 + INSET_M),
                (x0 + BLOCK_M - INSET_M - BUILDING_M, y0 + INSET_M),
                (x0 + INSET_M, y0 + BLOCK_M - INSET_M - BUILDING_M),
                (x0 + BLOCK_M - INSET_M - BUILDING_M, y0 + BLOCK_M - INSET_M - BUILDING_M),
            ];
            for (x, y) in corners {
                let polygon = Polygon::rect(Point::new(x, y), Point::new(x + BUILDING_M, y + BUILDING_M));
                buildings.push(BuildingFootprint { category: category(buildings.len()), polygon });
            }
        }
    }
    Geometry { buildings, roads }
}
